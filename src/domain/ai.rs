/// Mobile hazard AI: biased random walk.
///
/// The preferred direction closes the larger axis gap to the last known
/// player position. With probability `wander_chance` a uniformly random
/// direction is taken instead, so hazards do not pin themselves in corners.

use rand::Rng;

use super::entity::Direction;

pub fn choose_direction<R: Rng + ?Sized>(
    from: (i32, i32),
    target: Option<(i32, i32)>,
    wander_chance: f64,
    rng: &mut R,
) -> Direction {
    let wander = rng.gen_bool(wander_chance.clamp(0.0, 1.0));
    match target {
        Some(target) if !wander => toward(from, target),
        _ => Direction::ALL[rng.gen_range(0..Direction::ALL.len())],
    }
}

/// Larger axis delta wins; ties go vertical.
fn toward((x, y): (i32, i32), (tx, ty): (i32, i32)) -> Direction {
    let dx = x - tx;
    let dy = y - ty;
    if dx.abs() > dy.abs() {
        if dx > 0 { Direction::Left } else { Direction::Right }
    } else if dy > 0 {
        Direction::Up
    } else {
        Direction::Down
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn heads_along_larger_axis() {
        assert_eq!(toward((5, 5), (0, 4)), Direction::Left);
        assert_eq!(toward((5, 5), (9, 6)), Direction::Right);
        assert_eq!(toward((5, 5), (4, 0)), Direction::Up);
        assert_eq!(toward((5, 5), (5, 9)), Direction::Down);
    }

    #[test]
    fn never_wanders_with_zero_chance() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            assert_eq!(choose_direction((3, 3), Some((3, 0)), 0.0, &mut rng), Direction::Up);
        }
    }

    #[test]
    fn always_wanders_with_full_chance() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut seen = [false; 4];
        for _ in 0..200 {
            let d = choose_direction((3, 3), Some((3, 0)), 1.0, &mut rng);
            seen[Direction::ALL.iter().position(|&a| a == d).unwrap_or(0)] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn no_target_is_random() {
        let mut rng = StdRng::seed_from_u64(3);
        let d = choose_direction((0, 0), None, 0.0, &mut rng);
        assert!(Direction::ALL.contains(&d));
    }
}
