/// Collision and contact rules.
///
/// Pure functions over the grid and the player: "is this cell enterable"
/// and "what does standing here do to the player". No entity list access,
/// so they can be unit-tested against a bare grid.
///
/// ### Contact table
/// ┌──────────────┬─────────────────────────────────────────────┐
/// │ Tile         │ Effect                                      │
/// ├──────────────┼─────────────────────────────────────────────┤
/// │ Wall         │ none (never entered)                        │
/// │ Entrance     │ none                                        │
/// │ Exit         │ has key → reached exit                      │
/// │ StaticHazard │ each ≥damage period of contact: hit         │
/// │ KeyPickup    │ key + score bonus, tile consumed            │
/// │ HealthPickup │ +1 life, tile consumed                      │
/// └──────────────┴─────────────────────────────────────────────┘

use crate::config::RulesConfig;

use super::entity::PlayerState;
use super::tile::{StaticKind, StaticTile, TileGrid};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Walker {
    Player,
    Ai,
}

/// Out-of-bounds is never walkable; empty is always walkable.
pub fn walkable(grid: &TileGrid, x: i32, y: i32, walker: Walker) -> bool {
    if !grid.in_bounds(x, y) {
        return false;
    }
    match grid.get(x, y) {
        None => true,
        Some(tile) => match walker {
            Walker::Player => tile.kind.player_walkable(),
            Walker::Ai => tile.kind.ai_walkable(),
        },
    }
}

/// Level-size scoring constant: round(2000 * sqrt(w * h)).
pub fn base_value(width: usize, height: usize) -> i64 {
    (2000.0 * ((width * height) as f64).sqrt()).round() as i64
}

/// Outcome of a static tile acting on the player.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Contact {
    Kept,
    Consumed,
}

/// Per-tick context for contact resolution.
#[derive(Clone, Copy, Debug)]
pub struct ContactCtx<'a> {
    pub delta_ms: u64,
    pub tick: u64,
    pub base_value: i64,
    pub rules: &'a RulesConfig,
}

pub fn static_contact(tile: &mut StaticTile, player: &mut PlayerState, ctx: ContactCtx) -> Contact {
    match tile.kind {
        StaticKind::Wall | StaticKind::Entrance => {}
        StaticKind::Exit => {
            if player.has_key {
                player.reached_exit = true;
            }
        }
        StaticKind::StaticHazard => {
            // A gap of one or more ticks breaks contact.
            if tile.last_contact_tick + 1 != ctx.tick {
                tile.contact_ms = 0;
            }
            tile.last_contact_tick = ctx.tick;
            tile.contact_ms = tile.contact_ms.saturating_add(ctx.delta_ms);
            if tile.contact_ms >= ctx.rules.damage_cooldown_ms {
                tile.contact_ms = 0;
                player.take_hit(ctx.rules.static_penalty.score_delta(ctx.base_value));
                tracing::debug!(lives = player.lives, "static hazard hit");
            }
        }
        StaticKind::KeyPickup => {
            player.has_key = true;
            player.score += ctx.base_value / ctx.rules.key_bonus_divisor.max(1);
            tracing::debug!("key picked up");
        }
        StaticKind::HealthPickup => {
            player.lives = player.lives.saturating_add(1);
            tracing::debug!(lives = player.lives, "health picked up");
        }
    }
    if tile.kind.is_pickup() {
        Contact::Consumed
    } else {
        Contact::Kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper: build a grid from a string diagram.
    /// Legend:  'X'=Wall  'I'=Entrance  'E'=Exit  '^'=StaticHazard
    ///         'k'=Key  'H'=Health  ' '=Empty
    fn grid_from(rows: &[&str]) -> TileGrid {
        let height = rows.len();
        let width = rows[0].chars().count();
        let mut g = TileGrid::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let kind = StaticKind::ALL.iter().copied().find(|k| k.glyph() == ch);
                if let Some(kind) = kind {
                    g.set(x as i32, y as i32, kind);
                }
            }
        }
        g
    }

    fn ctx(rules: &RulesConfig, tick: u64, delta_ms: u64) -> ContactCtx<'_> {
        ContactCtx { delta_ms, tick, base_value: 10_000, rules }
    }

    // ── walkable ──

    #[test]
    fn out_of_bounds_never_walkable() {
        let g = grid_from(&["   ", "   "]);
        for (x, y) in [(-1, 0), (0, -1), (3, 0), (0, 2), (i32::MAX, 0), (i32::MIN, i32::MIN)] {
            assert!(!walkable(&g, x, y, Walker::Player));
            assert!(!walkable(&g, x, y, Walker::Ai));
        }
    }

    #[test]
    fn empty_walkable_for_both() {
        let g = grid_from(&[" X"]);
        assert!(walkable(&g, 0, 0, Walker::Player));
        assert!(walkable(&g, 0, 0, Walker::Ai));
        assert!(!walkable(&g, 1, 0, Walker::Player));
    }

    #[test]
    fn hazards_cannot_enter_floor_tiles() {
        let g = grid_from(&["IE^kH"]);
        for x in 0..5 {
            assert!(walkable(&g, x, 0, Walker::Player));
            assert!(!walkable(&g, x, 0, Walker::Ai));
        }
    }

    #[test]
    fn base_value_rounds() {
        assert_eq!(base_value(10, 10), 20_000);
        assert_eq!(base_value(2, 1), 2828);
        assert_eq!(base_value(0, 5), 0);
    }

    // ── contact ──

    #[test]
    fn exit_requires_key() {
        let rules = RulesConfig::default();
        let mut tile = StaticTile::new(StaticKind::Exit);
        let mut p = PlayerState::new(5, 0, 1000, 500);
        static_contact(&mut tile, &mut p, ctx(&rules, 1, 16));
        assert!(!p.reached_exit);
        p.has_key = true;
        static_contact(&mut tile, &mut p, ctx(&rules, 2, 16));
        assert!(p.reached_exit);
    }

    #[test]
    fn static_hazard_hits_once_per_second_of_contact() {
        let rules = RulesConfig::default();
        let mut tile = StaticTile::new(StaticKind::StaticHazard);
        let mut p = PlayerState::new(5, 100_000, 1000, 500);
        let mut hits = 0;
        for tick in 1..=25 {
            let before = p.lives;
            static_contact(&mut tile, &mut p, ctx(&rules, tick, 100));
            hits += before - p.lives;
        }
        assert_eq!(hits, 2);
        assert_eq!(p.score, 100_000 - 2 * 2000);
    }

    #[test]
    fn broken_contact_resets_accumulator() {
        let rules = RulesConfig::default();
        let mut tile = StaticTile::new(StaticKind::StaticHazard);
        let mut p = PlayerState::new(5, 0, 1000, 500);
        static_contact(&mut tile, &mut p, ctx(&rules, 1, 900));
        // step away on tick 2, return on tick 3
        static_contact(&mut tile, &mut p, ctx(&rules, 3, 900));
        assert_eq!(p.lives, 5);
        static_contact(&mut tile, &mut p, ctx(&rules, 4, 100));
        assert_eq!(p.lives, 4);
    }

    #[test]
    fn pickups_are_consumed() {
        let rules = RulesConfig::default();
        let mut p = PlayerState::new(5, 0, 1000, 500);
        let mut key = StaticTile::new(StaticKind::KeyPickup);
        assert_eq!(static_contact(&mut key, &mut p, ctx(&rules, 1, 16)), Contact::Consumed);
        assert!(p.has_key);
        assert_eq!(p.score, 5000);
        let mut health = StaticTile::new(StaticKind::HealthPickup);
        assert_eq!(static_contact(&mut health, &mut p, ctx(&rules, 2, 16)), Contact::Consumed);
        assert_eq!(p.lives, 6);
    }
}
