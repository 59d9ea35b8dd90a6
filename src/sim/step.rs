/// The step function: advances the level by one frame of `delta_ms`.
///
/// Processing order:
///   1. Interactions against where the player stands now
///      (static tile first, then every mobile entity)
///   2. Per-entity updates over a snapshot of handles
///   3. Removal of entities queued during 1-2
///
/// Player actions (`perform`) are applied between steps, as input arrives.

use crate::domain::ai;
use crate::domain::entity::{
    Direction, Entity, EntityId, EntityKind, HAZARD_FRAMES, PLAYER_FRAMES, PROJECTILE_FRAMES, SENTINEL,
};
use crate::domain::rules::{self, Contact, ContactCtx, Walker};
use super::level::Level;

/// Input forwarded from the simulation screen.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PlayerAction {
    Move(Direction),
    Fire(Direction),
}

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn advance(level: &mut Level, delta_ms: u64) {
    level.tick += 1;

    resolve_interactions(level, delta_ms);

    let snapshot: Vec<EntityId> = level.entities.iter().map(|e| e.id).collect();
    for id in snapshot {
        if level.is_pending_removal(id) {
            continue;
        }
        update_entity(level, id, delta_ms);
    }

    level.apply_removals();
}

pub fn perform(level: &mut Level, action: PlayerAction) {
    match action {
        PlayerAction::Move(dir) => {
            let (dx, dy) = dir.delta();
            let (x, y) = level.player().pos();
            if rules::walkable(&level.grid, x + dx, y + dy, Walker::Player) {
                let player = level.player_mut();
                player.x = x + dx;
                player.y = y + dy;
            }
        }
        PlayerAction::Fire(dir) => {
            let state = level.player_state_mut();
            if state.fire_cooldown.ready() {
                state.fire_cooldown.reset();
                let (x, y) = level.player().pos();
                let id = level.add_projectile(x, y, dir);
                level.player_state_mut().projectiles.push(id);
                tracing::trace!(?dir, x, y, "projectile fired");
            }
        }
    }
    level.player_mut().needs_redraw = true;
}

// ══════════════════════════════════════════════════════════════
// Phase 1: interactions
// ══════════════════════════════════════════════════════════════

fn resolve_interactions(level: &mut Level, delta_ms: u64) {
    let ctx = ContactCtx {
        delta_ms,
        tick: level.tick,
        base_value: level.base_value(),
        rules: &level.rules,
    };

    let (head, rest) = level.entities.split_at_mut(1);
    let player_entity = &mut head[0];
    let (px, py) = player_entity.pos();
    let player = match &mut player_entity.kind {
        EntityKind::Player(p) => p,
        _ => return,
    };

    // Grid first: O(1) lookup of the tile underfoot.
    if let Some(tile) = level.grid.get_mut(px, py) {
        if rules::static_contact(tile, player, ctx) == Contact::Consumed {
            level.grid.clear(px, py);
        }
    }

    // Then every mobile entity decides for itself whether it is co-located.
    for other in rest.iter_mut() {
        let co_located = other.pos() == (px, py);
        match &mut other.kind {
            EntityKind::Hazard(h) => {
                h.last_seen = Some((px, py));
                if co_located && h.damage.ready() {
                    h.damage.reset();
                    player.take_hit(ctx.rules.mobile_penalty.score_delta(ctx.base_value));
                    player_entity.needs_redraw = true;
                    tracing::debug!(lives = player.lives, "moving hazard hit");
                }
            }
            EntityKind::Projectile(b) => {
                if b.hit_enemy && !b.bonus_granted {
                    b.bonus_granted = true;
                    player.score += ctx.base_value / ctx.rules.projectile_bonus_divisor.max(1);
                }
            }
            EntityKind::Player(_) => {}
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Phase 2: per-entity updates
// ══════════════════════════════════════════════════════════════

fn update_entity(level: &mut Level, id: EntityId, delta_ms: u64) {
    let idx = match level.index_of(id) {
        Some(i) => i,
        None => return,
    };
    match level.entities[idx].kind {
        EntityKind::Player(_) => update_player(level, delta_ms),
        EntityKind::Projectile(_) => update_projectile(level, idx, delta_ms),
        EntityKind::Hazard(_) => update_hazard(level, idx, delta_ms),
    }
}

fn update_player(level: &mut Level, delta_ms: u64) {
    // Which tracked projectiles are still live, and is one of them underfoot?
    let (px, py) = level.player().pos();
    let mut live: Vec<EntityId> = Vec::new();
    let mut on_own_projectile = false;
    for id in &level.player_state().projectiles {
        if let Some(Entity { x, y, kind: EntityKind::Projectile(b), .. }) = level.entity(*id) {
            if b.collided {
                continue;
            }
            live.push(*id);
            if b.moved && (*x, *y) == (px, py) {
                on_own_projectile = true;
            }
        }
    }

    let player = level.player_mut();
    let mut flip = false;
    if let EntityKind::Player(p) = &mut player.kind {
        p.projectiles = live;
        if !p.paused {
            p.score = (p.score - delta_ms as i64).max(0);
        }
        p.fire_cooldown.advance(delta_ms);
        flip = p.anim.tick(delta_ms);
    }
    if flip {
        player.glyph = next_frame(&PLAYER_FRAMES, player.glyph);
        player.needs_redraw = true;
    }
    if on_own_projectile {
        player.needs_redraw = true;
    }
}

fn update_projectile(level: &mut Level, idx: usize, delta_ms: u64) {
    let id = level.entities[idx].id;
    let (direction, collided, stepped) = match &mut level.entities[idx].kind {
        EntityKind::Projectile(b) => {
            let stepped = !b.collided && b.step.tick(delta_ms);
            (b.direction, b.collided, stepped)
        }
        _ => return,
    };

    // Collided last step: leave for one tick so the renderer sees the sentinel.
    if collided {
        level.request_removal(id);
        return;
    }
    if !stepped {
        return;
    }

    let (dx, dy) = direction.delta();
    let (x, y) = level.entities[idx].pos();
    let blocked = !rules::walkable(&level.grid, x + dx, y + dy, Walker::Player);

    let projectile = &mut level.entities[idx];
    projectile.glyph = next_frame(&PROJECTILE_FRAMES, projectile.glyph);
    projectile.needs_redraw = true;
    if blocked {
        (projectile.x, projectile.y) = SENTINEL;
        if let EntityKind::Projectile(b) = &mut projectile.kind {
            b.collided = true;
        }
        tracing::trace!(?id, "projectile hit a wall");
        return;
    }
    projectile.x = x + dx;
    projectile.y = y + dy;
    if let EntityKind::Projectile(b) = &mut projectile.kind {
        b.moved = true;
    }

    let here = (x + dx, y + dy);
    let victims: Vec<EntityId> = level
        .entities
        .iter()
        .filter(|e| e.destroyable() && e.pos() == here)
        .map(|e| e.id)
        .collect();
    if victims.is_empty() {
        return;
    }
    for victim in &victims {
        level.request_removal(*victim);
    }
    if let EntityKind::Projectile(b) = &mut level.entities[idx].kind {
        b.collided = true;
        b.hit_enemy = true;
    }
    tracing::debug!(?id, destroyed = victims.len(), "projectile hit hazard");
}

fn update_hazard(level: &mut Level, idx: usize, delta_ms: u64) {
    let wander_chance = level.rules.wander_chance;
    let (x, y) = level.entities[idx].pos();
    let (animate, step, last_seen) = match &mut level.entities[idx].kind {
        EntityKind::Hazard(h) => {
            h.damage.advance(delta_ms);
            let animate = h.anim.tick(delta_ms);
            if animate {
                h.frame = (h.frame + 1) % HAZARD_FRAMES.len();
            }
            (animate.then_some(h.frame), h.movement.tick(delta_ms), h.last_seen)
        }
        _ => return,
    };

    let target = if step {
        let dir = ai::choose_direction((x, y), last_seen, wander_chance, &mut level.rng);
        let (dx, dy) = dir.delta();
        rules::walkable(&level.grid, x + dx, y + dy, Walker::Ai).then_some((x + dx, y + dy))
    } else {
        None
    };

    let hazard = &mut level.entities[idx];
    if let Some(frame) = animate {
        hazard.glyph = HAZARD_FRAMES[frame];
        hazard.needs_redraw = true;
    }
    if let Some((nx, ny)) = target {
        hazard.x = nx;
        hazard.y = ny;
        hazard.needs_redraw = true;
    }
}

fn next_frame(frames: &[char], current: char) -> char {
    let idx = frames.iter().position(|&c| c == current).unwrap_or(0);
    frames[(idx + 1) % frames.len()]
}
