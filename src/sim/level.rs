/// Level: the complete state of a running game.
///
/// ## Dual storage
///
///   - `grid`: dense width×height map of static tiles (walls, pickups, ...).
///   - `entities`: list of mobile entities, addressed by `EntityId`.
///
/// The player always occupies slot 0 of `entities` and is never removed.
/// Everything else is excised through `request_removal`, which is applied
/// after the per-entity update pass (see `step::advance`).
///
/// ## Redraw bookkeeping
///
/// Each entity remembers where it was last painted (`old_x`, `old_y`).
/// When an entity is excised, that cell lands in `vacated` so the renderer
/// can restore what lies underneath.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::RulesConfig;
use crate::domain::entity::{Direction, Entity, EntityId, PlayerState, SENTINEL};
use crate::domain::rules;
use crate::domain::tile::{StaticKind, TileGrid};

const PLAYER_SLOT: usize = 0;

/// Clamped rectangular copy of grid contents, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct StaticRegion {
    pub x: i32,
    pub y: i32,
    pub width: usize,
    pub height: usize,
    pub cells: Vec<Option<StaticKind>>,
}

impl StaticRegion {
    /// Non-empty cells with their level coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32, StaticKind)> + '_ {
        self.cells.iter().enumerate().filter_map(move |(i, cell)| {
            let x = self.x + (i % self.width.max(1)) as i32;
            let y = self.y + (i / self.width.max(1)) as i32;
            cell.map(|kind| (x, y, kind))
        })
    }
}

pub struct Level {
    /// Where this level was loaded from; reloads go through this name.
    pub name: String,
    pub grid: TileGrid,
    pub entities: Vec<Entity>,
    pub rules: RulesConfig,
    pub tick: u64,
    pub(crate) rng: StdRng,
    pub(crate) pending_removals: Vec<EntityId>,
    pub(crate) vacated: Vec<(i32, i32)>,
    base_value: i64,
    next_id: u32,
}

impl Level {
    /// Empty level with a fresh player at (0, 0).
    pub fn new(name: impl Into<String>, width: usize, height: usize, rules: RulesConfig) -> Self {
        let base_value = rules::base_value(width, height);
        let state = PlayerState::new(
            rules.start_lives,
            base_value,
            rules.fire_cooldown_ms,
            rules.player_anim_ms,
        );
        Level {
            name: name.into(),
            grid: TileGrid::new(width, height),
            entities: vec![Entity::player(EntityId(0), 0, 0, state)],
            rules,
            tick: 0,
            rng: StdRng::from_entropy(),
            pending_removals: Vec::new(),
            vacated: Vec::new(),
            base_value,
            next_id: 1,
        }
    }

    /// Deterministic hazard movement.
    #[cfg(test)]
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    pub fn base_value(&self) -> i64 {
        self.base_value
    }

    // ── Player ──

    pub fn player(&self) -> &Entity {
        &self.entities[PLAYER_SLOT]
    }

    pub fn player_mut(&mut self) -> &mut Entity {
        &mut self.entities[PLAYER_SLOT]
    }

    pub fn player_id(&self) -> EntityId {
        self.player().id
    }

    pub fn player_state(&self) -> &PlayerState {
        match self.entities[PLAYER_SLOT].as_player() {
            Some(p) => p,
            None => unreachable!("slot 0 always holds the player"),
        }
    }

    pub fn player_state_mut(&mut self) -> &mut PlayerState {
        match self.entities[PLAYER_SLOT].as_player_mut() {
            Some(p) => p,
            None => unreachable!("slot 0 always holds the player"),
        }
    }

    /// Place the player; an out-of-range axis resets to 0.
    pub fn spawn_player(&mut self, x: i32, y: i32) {
        let x = if x >= 0 && (x as usize) < self.width() { x } else { 0 };
        let y = if y >= 0 && (y as usize) < self.height() { y } else { 0 };
        let player = self.player_mut();
        player.x = x;
        player.y = y;
        player.needs_redraw = true;
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.player_state_mut().paused = paused;
    }

    /// First Entrance in x-major order.
    pub fn entrance(&self) -> Option<(i32, i32)> {
        self.grid
            .iter_x_major()
            .find(|(_, _, t)| t.kind == StaticKind::Entrance)
            .map(|(x, y, _)| (x, y))
    }

    // ── Static layer ──

    pub fn add_static(&mut self, x: i32, y: i32, kind: StaticKind) {
        self.grid.set(x, y, kind);
    }

    /// Copy of the grid rectangle at (x, y) of size w×h, clamped to the level.
    ///
    /// # Panics
    /// If `w` or `h` is negative.
    pub fn static_region(&self, x: i32, y: i32, w: i32, h: i32) -> StaticRegion {
        assert!(w >= 0 && h >= 0, "negative region size {w}x{h}");
        let level_w = self.width() as i32;
        let level_h = self.height() as i32;
        let x0 = x.clamp(0, level_w);
        let y0 = y.clamp(0, level_h);
        let x1 = x.saturating_add(w).clamp(x0, level_w);
        let y1 = y.saturating_add(h).clamp(y0, level_h);
        let width = (x1 - x0) as usize;
        let height = (y1 - y0) as usize;
        let mut cells = Vec::with_capacity(width * height);
        for cy in y0..y1 {
            for cx in x0..x1 {
                cells.push(self.grid.kind_at(cx, cy));
            }
        }
        StaticRegion { x: x0, y: y0, width, height, cells }
    }

    // ── Mobile layer ──

    fn alloc_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn add_hazard(&mut self, x: i32, y: i32) -> EntityId {
        let id = self.alloc_id();
        let r = &self.rules;
        let hazard = Entity::hazard(id, x, y, r.hazard_anim_ms, r.hazard_move_ms, r.damage_cooldown_ms);
        self.entities.push(hazard);
        id
    }

    pub fn add_projectile(&mut self, x: i32, y: i32, direction: Direction) -> EntityId {
        let id = self.alloc_id();
        let projectile = Entity::projectile(id, x, y, direction, self.rules.projectile_step_ms);
        self.entities.push(projectile);
        id
    }

    pub fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entities.iter().position(|e| e.id == id)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Queue an entity for excision at the end of the current step.
    /// The player is never removed.
    pub fn request_removal(&mut self, id: EntityId) {
        if id != self.player_id() && !self.pending_removals.contains(&id) {
            self.pending_removals.push(id);
        }
    }

    pub fn is_pending_removal(&self, id: EntityId) -> bool {
        self.pending_removals.contains(&id)
    }

    /// Excise every queued entity, remembering the cells they were painted on.
    pub fn apply_removals(&mut self) {
        for id in std::mem::take(&mut self.pending_removals) {
            if let Some(idx) = self.index_of(id) {
                let gone = self.entities.remove(idx);
                if (gone.old_x, gone.old_y) != SENTINEL {
                    self.vacated.push((gone.old_x, gone.old_y));
                }
            }
        }
    }

    pub fn take_vacated(&mut self) -> Vec<(i32, i32)> {
        std::mem::take(&mut self.vacated)
    }

    pub fn flag_all_entities(&mut self) {
        for e in &mut self.entities {
            e.needs_redraw = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(w: usize, h: usize) -> Level {
        Level::new("test", w, h, RulesConfig::default())
    }

    #[test]
    fn fresh_player_gets_base_value_and_lives() {
        let lvl = level(10, 10);
        assert_eq!(lvl.base_value(), 20_000);
        assert_eq!(lvl.player_state().score, 20_000);
        assert_eq!(lvl.player_state().lives, 5);
        assert_eq!(lvl.entities.len(), 1);
    }

    #[test]
    fn spawn_resets_bad_axis_to_zero() {
        let mut lvl = level(5, 5);
        lvl.spawn_player(3, 9);
        assert_eq!(lvl.player().pos(), (3, 0));
        lvl.spawn_player(-2, 4);
        assert_eq!(lvl.player().pos(), (0, 4));
    }

    #[test]
    fn region_is_clamped() {
        let mut lvl = level(4, 3);
        lvl.add_static(3, 2, StaticKind::Exit);
        let r = lvl.static_region(2, 1, 10, 10);
        assert_eq!((r.x, r.y, r.width, r.height), (2, 1, 2, 2));
        assert_eq!(r.iter().collect::<Vec<_>>(), vec![(3, 2, StaticKind::Exit)]);
        let outside = lvl.static_region(-5, -5, 3, 3);
        assert_eq!((outside.width, outside.height), (0, 0));
    }

    #[test]
    #[should_panic(expected = "negative region size")]
    fn negative_region_panics() {
        level(4, 4).static_region(0, 0, -1, 2);
    }

    #[test]
    fn player_cannot_be_removed() {
        let mut lvl = level(4, 4);
        let pid = lvl.player_id();
        lvl.request_removal(pid);
        lvl.apply_removals();
        assert_eq!(lvl.entities.len(), 1);
    }

    #[test]
    fn removal_records_painted_cell() {
        let mut lvl = level(4, 4);
        let id = lvl.add_hazard(2, 3);
        lvl.request_removal(id);
        lvl.request_removal(id);
        assert!(lvl.is_pending_removal(id));
        lvl.apply_removals();
        assert!(lvl.entity(id).is_none());
        assert_eq!(lvl.take_vacated(), vec![(2, 3)]);
        assert!(lvl.take_vacated().is_empty());
    }

    #[test]
    fn entrance_is_first_in_x_major_order() {
        let mut lvl = level(4, 4);
        assert_eq!(lvl.entrance(), None);
        lvl.add_static(2, 0, StaticKind::Entrance);
        lvl.add_static(1, 3, StaticKind::Entrance);
        assert_eq!(lvl.entrance(), Some((1, 3)));
    }
}
