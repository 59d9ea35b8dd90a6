/// Mobile entities: Player, Projectile, MobileHazard.
/// One shared attribute block plus a closed per-kind state enum.

use super::tile::Color;

/// Stable handle into the level's entity list.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct EntityId(pub u32);

/// Position of an entity that is waiting to be excised.
pub const SENTINEL: (i32, i32) = (-1, -1);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

// ── Timer ──

/// Elapsed-time accumulator compared against a fixed period.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Timer {
    elapsed_ms: u64,
    period_ms: u64,
}

impl Timer {
    pub fn new(period_ms: u64) -> Self {
        Timer { elapsed_ms: 0, period_ms }
    }

    /// Starts out already elapsed (first use is immediate).
    pub fn primed(period_ms: u64) -> Self {
        Timer { elapsed_ms: period_ms, period_ms }
    }

    pub fn advance(&mut self, delta_ms: u64) {
        self.elapsed_ms = self.elapsed_ms.saturating_add(delta_ms);
    }

    pub fn ready(&self) -> bool {
        self.elapsed_ms >= self.period_ms
    }

    pub fn reset(&mut self) {
        self.elapsed_ms = 0;
    }

    /// Advance, and if the period has elapsed, reset and report true.
    pub fn tick(&mut self, delta_ms: u64) -> bool {
        self.advance(delta_ms);
        if self.ready() {
            self.reset();
            true
        } else {
            false
        }
    }
}

// ── Per-kind state ──

#[derive(Clone, Debug, PartialEq)]
pub struct PlayerState {
    pub lives: u32,
    /// May dip below zero between a penalty and the next clamp.
    pub score: i64,
    pub has_key: bool,
    pub reached_exit: bool,
    pub paused: bool,
    pub projectiles: Vec<EntityId>,
    pub fire_cooldown: Timer,
    pub anim: Timer,
}

impl PlayerState {
    pub fn new(lives: u32, score: i64, fire_cooldown_ms: u64, anim_ms: u64) -> Self {
        PlayerState {
            lives,
            score,
            has_key: false,
            reached_exit: false,
            paused: false,
            projectiles: Vec::new(),
            fire_cooldown: Timer::primed(fire_cooldown_ms),
            anim: Timer::new(anim_ms),
        }
    }

    pub fn is_dead(&self) -> bool {
        self.lives == 0
    }

    /// Score as shown and saved.
    pub fn display_score(&self) -> i64 {
        self.score.max(0)
    }

    /// One hit: a life plus a score adjustment.
    pub fn take_hit(&mut self, score_delta: i64) {
        self.lives = self.lives.saturating_sub(1);
        self.score = self.score.saturating_add(score_delta);
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProjectileState {
    pub direction: Direction,
    pub step: Timer,
    pub moved: bool,
    pub collided: bool,
    pub hit_enemy: bool,
    pub bonus_granted: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HazardState {
    pub frame: usize,
    pub anim: Timer,
    pub movement: Timer,
    pub damage: Timer,
    /// Player position observed during the last interaction pass.
    pub last_seen: Option<(i32, i32)>,
}

pub const HAZARD_FRAMES: [char; 4] = ['|', '/', '-', '\\'];
pub const PLAYER_FRAMES: [char; 2] = ['X', '+'];
pub const PROJECTILE_FRAMES: [char; 2] = ['×', '+'];

#[derive(Clone, Debug, PartialEq)]
pub enum EntityKind {
    Player(PlayerState),
    Projectile(ProjectileState),
    Hazard(HazardState),
}

// ── Entity ──

#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub x: i32,
    pub y: i32,
    /// Where the renderer last painted this entity.
    pub old_x: i32,
    pub old_y: i32,
    pub glyph: char,
    pub needs_redraw: bool,
    pub kind: EntityKind,
}

impl Entity {
    fn with_kind(id: EntityId, x: i32, y: i32, glyph: char, kind: EntityKind) -> Self {
        Entity { id, x, y, old_x: x, old_y: y, glyph, needs_redraw: true, kind }
    }

    pub fn player(id: EntityId, x: i32, y: i32, state: PlayerState) -> Self {
        Self::with_kind(id, x, y, PLAYER_FRAMES[0], EntityKind::Player(state))
    }

    pub fn projectile(id: EntityId, x: i32, y: i32, direction: Direction, step_ms: u64) -> Self {
        let state = ProjectileState {
            direction,
            step: Timer::new(step_ms),
            moved: false,
            collided: false,
            hit_enemy: false,
            bonus_granted: false,
        };
        Self::with_kind(id, x, y, PROJECTILE_FRAMES[0], EntityKind::Projectile(state))
    }

    pub fn hazard(id: EntityId, x: i32, y: i32, anim_ms: u64, move_ms: u64, damage_ms: u64) -> Self {
        let state = HazardState {
            frame: 0,
            anim: Timer::new(anim_ms),
            movement: Timer::new(move_ms),
            damage: Timer::new(damage_ms),
            last_seen: None,
        };
        Self::with_kind(id, x, y, HAZARD_FRAMES[0], EntityKind::Hazard(state))
    }

    pub fn pos(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn at_sentinel(&self) -> bool {
        self.pos() == SENTINEL
    }

    pub fn moved_since_paint(&self) -> bool {
        (self.x, self.y) != (self.old_x, self.old_y)
    }

    /// (foreground, background)
    pub fn colors(&self) -> (Color, Color) {
        match self.kind {
            EntityKind::Player(_) => (Color::White, Color::Green),
            EntityKind::Projectile(_) => (Color::Yellow, Color::Default),
            EntityKind::Hazard(_) => (Color::Red, Color::Black),
        }
    }

    pub fn name(&self) -> &'static str {
        match self.kind {
            EntityKind::Player(_) => "Player",
            EntityKind::Projectile(_) => "Bullet",
            EntityKind::Hazard(_) => "Moving Trap",
        }
    }

    /// Projectiles may destroy it.
    pub fn destroyable(&self) -> bool {
        matches!(self.kind, EntityKind::Hazard(_))
    }

    /// Written to save files as its own record.
    pub fn persistent(&self) -> bool {
        matches!(self.kind, EntityKind::Hazard(_))
    }

    pub fn as_player(&self) -> Option<&PlayerState> {
        match &self.kind {
            EntityKind::Player(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_player_mut(&mut self) -> Option<&mut PlayerState> {
        match &mut self.kind {
            EntityKind::Player(p) => Some(p),
            _ => None,
        }
    }
}
