/// Static tiles and the grid that owns them.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.

/// Terminal palette shared by tiles, entities and screens.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Color {
    #[default]
    Default,
    Black,
    Red,
    Green,
    Yellow,
    Cyan,
    White,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StaticKind {
    Wall,
    Entrance,
    Exit,
    StaticHazard,
    KeyPickup,
    HealthPickup,
}

impl StaticKind {
    pub const ALL: [StaticKind; 6] = [
        StaticKind::Wall,
        StaticKind::Entrance,
        StaticKind::Exit,
        StaticKind::StaticHazard,
        StaticKind::KeyPickup,
        StaticKind::HealthPickup,
    ];

    pub fn glyph(self) -> char {
        match self {
            StaticKind::Wall => 'X',
            StaticKind::Entrance => 'I',
            StaticKind::Exit => 'E',
            StaticKind::StaticHazard => '^',
            StaticKind::KeyPickup => 'k',
            StaticKind::HealthPickup => 'H',
        }
    }

    /// (foreground, background)
    pub fn colors(self) -> (Color, Color) {
        match self {
            StaticKind::Wall => (Color::White, Color::White),
            StaticKind::Entrance => (Color::Cyan, Color::Black),
            StaticKind::Exit => (Color::Green, Color::Black),
            StaticKind::StaticHazard => (Color::Green, Color::Black),
            StaticKind::KeyPickup => (Color::Yellow, Color::Black),
            StaticKind::HealthPickup => (Color::White, Color::Red),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            StaticKind::Wall => "Wall",
            StaticKind::Entrance => "Entrance",
            StaticKind::Exit => "Exit",
            StaticKind::StaticHazard => "Static Trap",
            StaticKind::KeyPickup => "Key for Doors",
            StaticKind::HealthPickup => "Health Pickup",
        }
    }

    pub fn player_walkable(self) -> bool {
        !matches!(self, StaticKind::Wall)
    }

    /// Hazards roam empty floor only.
    pub fn ai_walkable(self) -> bool {
        false
    }

    /// Removed from the grid on first player contact.
    pub fn is_pickup(self) -> bool {
        matches!(self, StaticKind::KeyPickup | StaticKind::HealthPickup)
    }

    pub fn save_code(self) -> u8 {
        match self {
            StaticKind::Wall => 0,
            StaticKind::Entrance => 1,
            StaticKind::Exit => 2,
            StaticKind::StaticHazard => 3,
            StaticKind::KeyPickup => 5,
            StaticKind::HealthPickup => 6,
        }
    }

    pub fn from_save_code(code: u8) -> Option<StaticKind> {
        StaticKind::ALL.iter().copied().find(|k| k.save_code() == code)
    }
}

/// A grid-resident entity. Only static hazards use the contact fields.
#[derive(Clone, Debug, PartialEq)]
pub struct StaticTile {
    pub kind: StaticKind,
    /// Milliseconds of uninterrupted player contact since the last hit.
    pub contact_ms: u64,
    /// Tick on which the player was last seen on this tile.
    pub last_contact_tick: u64,
}

impl StaticTile {
    pub fn new(kind: StaticKind) -> Self {
        StaticTile { kind, contact_ms: 0, last_contact_tick: 0 }
    }
}

// ── Grid ──

/// Dense width×height storage, at most one static tile per cell.
#[derive(Clone, Debug, PartialEq)]
pub struct TileGrid {
    width: usize,
    height: usize,
    cells: Vec<Option<StaticTile>>,
}

impl TileGrid {
    pub fn new(width: usize, height: usize) -> Self {
        TileGrid { width, height, cells: vec![None; width * height] }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if self.in_bounds(x, y) {
            Some(y as usize * self.width + x as usize)
        } else {
            None
        }
    }

    pub fn get(&self, x: i32, y: i32) -> Option<&StaticTile> {
        self.index(x, y).and_then(|i| self.cells[i].as_ref())
    }

    pub fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut StaticTile> {
        self.index(x, y).and_then(move |i| self.cells[i].as_mut())
    }

    pub fn kind_at(&self, x: i32, y: i32) -> Option<StaticKind> {
        self.get(x, y).map(|t| t.kind)
    }

    /// Replaces the cell content; out-of-bounds writes are ignored.
    pub fn set(&mut self, x: i32, y: i32, kind: StaticKind) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = Some(StaticTile::new(kind));
        }
    }

    pub fn clear(&mut self, x: i32, y: i32) -> Option<StaticTile> {
        self.index(x, y).and_then(|i| self.cells[i].take())
    }

    /// Occupied cells in x-major order (all of column 0 first).
    pub fn iter_x_major(&self) -> impl Iterator<Item = (i32, i32, &StaticTile)> + '_ {
        (0..self.width).flat_map(move |x| {
            (0..self.height).filter_map(move |y| {
                self.cells[y * self.width + x]
                    .as_ref()
                    .map(|t| (x as i32, y as i32, t))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_codes_round_trip_and_skip_mobile_code() {
        for kind in StaticKind::ALL {
            assert_eq!(StaticKind::from_save_code(kind.save_code()), Some(kind));
        }
        assert_eq!(StaticKind::from_save_code(4), None);
        assert_eq!(StaticKind::from_save_code(42), None);
    }

    #[test]
    fn only_wall_blocks_player() {
        for kind in StaticKind::ALL {
            assert_eq!(kind.player_walkable(), kind != StaticKind::Wall, "{kind:?}");
            assert!(!kind.ai_walkable());
        }
    }

    #[test]
    fn grid_ignores_out_of_bounds_writes() {
        let mut g = TileGrid::new(3, 2);
        g.set(5, 0, StaticKind::Wall);
        g.set(-1, 1, StaticKind::Wall);
        assert_eq!(g.iter_x_major().count(), 0);
        g.set(2, 1, StaticKind::Exit);
        assert_eq!(g.kind_at(2, 1), Some(StaticKind::Exit));
        assert_eq!(g.clear(2, 1).map(|t| t.kind), Some(StaticKind::Exit));
        assert!(g.get(2, 1).is_none());
    }

    #[test]
    fn x_major_order_walks_columns_first() {
        let mut g = TileGrid::new(3, 3);
        g.set(1, 0, StaticKind::Entrance);
        g.set(0, 2, StaticKind::Entrance);
        let first = g.iter_x_major().next().map(|(x, y, _)| (x, y));
        assert_eq!(first, Some((0, 2)));
    }
}
