/// Incremental level renderer.
///
/// ## Camera
///
/// Level coordinates and screen coordinates are separate:
///   - `camera`: viewport into the level (top-left corner + size)
///   - `screen(sx, sy) = level(camera.x + sx, camera.y + sy)`
///   - the camera jumps by whole viewports, it never scrolls smoothly
///
/// ## Layers
///
/// Statics are blitted once per camera position. Mobile entities are
/// repainted only while flagged, and the cell an entity leaves is
/// restored from the grid beneath it. Anything standing on a restored
/// cell is painted again on top. The player always goes last.

use std::io;

use crate::domain::tile::{Color, TileGrid};
use crate::sim::level::Level;
use super::hud::{Hud, HUD_ROWS};
use super::terminal::Terminal;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Camera {
    /// Level X of the top-left visible cell
    pub x: i32,
    /// Level Y of the top-left visible cell
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// New offset on one axis so that `target` lies in `[offset, offset + view)`.
fn snap_axis(offset: i32, view: i32, target: i32, level: i32) -> i32 {
    let view = view.max(1);
    let snapped = if target < offset {
        offset - (offset - target + view - 1) / view * view
    } else if target >= offset + view {
        offset + ((target - offset - view) / view + 1) * view
    } else {
        offset
    };
    snapped.clamp(0, (level - view).max(0))
}

impl Camera {
    pub fn new(width: i32, height: i32) -> Self {
        Camera { x: 0, y: 0, width: width.max(1), height: height.max(1) }
    }

    /// Bring `(px, py)` into view. Returns true if the offset changed.
    pub fn follow(&mut self, px: i32, py: i32, level_w: usize, level_h: usize) -> bool {
        let before = (self.x, self.y);
        self.x = snap_axis(self.x, self.width, px, level_w as i32);
        self.y = snap_axis(self.y, self.height, py, level_h as i32);
        before != (self.x, self.y)
    }

    pub fn visible(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    pub fn to_screen(&self, x: i32, y: i32) -> Option<(u16, u16)> {
        if !self.visible(x, y) {
            return None;
        }
        Some(((x - self.x) as u16, (y - self.y) as u16))
    }
}

/// Restore a cell from the static layer, or blank it.
fn paint_ground(term: &mut dyn Terminal, camera: &Camera, grid: &TileGrid, x: i32, y: i32) -> io::Result<()> {
    let Some((sx, sy)) = camera.to_screen(x, y) else { return Ok(()) };
    match grid.kind_at(x, y) {
        Some(kind) => {
            let (fg, bg) = kind.colors();
            term.put_str(sx, sy, &kind.glyph().to_string(), fg, bg)
        }
        None => term.put_str(sx, sy, " ", Color::Default, Color::Default),
    }
}

pub struct LevelRenderer {
    camera: Camera,
    statics_painted: bool,
    force_entities: bool,
    hud: Hud,
}

impl LevelRenderer {
    pub fn new(hud_sample_ms: u64, (cols, rows): (u16, u16)) -> Self {
        let mut renderer = LevelRenderer {
            camera: Camera::new(1, 1),
            statics_painted: false,
            force_entities: true,
            hud: Hud::new(hud_sample_ms),
        };
        renderer.resize(cols, rows);
        renderer
    }

    #[cfg(test)]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Recompute the viewport from the terminal size. The caller clears
    /// the screen; everything is repainted on the next render.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.camera.width = i32::from(cols).max(1);
        self.camera.height = i32::from(rows.saturating_sub(HUD_ROWS)).max(1);
        self.invalidate();
    }

    /// Forget everything on screen.
    pub fn invalidate(&mut self) {
        self.statics_painted = false;
        self.force_entities = true;
        self.hud.force();
    }

    pub fn render(&mut self, level: &mut Level, term: &mut dyn Terminal, delta_ms: u64) -> io::Result<()> {
        let (px, py) = level.player().pos();
        if self.camera.follow(px, py, level.width(), level.height()) {
            tracing::trace!(x = self.camera.x, y = self.camera.y, "camera moved");
            term.clear()?;
            self.invalidate();
        }
        if self.force_entities {
            level.flag_all_entities();
            self.force_entities = false;
        }

        let camera = self.camera;
        let mut repainted: Vec<(i32, i32)> = Vec::new();

        // ── Static layer ──
        if !self.statics_painted {
            let region = level.static_region(camera.x, camera.y, camera.width, camera.height);
            for (x, y, kind) in region.iter() {
                if let Some((sx, sy)) = camera.to_screen(x, y) {
                    let (fg, bg) = kind.colors();
                    term.put_str(sx, sy, &kind.glyph().to_string(), fg, bg)?;
                }
            }
            self.statics_painted = true;
        }

        // ── Cells left behind ──
        for (x, y) in level.take_vacated() {
            if camera.visible(x, y) {
                paint_ground(term, &camera, &level.grid, x, y)?;
                repainted.push((x, y));
            }
        }
        for e in level.entities.iter_mut().filter(|e| e.needs_redraw && e.moved_since_paint()) {
            if camera.visible(e.old_x, e.old_y) {
                paint_ground(term, &camera, &level.grid, e.old_x, e.old_y)?;
                repainted.push((e.old_x, e.old_y));
            }
            e.old_x = e.x;
            e.old_y = e.y;
        }

        // ── Mobile layer, player on top ──
        let count = level.entities.len();
        for i in (1..count).chain(0..1) {
            let e = &mut level.entities[i];
            if e.at_sentinel() {
                e.needs_redraw = false;
                continue;
            }
            let Some((sx, sy)) = camera.to_screen(e.x, e.y) else { continue };
            if e.needs_redraw || repainted.contains(&e.pos()) {
                let (fg, bg) = e.colors();
                term.put_str(sx, sy, &e.glyph.to_string(), fg, bg)?;
                e.needs_redraw = false;
                // whatever shares this cell is now covered
                repainted.push(e.pos());
            }
        }

        let top = u16::try_from(camera.height).unwrap_or(u16::MAX);
        self.hud.render(term, level.player_state(), top, delta_ms)
    }
}
