/// Reference screen: every glyph with its name, then a short description
/// reflowed to the terminal width.

use crate::domain::entity::{Direction, Entity, EntityId, PlayerState};
use crate::domain::tile::{Color, StaticKind};
use crate::error::GameError;
use crate::ui::input::InputEvent;
use super::{Ctx, View};

const DESCRIPTION: &str = "Find the key, then reach the exit. Your score starts at a value \
derived from the level size and drains while you play, so be quick. Static traps hurt when \
you stand on them, moving traps hunt you down. Health kits give an extra life. Throw \
shurikens with W A S D to destroy moving traps for bonus points. Escape pauses the game and \
opens the menu, where you can save, load a save file or load any level by name.";

/// Greedy word wrap; a word longer than `width` gets a line of its own.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let needed = if line.is_empty() { word.chars().count() } else { line.chars().count() + 1 + word.chars().count() };
        if needed > width && !line.is_empty() {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// (glyph, fg, bg, name) for everything that can appear in a level.
fn entries() -> Vec<(char, Color, Color, &'static str)> {
    let mut out: Vec<_> = StaticKind::ALL
        .iter()
        .map(|k| {
            let (fg, bg) = k.colors();
            (k.glyph(), fg, bg, k.name())
        })
        .collect();
    let samples = [
        Entity::player(EntityId(0), 0, 0, PlayerState::new(1, 0, 1, 1)),
        Entity::hazard(EntityId(0), 0, 0, 1, 1, 1),
        Entity::projectile(EntityId(0), 0, 0, Direction::Up, 1),
    ];
    out.extend(samples.iter().map(|e| {
        let (fg, bg) = e.colors();
        (e.glyph, fg, bg, e.name())
    }));
    out
}

pub struct LegendView {
    dirty: bool,
    pop: bool,
}

impl LegendView {
    pub fn new() -> Self {
        LegendView { dirty: true, pop: false }
    }
}

impl View for LegendView {
    fn name(&self) -> &'static str {
        "legend"
    }

    fn update(&mut self, ctx: &mut Ctx<'_>, _delta_ms: u64) -> Result<(), GameError> {
        if !self.dirty {
            return Ok(());
        }
        let term = &mut *ctx.term;
        term.clear()?;
        term.put_str(0, 0, "The Legend.", Color::White, Color::Default)?;
        let mut row = 2u16;
        for (glyph, fg, bg, name) in entries() {
            term.put_str(1, row, &glyph.to_string(), fg, bg)?;
            term.put_str(4, row, name, Color::Default, Color::Default)?;
            row += 1;
        }
        row += 2;
        let width = usize::from(term.size().0.saturating_sub(3)).max(1);
        for line in wrap(DESCRIPTION, width) {
            term.put_str(2, row, &line, Color::Default, Color::Default)?;
            row = row.saturating_add(1);
        }
        self.dirty = false;
        Ok(())
    }

    fn handle_input(&mut self, event: InputEvent, _ctx: &mut Ctx<'_>) {
        if event == InputEvent::Escape {
            self.pop = true;
        }
    }

    fn activate(&mut self) {
        self.dirty = true;
    }

    fn wants_pop(&self) -> bool {
        self.pop
    }

    fn take_push(&mut self) -> Option<Box<dyn View>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::ui::terminal::MemoryTerminal;
    use crate::view::signal::SignalBus;

    #[test]
    fn wrap_respects_width() {
        let lines = wrap("one two three four five", 9);
        assert_eq!(lines, vec!["one two", "three", "four five"]);
        assert!(wrap(DESCRIPTION, 30).iter().all(|l| l.chars().count() <= 30));
        assert_eq!(wrap("abcdefghijk x", 4), vec!["abcdefghijk", "x"]);
    }

    #[test]
    fn lists_every_glyph_and_name() {
        let config = GameConfig::default();
        let mut bus = SignalBus::new();
        let mut term = MemoryTerminal::new(60, 30);
        let mut view = LegendView::new();
        let mut ctx = Ctx { signals: &mut bus, term: &mut term, config: &config };
        view.update(&mut ctx, 16).expect("update");

        for name in ["Wall", "Entrance", "Exit", "Static Trap", "Key for Doors", "Health Pickup"] {
            assert!(term.contains(name), "missing {name}");
        }
        for name in ["Player", "Moving Trap", "Bullet"] {
            assert!(term.contains(name), "missing {name}");
        }
        assert_eq!(term.char_at(1, 2), 'X');
        assert!(term.contains("Find the key"));
    }

    #[test]
    fn escape_pops() {
        let config = GameConfig::default();
        let mut bus = SignalBus::new();
        let mut term = MemoryTerminal::new(60, 30);
        let mut view = LegendView::new();
        let mut ctx = Ctx { signals: &mut bus, term: &mut term, config: &config };
        view.handle_input(InputEvent::Enter, &mut ctx);
        assert!(!view.wants_pop());
        view.handle_input(InputEvent::Escape, &mut ctx);
        assert!(view.wants_pop());
    }
}
