/// Filename prompt for loading an arbitrary level.
///
/// A failed load keeps the prompt open with an inline error. A
/// successful one stages the level on the signal bus for the simulation
/// screen to pick up.

use std::path::Path;

use crate::domain::tile::Color;
use crate::error::GameError;
use crate::sim::save;
use crate::ui::input::InputEvent;
use super::signal::Signal;
use super::{draw_lines, Ctx, View};

const PROMPT: &str = "filename: ";

pub struct LoadView {
    input: String,
    status: Option<String>,
    candidates: Vec<String>,
    dirty: bool,
    pop: bool,
}

impl LoadView {
    pub fn new(levels_dir: &Path) -> Self {
        LoadView {
            input: String::new(),
            status: None,
            candidates: save::list_levels(levels_dir),
            dirty: true,
            pop: false,
        }
    }

    fn try_load(&mut self, ctx: &mut Ctx<'_>) {
        let path = save::resolve(&ctx.config.levels_dir, &self.input);
        match save::load_level(&path, &self.input, &ctx.config.rules) {
            Ok(level) => {
                ctx.signals.stage_level(level);
                ctx.signals.post(Signal::LoadSucceeded);
                self.pop = true;
            }
            Err(e) => {
                tracing::warn!(file = %self.input, "load by name failed: {e}");
                self.status = Some(format!("Loading level {} failed. Maybe check filename?", self.input));
                self.input.clear();
            }
        }
    }

    fn lines(&self) -> Vec<(String, Color)> {
        let mut lines = vec![
            (format!("{PROMPT}{}", self.input), Color::White),
            (String::new(), Color::Default),
            (self.status.clone().unwrap_or_default(), Color::Red),
            (String::new(), Color::Default),
            ("Available levels:".to_string(), Color::Default),
        ];
        lines.extend(self.candidates.iter().map(|c| (format!("  {c}"), Color::Cyan)));
        lines
    }
}

impl View for LoadView {
    fn name(&self) -> &'static str {
        "load"
    }

    fn update(&mut self, ctx: &mut Ctx<'_>, _delta_ms: u64) -> Result<(), GameError> {
        if self.dirty {
            ctx.term.clear()?;
            draw_lines(ctx.term, &self.lines())?;
            self.dirty = false;
        }
        Ok(())
    }

    fn handle_input(&mut self, event: InputEvent, ctx: &mut Ctx<'_>) {
        match event {
            InputEvent::Char(c) if !c.is_control() => self.input.push(c),
            InputEvent::Backspace => {
                self.input.pop();
            }
            InputEvent::Enter => self.try_load(ctx),
            InputEvent::Escape => self.pop = true,
            _ => return,
        }
        self.dirty = true;
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
    use crate::config::{GameConfig, RulesConfig};
    use crate::sim::level::Level;
    use crate::ui::terminal::MemoryTerminal;
    use crate::view::signal::SignalBus;

    fn type_text(view: &mut LoadView, text: &str, ctx: &mut Ctx<'_>) {
        for c in text.chars() {
            view.handle_input(InputEvent::Char(c), ctx);
        }
    }

    #[test]
    fn typing_and_backspace_edit_the_prompt() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = GameConfig { levels_dir: dir.path().to_path_buf(), ..GameConfig::default() };
        let mut view = LoadView::new(&config.levels_dir);
        let mut bus = SignalBus::new();
        let mut term = MemoryTerminal::new(40, 10);
        let mut ctx = Ctx { signals: &mut bus, term: &mut term, config: &config };
        type_text(&mut view, "abc", &mut ctx);
        view.handle_input(InputEvent::Backspace, &mut ctx);
        view.update(&mut ctx, 16).expect("update");
        assert_eq!(term.row(0).trim_end(), "filename: ab");
    }

    #[test]
    fn missing_file_shows_error_and_stays_open() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = GameConfig { levels_dir: dir.path().to_path_buf(), ..GameConfig::default() };
        let mut view = LoadView::new(&config.levels_dir);
        let mut bus = SignalBus::new();
        let mut term = MemoryTerminal::new(60, 10);
        let mut ctx = Ctx { signals: &mut bus, term: &mut term, config: &config };
        type_text(&mut view, "nope", &mut ctx);
        view.handle_input(InputEvent::Enter, &mut ctx);
        view.update(&mut ctx, 16).expect("update");

        assert!(!view.wants_pop());
        assert!(view.input.is_empty());
        assert!(term.contains("Loading level nope failed. Maybe check filename?"));
        assert!(!bus.is_posted(Signal::LoadSucceeded));
    }

    #[test]
    fn found_file_is_staged_and_listed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let level = Level::new("tiny.properties", 3, 2, RulesConfig::default());
        save::save_level(&level, &dir.path().join("tiny.properties")).expect("save");
        let config = GameConfig { levels_dir: dir.path().to_path_buf(), ..GameConfig::default() };

        let mut view = LoadView::new(&config.levels_dir);
        assert_eq!(view.candidates, vec!["tiny.properties".to_string()]);

        let mut bus = SignalBus::new();
        let mut term = MemoryTerminal::new(40, 10);
        let mut ctx = Ctx { signals: &mut bus, term: &mut term, config: &config };
        type_text(&mut view, "tiny.properties", &mut ctx);
        view.handle_input(InputEvent::Enter, &mut ctx);

        assert!(view.wants_pop());
        assert!(bus.is_posted(Signal::LoadSucceeded));
        assert_eq!(bus.take_staged().map(|l| l.width()), Some(3));
    }

    #[test]
    fn escape_pops() {
        let config = GameConfig::default();
        let mut view = LoadView::new(Path::new("does-not-exist"));
        let mut bus = SignalBus::new();
        let mut term = MemoryTerminal::new(40, 10);
        let mut ctx = Ctx { signals: &mut bus, term: &mut term, config: &config };
        view.handle_input(InputEvent::Escape, &mut ctx);
        assert!(view.wants_pop());
    }
}
