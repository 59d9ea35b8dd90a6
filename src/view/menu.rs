/// Pause menu pushed by the simulation on Escape.
///
/// Entries only post signals; the simulation screen does the actual
/// saving and loading and answers with *-succeeded / *-failed signals,
/// which end up on the status line here.

use crate::domain::tile::Color;
use crate::error::GameError;
use crate::ui::input::InputEvent;
use super::legend::LegendView;
use super::load::LoadView;
use super::signal::Signal;
use super::{draw_lines, Ctx, View};

const TITLE: &str = "THE ADVENTURES OF X";

const ENTRIES: [(&str, Signal); 7] = [
    ("Continue", Signal::Continue),
    ("Legend", Signal::ShowLegend),
    ("Save Current Game", Signal::RequestSave),
    ("Load Save File", Signal::RequestLoad),
    ("Load file by name", Signal::RequestLoadByName),
    ("Save+Quit", Signal::SaveAndQuit),
    ("Quit", Signal::Quit),
];

pub struct MenuView {
    cursor: usize,
    status: Option<(String, Color)>,
    dirty: bool,
    pop: bool,
    push: Option<Box<dyn View>>,
}

impl MenuView {
    pub fn new() -> Self {
        MenuView { cursor: 0, status: None, dirty: true, pop: false, push: None }
    }

    fn set_status(&mut self, text: String, color: Color) {
        self.status = Some((text, color));
        self.dirty = true;
    }

    fn lines(&self) -> Vec<(String, Color)> {
        let mut lines = vec![(TITLE.to_string(), Color::Yellow), (String::new(), Color::Default)];
        for (i, (label, _)) in ENTRIES.iter().enumerate() {
            let marker = if i == self.cursor { "> " } else { "  " };
            let color = if i == self.cursor { Color::Cyan } else { Color::White };
            lines.push((format!("{marker}{label}"), color));
        }
        if let Some((text, color)) = &self.status {
            lines.push((String::new(), Color::Default));
            lines.push((text.clone(), *color));
        }
        lines
    }
}

impl View for MenuView {
    fn name(&self) -> &'static str {
        "menu"
    }

    fn manage(&mut self, ctx: &mut Ctx<'_>) -> Result<(), GameError> {
        if ctx.signals.take(Signal::LoadSucceeded) {
            ctx.signals.post(Signal::Continue);
        }
        // left posted for the simulation screen
        if ctx.signals.is_posted(Signal::Continue) {
            self.pop = true;
        }
        if ctx.signals.take(Signal::ShowLegend) {
            self.push = Some(Box::new(LegendView::new()));
        }
        if ctx.signals.take(Signal::RequestLoadByName) {
            self.push = Some(Box::new(LoadView::new(&ctx.config.levels_dir)));
        }
        if ctx.signals.take(Signal::SaveSucceeded) {
            let text = format!("Successfully saved file to {}.", ctx.config.save_file);
            self.set_status(text, Color::Green);
        }
        if ctx.signals.take(Signal::SaveFailed) {
            self.set_status(format!("Saving to {} failed.", ctx.config.save_file), Color::Red);
        }
        if ctx.signals.take(Signal::LoadFailed) {
            self.set_status(format!("Loading {} failed.", ctx.config.save_file), Color::Red);
        }
        Ok(())
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
            InputEvent::Up => {
                self.cursor = (self.cursor + ENTRIES.len() - 1) % ENTRIES.len();
                self.dirty = true;
            }
            InputEvent::Down => {
                self.cursor = (self.cursor + 1) % ENTRIES.len();
                self.dirty = true;
            }
            InputEvent::Enter => ctx.signals.post(ENTRIES[self.cursor].1),
            InputEvent::Escape => ctx.signals.post(Signal::Continue),
            _ => {}
        }
    }

    fn activate(&mut self) {
        self.dirty = true;
    }

    fn wants_pop(&self) -> bool {
        self.pop
    }

    fn take_push(&mut self) -> Option<Box<dyn View>> {
        self.push.take()
    }
}
