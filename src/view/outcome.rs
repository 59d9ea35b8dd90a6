/// Win and lose screens. Enter retries the level from disk, Escape quits.

use crate::domain::tile::Color;
use crate::error::GameError;
use crate::ui::input::InputEvent;
use super::signal::Signal;
use super::{draw_lines, Ctx, View};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Outcome {
    Won { score: i64, lives: u32 },
    Lost,
}

pub struct OutcomeView {
    outcome: Outcome,
    dirty: bool,
    pop: bool,
}

impl OutcomeView {
    pub fn win(score: i64, lives: u32) -> Self {
        OutcomeView { outcome: Outcome::Won { score, lives }, dirty: true, pop: false }
    }

    pub fn lose() -> Self {
        OutcomeView { outcome: Outcome::Lost, dirty: true, pop: false }
    }

    fn lines(&self) -> Vec<(String, Color)> {
        match self.outcome {
            Outcome::Won { score, lives } => vec![
                ("LEGENDARY!".to_string(), Color::Green),
                (format!("You have beaten the level with {score} points!"), Color::White),
                (format!("You had {lives} lives left!"), Color::White),
                ("Press Escape to end the game. Enter to restart the level!".to_string(), Color::Default),
            ],
            Outcome::Lost => vec![
                ("DISASTROUS :(".to_string(), Color::Red),
                ("You have lost the game. Esc to end. Enter to retry.".to_string(), Color::White),
            ],
        }
    }
}

impl View for OutcomeView {
    fn name(&self) -> &'static str {
        "outcome"
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
            InputEvent::Enter => {
                ctx.signals.post(Signal::RetryLevel);
                self.pop = true;
            }
            InputEvent::Escape => ctx.signals.post(Signal::Quit),
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
        None
    }
}
