/// Two-line status display below the viewport.
///
///   row 0: one heart per life
///   row 1: key status at column 0, score and trend at column 15
///
/// Each line is repainted only when its value changes, or when forced
/// after a clear.

use std::io;

use crate::domain::entity::{PlayerState, Timer};
use crate::domain::tile::Color;
use super::terminal::Terminal;

pub const HUD_ROWS: u16 = 2;
const SCORE_COLUMN: u16 = 15;
const HEART: char = '♥';

pub struct Hud {
    lives: Option<u32>,
    has_key: Option<bool>,
    score_line: Option<(i64, i64)>,
    sample: Timer,
    sample_score: Option<i64>,
    trend: i64,
}

impl Hud {
    pub fn new(sample_ms: u64) -> Self {
        Hud {
            lives: None,
            has_key: None,
            score_line: None,
            sample: Timer::new(sample_ms),
            sample_score: None,
            trend: 0,
        }
    }

    /// Repaint every line on the next render.
    pub fn force(&mut self) {
        self.lives = None;
        self.has_key = None;
        self.score_line = None;
    }

    /// Score change over the last sample window, truncated to thousands.
    #[cfg(test)]
    pub fn trend(&self) -> i64 {
        self.trend
    }

    fn sample_trend(&mut self, score: i64, delta_ms: u64) {
        let base = *self.sample_score.get_or_insert(score);
        if self.sample.tick(delta_ms) {
            self.trend = (score - base) / 1000 * 1000;
            self.sample_score = Some(score);
        }
    }

    pub fn render(
        &mut self,
        term: &mut dyn Terminal,
        player: &PlayerState,
        top: u16,
        delta_ms: u64,
    ) -> io::Result<()> {
        let (cols, _) = term.size();
        let score = player.display_score();
        self.sample_trend(score, delta_ms);

        if self.lives != Some(player.lives) {
            let hearts = (player.lives as usize).min(cols as usize);
            let line = format!("{:<width$}", HEART.to_string().repeat(hearts), width = cols as usize);
            term.put_str(0, top, &line, Color::Red, Color::Default)?;
            self.lives = Some(player.lives);
        }

        if self.has_key != Some(player.has_key) {
            let text = if player.has_key { "HAS KEY: YES" } else { "HAS KEY: NO " };
            term.put_str(0, top + 1, text, Color::Yellow, Color::Default)?;
            self.has_key = Some(player.has_key);
        }

        if self.score_line != Some((score, self.trend)) {
            let trend = match self.trend {
                t if t > 0 => format!(" +{t}"),
                t if t < 0 => format!(" {t}"),
                _ => String::new(),
            };
            let width = cols.saturating_sub(SCORE_COLUMN) as usize;
            let line = format!("{:<width$}", format!("SCORE: {score}{trend}"), width = width);
            term.put_str(SCORE_COLUMN, top + 1, &line, Color::Green, Color::Default)?;
            self.score_line = Some((score, self.trend));
        }
        Ok(())
    }
}
