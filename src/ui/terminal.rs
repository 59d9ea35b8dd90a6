/// Terminal capability used by the renderer and screens.
///
/// `CrosstermTerminal` batches every write with `queue!` and flushes once
/// per frame. Writes that fall outside the current terminal size are
/// clipped: during a resize race the next frame repaints everything anyway.

#[cfg(test)]
use std::collections::VecDeque;
use std::io::{self, BufWriter, Stdout, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{self, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::config::GamepadConfig;
use crate::domain::tile::Color;
use super::gamepad::GamepadState;
use super::input::{InputEvent, InputState};

pub trait Terminal {
    /// (columns, rows)
    fn size(&self) -> (u16, u16);
    fn put_str(&mut self, x: u16, y: u16, text: &str, fg: Color, bg: Color) -> io::Result<()>;
    fn clear(&mut self) -> io::Result<()>;
    /// True once per resize; the new size is already reported by `size()`.
    fn take_resize(&mut self) -> bool;
    fn poll_input(&mut self) -> Option<InputEvent>;
    fn hide_cursor(&mut self) -> io::Result<()>;
    fn flush(&mut self) -> io::Result<()>;
}

/// Visible part of `text` when written at column `x` of a `cols`-wide row.
fn clip(text: &str, x: u16, cols: u16) -> &str {
    let room = cols.saturating_sub(x) as usize;
    match text.char_indices().nth(room) {
        Some((i, _)) => &text[..i],
        None => text,
    }
}

fn to_crossterm(c: Color) -> style::Color {
    match c {
        Color::Default => style::Color::Reset,
        Color::Black => style::Color::Black,
        Color::Red => style::Color::DarkRed,
        Color::Green => style::Color::DarkGreen,
        Color::Yellow => style::Color::DarkYellow,
        Color::Cyan => style::Color::DarkCyan,
        Color::White => style::Color::White,
    }
}

// ── Crossterm ──

pub struct CrosstermTerminal {
    writer: BufWriter<Stdout>,
    cols: u16,
    rows: u16,
    resize_pending: bool,
    keyboard: InputState,
    gamepad: GamepadState,
    pad_events: Vec<InputEvent>,
}

impl CrosstermTerminal {
    pub fn new(gamepad: &GamepadConfig) -> Self {
        CrosstermTerminal {
            writer: BufWriter::with_capacity(64 * 1024, io::stdout()),
            cols: 80,
            rows: 24,
            resize_pending: false,
            keyboard: InputState::new(),
            gamepad: GamepadState::new(gamepad),
            pad_events: Vec::with_capacity(8),
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            Clear(ClearType::All)
        )?;
        let (cols, rows) = terminal::size().unwrap_or((80, 24));
        self.cols = cols;
        self.rows = rows;
        tracing::debug!(cols, rows, gamepad = self.gamepad.connected, "terminal ready");
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    fn pump(&mut self) {
        if let Some((cols, rows)) = self.keyboard.drain_events() {
            self.cols = cols;
            self.rows = rows;
            self.resize_pending = true;
            tracing::debug!(cols, rows, "terminal resized");
        }
        self.gamepad.poll(&mut self.pad_events);
        for ev in self.pad_events.drain(..) {
            self.keyboard.push(ev);
        }
    }
}

impl Terminal for CrosstermTerminal {
    fn size(&self) -> (u16, u16) {
        (self.cols, self.rows)
    }

    fn put_str(&mut self, x: u16, y: u16, text: &str, fg: Color, bg: Color) -> io::Result<()> {
        if y >= self.rows || x >= self.cols {
            return Ok(());
        }
        queue!(
            self.writer,
            MoveTo(x, y),
            SetForegroundColor(to_crossterm(fg)),
            SetBackgroundColor(to_crossterm(bg)),
            Print(clip(text, x, self.cols)),
            ResetColor
        )
    }

    fn clear(&mut self) -> io::Result<()> {
        queue!(self.writer, ResetColor, Clear(ClearType::All))
    }

    fn take_resize(&mut self) -> bool {
        self.pump();
        std::mem::take(&mut self.resize_pending)
    }

    fn poll_input(&mut self) -> Option<InputEvent> {
        self.pump();
        self.keyboard.next_event()
    }

    fn hide_cursor(&mut self) -> io::Result<()> {
        queue!(self.writer, cursor::Hide)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

// ── In-memory (tests) ──

/// Character grid that records what would have been drawn.
#[cfg(test)]
pub struct MemoryTerminal {
    pub cols: u16,
    pub rows: u16,
    pub cells: Vec<Vec<(char, Color, Color)>>,
    pub writes: usize,
    pub clears: usize,
    pub input: VecDeque<InputEvent>,
    resize_pending: bool,
}

#[cfg(test)]
impl MemoryTerminal {
    pub fn new(cols: u16, rows: u16) -> Self {
        MemoryTerminal {
            cols,
            rows,
            cells: vec![vec![(' ', Color::Default, Color::Default); cols as usize]; rows as usize],
            writes: 0,
            clears: 0,
            input: VecDeque::new(),
            resize_pending: false,
        }
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        *self = MemoryTerminal { input: std::mem::take(&mut self.input), ..MemoryTerminal::new(cols, rows) };
        self.resize_pending = true;
    }

    pub fn row(&self, y: u16) -> String {
        self.cells[y as usize].iter().map(|c| c.0).collect()
    }

    pub fn char_at(&self, x: u16, y: u16) -> char {
        self.cells[y as usize][x as usize].0
    }

    pub fn contains(&self, needle: &str) -> bool {
        (0..self.rows).any(|y| self.row(y).contains(needle))
    }
}

#[cfg(test)]
impl Terminal for MemoryTerminal {
    fn size(&self) -> (u16, u16) {
        (self.cols, self.rows)
    }

    fn put_str(&mut self, x: u16, y: u16, text: &str, fg: Color, bg: Color) -> io::Result<()> {
        if y >= self.rows || x >= self.cols {
            return Ok(());
        }
        self.writes += 1;
        for (i, ch) in clip(text, x, self.cols).chars().enumerate() {
            self.cells[y as usize][x as usize + i] = (ch, fg, bg);
        }
        Ok(())
    }

    fn clear(&mut self) -> io::Result<()> {
        self.clears += 1;
        for row in &mut self.cells {
            row.fill((' ', Color::Default, Color::Default));
        }
        Ok(())
    }

    fn take_resize(&mut self) -> bool {
        std::mem::take(&mut self.resize_pending)
    }

    fn poll_input(&mut self) -> Option<InputEvent> {
        self.input.pop_front()
    }

    fn hide_cursor(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
