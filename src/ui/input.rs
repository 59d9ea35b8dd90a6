/// Keyboard input queue.
///
/// Drains every pending crossterm event without blocking and turns key
/// presses into `InputEvent`s. Screens consume one event per tick, so a
/// burst of key presses is spread over consecutive frames instead of
/// being collapsed.
///
/// Resize events are not queued; they are reported to the caller so the
/// terminal can flag a pending resize.

use std::collections::VecDeque;
use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InputEvent {
    Up,
    Down,
    Left,
    Right,
    Enter,
    Escape,
    Backspace,
    Char(char),
    /// Ctrl+C
    Interrupt,
}

impl InputEvent {
    pub fn from_key(key: KeyEvent) -> Option<InputEvent> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
        {
            return Some(InputEvent::Interrupt);
        }
        match key.code {
            KeyCode::Up => Some(InputEvent::Up),
            KeyCode::Down => Some(InputEvent::Down),
            KeyCode::Left => Some(InputEvent::Left),
            KeyCode::Right => Some(InputEvent::Right),
            KeyCode::Enter => Some(InputEvent::Enter),
            KeyCode::Esc => Some(InputEvent::Escape),
            KeyCode::Backspace => Some(InputEvent::Backspace),
            KeyCode::Char(c) => Some(InputEvent::Char(c)),
            _ => None,
        }
    }
}

pub struct InputState {
    queue: VecDeque<InputEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState { queue: VecDeque::with_capacity(16) }
    }

    /// Read all available terminal events without blocking.
    /// Returns the last reported terminal size if a resize arrived.
    pub fn drain_events(&mut self) -> Option<(u16, u16)> {
        let mut resized = None;
        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) => {
                    if let Some(ev) = InputEvent::from_key(key) {
                        self.queue.push_back(ev);
                    }
                }
                Ok(Event::Resize(cols, rows)) => resized = Some((cols, rows)),
                _ => {}
            }
        }
        resized
    }

    pub fn push(&mut self, event: InputEvent) {
        self.queue.push_back(event);
    }

    pub fn next_event(&mut self) -> Option<InputEvent> {
        self.queue.pop_front()
    }
}
