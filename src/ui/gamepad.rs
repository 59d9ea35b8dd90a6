/// Gamepad input tracker using gilrs.
///
/// Presses are translated into the same `InputEvent`s the keyboard
/// produces, so screens never know which device was used.
/// Button mapping comes from the `[gamepad]` section of config.toml.
/// Default mapping:
///   D-pad / Left Stick    →  Arrow keys
///   Y / X / A / B         →  Fire up / left / down / right
///   Start                 →  Enter
///   Select                →  Escape

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use super::input::InputEvent;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.5;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,      // LeftTrigger
    R1,      // RightTrigger
    Start,
    Select,
}

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH"  => Some(Btn::A),
            "B" | "EAST"   => Some(Btn::B),
            "X" | "WEST"   => Some(Btn::X),
            "Y" | "NORTH"  => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER"  => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South     => Some(Btn::A),
            Button::East      => Some(Btn::B),
            Button::West      => Some(Btn::X),
            Button::North     => Some(Btn::Y),
            Button::LeftTrigger  => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::Start     => Some(Btn::Start),
            Button::Select    => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Button-to-event mapping (loaded from config).
struct ActionMap {
    bindings: Vec<(Btn, InputEvent)>,
}

impl ActionMap {
    fn from_config(cfg: &GamepadConfig) -> Self {
        fn parse_list(names: &[String]) -> Vec<Btn> {
            names.iter().filter_map(|s| Btn::from_name(s)).collect()
        }
        let groups: [(&[String], InputEvent); 6] = [
            (&cfg.fire_up, InputEvent::Char('w')),
            (&cfg.fire_left, InputEvent::Char('a')),
            (&cfg.fire_down, InputEvent::Char('s')),
            (&cfg.fire_right, InputEvent::Char('d')),
            (&cfg.confirm, InputEvent::Enter),
            (&cfg.cancel, InputEvent::Escape),
        ];
        let mut bindings = Vec::new();
        for (names, event) in groups {
            for btn in parse_list(names) {
                bindings.push((btn, event));
            }
        }
        ActionMap { bindings }
    }

    fn event_for(&self, btn: Btn) -> Option<InputEvent> {
        self.bindings.iter().find(|(b, _)| *b == btn).map(|(_, e)| *e)
    }
}

/// Edge detector for the analog stick (one event per push past the deadzone).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct StickLatch {
    x: f32,
    y: f32,
    engaged: bool,
}

impl StickLatch {
    /// Returns an arrow event on the frame the stick leaves the deadzone.
    fn update(&mut self) -> Option<InputEvent> {
        let dir = if self.x < -STICK_DEADZONE {
            Some(InputEvent::Left)
        } else if self.x > STICK_DEADZONE {
            Some(InputEvent::Right)
        } else if self.y > STICK_DEADZONE {
            Some(InputEvent::Up)
        } else if self.y < -STICK_DEADZONE {
            Some(InputEvent::Down)
        } else {
            None
        };
        let fire = if self.engaged { None } else { dir };
        self.engaged = dir.is_some();
        fire
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    action_map: ActionMap,
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick: StickLatch,
    pub connected: bool,
}

impl GamepadState {
    pub fn new(cfg: &GamepadConfig) -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = {
            match Gilrs::new() {
                Ok(g) => {
                    let has_pad = g.gamepads().next().is_some();
                    (Some(g), has_pad)
                }
                Err(e) => {
                    tracing::debug!("gamepad support unavailable: {e}");
                    (None, false)
                }
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            action_map: ActionMap::from_config(cfg),
            stick: StickLatch::default(),
            connected,
        }
    }

    /// Translate pending gamepad events into input events.
    pub fn poll(&mut self, out: &mut Vec<InputEvent>) {
        #[cfg(feature = "gamepad")]
        self.poll_gilrs(out);
        #[cfg(not(feature = "gamepad"))]
        let _ = out;
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self, out: &mut Vec<InputEvent>) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    if let Some(ev) = self.press(btn) {
                        out.push(ev);
                    }
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    match axis {
                        Axis::LeftStickX => self.stick.x = value,
                        Axis::LeftStickY => self.stick.y = value,
                        _ => {}
                    }
                    if let Some(ev) = self.stick.update() {
                        out.push(ev);
                    }
                }
                EventType::Connected => {
                    self.connected = true;
                    tracing::info!("gamepad connected");
                }
                EventType::Disconnected => {
                    self.connected = false;
                    self.stick = StickLatch::default();
                    tracing::info!("gamepad disconnected");
                }
                _ => {}
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn press(&self, gilrs_btn: Button) -> Option<InputEvent> {
        // D-pad handled separately (not in Btn enum)
        match gilrs_btn {
            Button::DPadUp    => Some(InputEvent::Up),
            Button::DPadDown  => Some(InputEvent::Down),
            Button::DPadLeft  => Some(InputEvent::Left),
            Button::DPadRight => Some(InputEvent::Right),
            other => Btn::from_gilrs(other).and_then(|b| self.action_map.event_for(b)),
        }
    }
}
