/// Modal screens layered over the running level.
///
/// Per tick, in order:
///   1. every screen gets `manage()`, bottom to top
///   2. the top is popped if it asked to be
///   3. the top's pending push (read once) goes on the stack
///   4. the top screen gets `update()`
///
/// Input is delivered to the top screen only. The game ends on the QUIT
/// signal; an empty stack posts QUIT itself.

pub mod legend;
pub mod load;
pub mod menu;
pub mod outcome;
pub mod signal;
pub mod simulation;

use crate::config::GameConfig;
use crate::domain::tile::Color;
use crate::error::GameError;
use crate::ui::input::InputEvent;
use crate::ui::terminal::Terminal;
use signal::{Signal, SignalBus};

/// Everything a screen may touch during a callback.
pub struct Ctx<'a> {
    pub signals: &'a mut SignalBus,
    pub term: &'a mut dyn Terminal,
    pub config: &'a GameConfig,
}

pub trait View {
    fn name(&self) -> &'static str;

    /// Background bookkeeping, run for every screen on the stack.
    fn manage(&mut self, _ctx: &mut Ctx<'_>) -> Result<(), GameError> {
        Ok(())
    }

    /// Advance and draw. Only the top screen is updated.
    fn update(&mut self, ctx: &mut Ctx<'_>, delta_ms: u64) -> Result<(), GameError>;

    fn handle_input(&mut self, event: InputEvent, ctx: &mut Ctx<'_>);

    fn resize(&mut self, _cols: u16, _rows: u16) {}

    /// Became the top screen on a freshly cleared terminal.
    fn activate(&mut self);

    fn wants_pop(&self) -> bool;

    fn take_push(&mut self) -> Option<Box<dyn View>>;
}

pub struct ViewStack {
    views: Vec<Box<dyn View>>,
}

impl ViewStack {
    pub fn new(mut root: Box<dyn View>) -> Self {
        root.activate();
        ViewStack { views: vec![root] }
    }

    pub fn tick(&mut self, ctx: &mut Ctx<'_>, delta_ms: u64) -> Result<(), GameError> {
        for view in self.views.iter_mut() {
            view.manage(ctx)?;
        }

        let Some(top) = self.views.last_mut() else {
            ctx.signals.post(Signal::Quit);
            return Ok(());
        };
        let push = top.take_push();
        if top.wants_pop() {
            if let Some(gone) = self.views.pop() {
                tracing::debug!(view = gone.name(), "view popped");
            }
            if let Some(next) = self.views.last_mut() {
                ctx.term.clear()?;
                next.activate();
            }
        }
        if let Some(mut next) = push {
            tracing::debug!(view = next.name(), "view pushed");
            ctx.term.clear()?;
            next.activate();
            self.views.push(next);
        }

        match self.views.last_mut() {
            Some(top) => top.update(ctx, delta_ms),
            None => {
                ctx.signals.post(Signal::Quit);
                Ok(())
            }
        }
    }

    pub fn dispatch(&mut self, event: InputEvent, ctx: &mut Ctx<'_>) {
        if event == InputEvent::Interrupt {
            ctx.signals.post(Signal::Quit);
            return;
        }
        if let Some(top) = self.views.last_mut() {
            top.handle_input(event, ctx);
        }
    }

    /// Terminal size changed: clear, resize every screen, redraw the top.
    pub fn resize(&mut self, ctx: &mut Ctx<'_>) -> Result<(), GameError> {
        ctx.term.clear()?;
        let (cols, rows) = ctx.term.size();
        for view in self.views.iter_mut() {
            view.resize(cols, rows);
        }
        ctx.term.hide_cursor()?;
        if let Some(top) = self.views.last_mut() {
            top.activate();
        }
        Ok(())
    }
}

#[cfg(test)]
impl ViewStack {
    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn top_name(&self) -> Option<&'static str> {
        self.views.last().map(|v| v.name())
    }
}

/// Draw `lines` top-down from row 0, each with its own colors.
pub(crate) fn draw_lines(term: &mut dyn Terminal, lines: &[(String, Color)]) -> std::io::Result<()> {
    for (row, (text, fg)) in lines.iter().enumerate() {
        let Ok(y) = u16::try_from(row) else { break };
        term.put_str(0, y, text, *fg, Color::Default)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::terminal::MemoryTerminal;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    /// Scripted screen that records every callback.
    struct Probe {
        name: &'static str,
        log: Log,
        pop_on: Option<Signal>,
        pop: bool,
        push: Option<Box<dyn View>>,
    }

    impl Probe {
        fn boxed(name: &'static str, log: &Log) -> Box<Probe> {
            Box::new(Probe { name, log: log.clone(), pop_on: None, pop: false, push: None })
        }
    }

    impl View for Probe {
        fn name(&self) -> &'static str {
            self.name
        }
        fn manage(&mut self, ctx: &mut Ctx<'_>) -> Result<(), GameError> {
            self.log.borrow_mut().push(format!("manage {}", self.name));
            if let Some(s) = self.pop_on {
                if ctx.signals.is_posted(s) {
                    self.pop = true;
                }
            }
            Ok(())
        }
        fn update(&mut self, _ctx: &mut Ctx<'_>, _delta_ms: u64) -> Result<(), GameError> {
            self.log.borrow_mut().push(format!("update {}", self.name));
            Ok(())
        }
        fn handle_input(&mut self, event: InputEvent, _ctx: &mut Ctx<'_>) {
            self.log.borrow_mut().push(format!("input {} {:?}", self.name, event));
        }
        fn activate(&mut self) {
            self.log.borrow_mut().push(format!("activate {}", self.name));
        }
        fn wants_pop(&self) -> bool {
            self.pop
        }
        fn take_push(&mut self) -> Option<Box<dyn View>> {
            self.push.take()
        }
    }

    fn run(stack: &mut ViewStack, bus: &mut SignalBus, term: &mut MemoryTerminal) {
        let config = GameConfig::default();
        let mut ctx = Ctx { signals: bus, term, config: &config };
        stack.tick(&mut ctx, 16).expect("tick");
    }

    #[test]
    fn manage_runs_for_all_update_only_for_top() {
        let log = Log::default();
        let mut root = Probe::boxed("root", &log);
        root.push = Some(Probe::boxed("menu", &log));
        let mut stack = ViewStack::new(root);
        let mut bus = SignalBus::new();
        let mut term = MemoryTerminal::new(20, 5);

        run(&mut stack, &mut bus, &mut term);
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.top_name(), Some("menu"));
        log.borrow_mut().clear();

        run(&mut stack, &mut bus, &mut term);
        assert_eq!(*log.borrow(), vec!["manage root", "manage menu", "update menu"]);
    }

    #[test]
    fn push_is_read_once() {
        let log = Log::default();
        let mut root = Probe::boxed("root", &log);
        root.push = Some(Probe::boxed("legend", &log));
        let mut stack = ViewStack::new(root);
        let mut bus = SignalBus::new();
        let mut term = MemoryTerminal::new(20, 5);
        run(&mut stack, &mut bus, &mut term);
        run(&mut stack, &mut bus, &mut term);
        assert_eq!(stack.len(), 2);
        assert_eq!(term.clears, 1);
    }

    #[test]
    fn pop_reactivates_the_view_below() {
        let log = Log::default();
        let mut root = Probe::boxed("root", &log);
        let mut menu = Probe::boxed("menu", &log);
        menu.pop_on = Some(Signal::Continue);
        root.push = Some(menu);
        let mut stack = ViewStack::new(root);
        let mut bus = SignalBus::new();
        let mut term = MemoryTerminal::new(20, 5);
        run(&mut stack, &mut bus, &mut term);

        bus.post(Signal::Continue);
        log.borrow_mut().clear();
        run(&mut stack, &mut bus, &mut term);
        assert_eq!(stack.top_name(), Some("root"));
        assert_eq!(*log.borrow(), vec!["manage root", "manage menu", "activate root", "update root"]);
        assert!(bus.is_posted(Signal::Continue));
    }

    #[test]
    fn empty_stack_posts_quit() {
        let log = Log::default();
        let mut root = Probe::boxed("root", &log);
        root.pop = true;
        let mut stack = ViewStack::new(root);
        let mut bus = SignalBus::new();
        let mut term = MemoryTerminal::new(20, 5);
        run(&mut stack, &mut bus, &mut term);
        assert_eq!(stack.len(), 0);
        assert!(bus.is_posted(Signal::Quit));
    }

    #[test]
    fn input_goes_to_top_and_interrupt_quits() {
        let log = Log::default();
        let mut root = Probe::boxed("root", &log);
        root.push = Some(Probe::boxed("menu", &log));
        let mut stack = ViewStack::new(root);
        let mut bus = SignalBus::new();
        let mut term = MemoryTerminal::new(20, 5);
        run(&mut stack, &mut bus, &mut term);
        log.borrow_mut().clear();

        let config = GameConfig::default();
        let mut ctx = Ctx { signals: &mut bus, term: &mut term, config: &config };
        stack.dispatch(InputEvent::Down, &mut ctx);
        stack.dispatch(InputEvent::Interrupt, &mut ctx);
        assert_eq!(*log.borrow(), vec!["input menu Down"]);
        assert!(bus.is_posted(Signal::Quit));
    }

    #[test]
    fn resize_clears_and_activates_top() {
        let log = Log::default();
        let mut stack = ViewStack::new(Probe::boxed("root", &log));
        let mut bus = SignalBus::new();
        let mut term = MemoryTerminal::new(20, 5);
        log.borrow_mut().clear();
        let config = GameConfig::default();
        let mut ctx = Ctx { signals: &mut bus, term: &mut term, config: &config };
        stack.resize(&mut ctx).expect("resize");
        assert_eq!(*log.borrow(), vec!["activate root"]);
        assert_eq!(term.clears, 1);
    }
}
