/// Cross-cutting signal bus.
///
/// Screens never hold references to each other. They post named signals
/// here and test for (or take) the ones they care about during their
/// management update. The bus also carries one staged level, handed from
/// the filename prompt to the simulation screen in a single swap.

use crate::sim::level::Level;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Signal {
    Continue,
    RequestSave,
    RequestLoad,
    RequestLoadByName,
    ShowLegend,
    Quit,
    SaveSucceeded,
    SaveFailed,
    LoadSucceeded,
    LoadFailed,
    SaveAndQuit,
    RetryLevel,
}

#[derive(Default)]
pub struct SignalBus {
    posted: Vec<Signal>,
    staged: Option<Level>,
}

impl SignalBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Posting an already posted signal is a no-op.
    pub fn post(&mut self, signal: Signal) {
        if !self.posted.contains(&signal) {
            tracing::debug!(?signal, "signal posted");
            self.posted.push(signal);
        }
    }

    pub fn is_posted(&self, signal: Signal) -> bool {
        self.posted.contains(&signal)
    }

    /// Clear `signal`, returning whether it was posted.
    pub fn take(&mut self, signal: Signal) -> bool {
        match self.posted.iter().position(|s| *s == signal) {
            Some(i) => {
                self.posted.remove(i);
                true
            }
            None => false,
        }
    }

    pub fn stage_level(&mut self, level: Level) {
        self.staged = Some(level);
    }

    pub fn take_staged(&mut self) -> Option<Level> {
        self.staged.take()
    }
}
