/// The running level: owns the `Level` exclusively and draws it through
/// `LevelRenderer`.
///
/// Loads and reloads replace the level as a whole value. The renderer is
/// invalidated afterwards so nothing from the previous level survives on
/// screen.

use std::path::Path;

use crate::config::GameConfig;
use crate::domain::entity::Direction;
use crate::error::GameError;
use crate::sim::level::Level;
use crate::sim::save;
use crate::sim::step::{self, PlayerAction};
use crate::ui::input::InputEvent;
use crate::ui::viewport::LevelRenderer;
use super::menu::MenuView;
use super::outcome::OutcomeView;
use super::signal::Signal;
use super::{Ctx, View};

pub struct SimulationView {
    level: Level,
    renderer: LevelRenderer,
    push: Option<Box<dyn View>>,
}

impl SimulationView {
    pub fn new(level: Level, config: &GameConfig, size: (u16, u16)) -> Self {
        SimulationView {
            level,
            renderer: LevelRenderer::new(config.hud_sample_ms, size),
            push: None,
        }
    }

    #[cfg(test)]
    pub fn level(&self) -> &Level {
        &self.level
    }

    /// Swap in a freshly loaded level, paused until CONTINUE.
    fn replace_level(&mut self, mut level: Level, paused: bool) {
        level.set_paused(paused);
        tracing::info!(level = %level.name, "level replaced");
        self.level = level;
        self.renderer.invalidate();
    }

    fn save(&self, path: &Path) -> bool {
        match save::save_level(&self.level, path) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("save failed: {e}");
                false
            }
        }
    }
}

impl View for SimulationView {
    fn name(&self) -> &'static str {
        "simulation"
    }

    fn manage(&mut self, ctx: &mut Ctx<'_>) -> Result<(), GameError> {
        let save_path = Path::new(&ctx.config.save_file);

        if ctx.signals.take(Signal::RequestSave) {
            let outcome = if self.save(save_path) { Signal::SaveSucceeded } else { Signal::SaveFailed };
            ctx.signals.post(outcome);
        }

        if ctx.signals.take(Signal::SaveAndQuit) {
            let outcome = if self.save(save_path) { Signal::Quit } else { Signal::SaveFailed };
            ctx.signals.post(outcome);
        }

        if ctx.signals.take(Signal::RequestLoad) {
            match save::load_level(save_path, &ctx.config.save_file, &ctx.config.rules) {
                Ok(level) => {
                    self.replace_level(level, true);
                    ctx.signals.post(Signal::LoadSucceeded);
                }
                Err(e) => {
                    tracing::warn!("load failed: {e}");
                    ctx.signals.post(Signal::LoadFailed);
                }
            }
        }

        if let Some(level) = ctx.signals.take_staged() {
            self.replace_level(level, true);
        }

        if ctx.signals.take(Signal::RetryLevel) {
            let name = self.level.name.clone();
            let path = save::resolve(&ctx.config.levels_dir, &name);
            let level = save::load_level(&path, &name, &ctx.config.rules)
                .map_err(|source| GameError::Reload { name, source })?;
            self.replace_level(level, false);
        }
        Ok(())
    }

    fn update(&mut self, ctx: &mut Ctx<'_>, delta_ms: u64) -> Result<(), GameError> {
        if ctx.signals.take(Signal::Continue) {
            self.level.set_paused(false);
            self.renderer.invalidate();
        }

        step::advance(&mut self.level, delta_ms);
        self.renderer.render(&mut self.level, ctx.term, delta_ms)?;

        let player = self.level.player_state();
        if player.reached_exit {
            tracing::info!(score = player.display_score(), lives = player.lives, "level won");
            self.push = Some(Box::new(OutcomeView::win(player.display_score(), player.lives)));
        } else if player.is_dead() {
            tracing::info!("level lost");
            self.push = Some(Box::new(OutcomeView::lose()));
        }
        Ok(())
    }

    fn handle_input(&mut self, event: InputEvent, _ctx: &mut Ctx<'_>) {
        let action = match event {
            InputEvent::Escape => {
                self.level.set_paused(true);
                self.push = Some(Box::new(MenuView::new()));
                return;
            }
            InputEvent::Up => PlayerAction::Move(Direction::Up),
            InputEvent::Down => PlayerAction::Move(Direction::Down),
            InputEvent::Left => PlayerAction::Move(Direction::Left),
            InputEvent::Right => PlayerAction::Move(Direction::Right),
            InputEvent::Char('w') => PlayerAction::Fire(Direction::Up),
            InputEvent::Char('a') => PlayerAction::Fire(Direction::Left),
            InputEvent::Char('s') => PlayerAction::Fire(Direction::Down),
            InputEvent::Char('d') => PlayerAction::Fire(Direction::Right),
            _ => return,
        };
        step::perform(&mut self.level, action);
    }

    fn resize(&mut self, cols: u16, rows: u16) {
        self.renderer.resize(cols, rows);
    }

    fn activate(&mut self) {
        self.renderer.invalidate();
    }

    fn wants_pop(&self) -> bool {
        false
    }

    fn take_push(&mut self) -> Option<Box<dyn View>> {
        self.push.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RulesConfig;
    use crate::domain::tile::StaticKind;
    use crate::ui::terminal::{MemoryTerminal, Terminal};
    use crate::view::signal::SignalBus;
    use crate::view::ViewStack;

    fn config_in(dir: &Path) -> GameConfig {
        GameConfig {
            save_file: dir.join("save.properties").to_string_lossy().into_owned(),
            levels_dir: dir.to_path_buf(),
            ..GameConfig::default()
        }
    }

    fn corridor() -> Level {
        let mut level = Level::new("corridor.properties", 6, 3, RulesConfig::default());
        level.add_static(0, 1, StaticKind::Entrance);
        level.add_static(2, 1, StaticKind::KeyPickup);
        level.add_static(5, 1, StaticKind::Exit);
        level.spawn_player(0, 1);
        level.reseed(3);
        level
    }

    struct Harness {
        stack: ViewStack,
        bus: SignalBus,
        term: MemoryTerminal,
        config: GameConfig,
    }

    impl Harness {
        fn new(config: GameConfig) -> Self {
            let term = MemoryTerminal::new(20, 8);
            let view = SimulationView::new(corridor(), &config, term.size());
            Harness { stack: ViewStack::new(Box::new(view)), bus: SignalBus::new(), term, config }
        }

        fn tick(&mut self) {
            let mut ctx = Ctx { signals: &mut self.bus, term: &mut self.term, config: &self.config };
            self.stack.tick(&mut ctx, 16).expect("tick");
        }

        fn press(&mut self, event: InputEvent) {
            let mut ctx = Ctx { signals: &mut self.bus, term: &mut self.term, config: &self.config };
            self.stack.dispatch(event, &mut ctx);
            self.tick();
        }
    }

    #[test]
    fn escape_pauses_and_opens_menu_then_continue_resumes() {
        let mut h = Harness::new(GameConfig::default());
        h.tick();
        h.press(InputEvent::Escape);
        assert_eq!(h.stack.top_name(), Some("menu"));

        h.press(InputEvent::Escape);
        assert_eq!(h.stack.top_name(), Some("simulation"));
        assert!(!h.bus.is_posted(Signal::Continue));
        assert!(h.term.contains("SCORE"));
    }

    #[test]
    fn reaching_the_exit_shows_win_screen() {
        let mut h = Harness::new(GameConfig::default());
        h.tick();
        for _ in 0..5 {
            h.press(InputEvent::Right);
        }
        h.tick();
        assert_eq!(h.stack.top_name(), Some("outcome"));
        assert!(h.term.contains("LEGENDARY!"));
    }

    #[test]
    fn save_then_load_round_trips_through_the_menu_signals() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut h = Harness::new(config_in(dir.path()));
        h.tick();
        h.press(InputEvent::Right);

        h.bus.post(Signal::RequestSave);
        h.tick();
        assert!(h.bus.take(Signal::SaveSucceeded));
        assert!(dir.path().join("save.properties").is_file());

        h.press(InputEvent::Right);
        h.bus.post(Signal::RequestLoad);
        h.tick();
        assert!(h.bus.is_posted(Signal::LoadSucceeded));
    }

    #[test]
    fn failed_load_posts_load_failed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut h = Harness::new(config_in(dir.path()));
        h.bus.post(Signal::RequestLoad);
        h.tick();
        assert!(h.bus.is_posted(Signal::LoadFailed));
        assert!(!h.bus.is_posted(Signal::LoadSucceeded));
    }

    #[test]
    fn loaded_level_replaces_the_running_one_paused() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = config_in(dir.path());
        let mut saved = corridor();
        saved.spawn_player(3, 1);
        save::save_level(&saved, Path::new(&config.save_file)).expect("save");

        let mut view = SimulationView::new(corridor(), &config, (20, 8));
        let mut bus = SignalBus::new();
        let mut term = MemoryTerminal::new(20, 8);
        bus.post(Signal::RequestLoad);
        let mut ctx = Ctx { signals: &mut bus, term: &mut term, config: &config };
        view.manage(&mut ctx).expect("manage");
        assert_eq!(view.level().player().pos(), (3, 1));
        assert!(view.level().player_state().paused);
    }

    #[test]
    fn retry_reloads_from_levels_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = config_in(dir.path());
        save::save_level(&corridor(), &dir.path().join("corridor.properties")).expect("save");

        let mut view = SimulationView::new(corridor(), &config, (20, 8));
        view.level.player_state_mut().lives = 0;
        let mut bus = SignalBus::new();
        let mut term = MemoryTerminal::new(20, 8);
        bus.post(Signal::RetryLevel);
        let mut ctx = Ctx { signals: &mut bus, term: &mut term, config: &config };
        view.manage(&mut ctx).expect("manage");
        assert_eq!(view.level().player_state().lives, RulesConfig::default().start_lives);
    }

    #[test]
    fn retry_without_file_is_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = config_in(dir.path());
        let mut view = SimulationView::new(corridor(), &config, (20, 8));
        let mut bus = SignalBus::new();
        let mut term = MemoryTerminal::new(20, 8);
        bus.post(Signal::RetryLevel);
        let mut ctx = Ctx { signals: &mut bus, term: &mut term, config: &config };
        assert!(matches!(view.manage(&mut ctx), Err(GameError::Reload { .. })));
    }
}
