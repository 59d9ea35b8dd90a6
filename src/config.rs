/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::{Path, PathBuf};

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub start_level: String,
    pub save_file: String,
    pub levels_dir: PathBuf,
    pub log_file: PathBuf,
    pub log_level: String,
    pub frame_sleep_ms: u64,
    pub hud_sample_ms: u64,
    pub rules: RulesConfig,
    pub gamepad: GamepadConfig,
}

/// Gameplay constants carried by every level.
#[derive(Clone, Debug, PartialEq)]
pub struct RulesConfig {
    pub start_lives: u32,
    pub fire_cooldown_ms: u64,
    pub player_anim_ms: u64,
    pub projectile_step_ms: u64,
    pub hazard_anim_ms: u64,
    pub hazard_move_ms: u64,
    pub damage_cooldown_ms: u64,
    /// Probability that a hazard ignores the player and wanders.
    pub wander_chance: f64,
    pub static_penalty: Penalty,
    pub mobile_penalty: Penalty,
    pub key_bonus_divisor: i64,
    pub projectile_bonus_divisor: i64,
}

/// Score change applied with a lost life.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Penalty {
    /// score -= base_value / divisor
    Divisor { divisor: i64 },
    /// score += points (normally negative)
    Points { points: i64 },
}

impl Penalty {
    pub fn score_delta(self, base_value: i64) -> i64 {
        match self {
            Penalty::Divisor { divisor } => -(base_value / divisor.max(1)),
            Penalty::Points { points } => points,
        }
    }
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub fire_up: Vec<String>,
    pub fire_left: Vec<String>,
    pub fire_down: Vec<String>,
    pub fire_right: Vec<String>,
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    player: TomlPlayer,
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    hazard: TomlHazard,
    #[serde(default)]
    scoring: TomlScoring,
    #[serde(default)]
    gamepad: TomlGamepad,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_start_level")]
    start_level: String,
    #[serde(default = "default_save_file")]
    save_file: String,
    #[serde(default = "default_levels_dir")]
    levels_dir: String,
    #[serde(default = "default_log_file")]
    log_file: String,
    #[serde(default = "default_log_level")]
    log_level: String,
}

#[derive(Deserialize, Debug)]
struct TomlPlayer {
    #[serde(default = "default_start_lives")]
    start_lives: u32,
    #[serde(default = "default_fire_cooldown")]
    fire_cooldown_ms: u64,
    #[serde(default = "default_player_anim")]
    anim_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_projectile_step")]
    projectile_step_ms: u64,
    #[serde(default = "default_hazard_anim")]
    hazard_anim_ms: u64,
    #[serde(default = "default_hazard_move")]
    hazard_move_ms: u64,
    #[serde(default = "default_damage_cooldown")]
    damage_cooldown_ms: u64,
    #[serde(default = "default_hud_sample")]
    hud_sample_ms: u64,
    #[serde(default = "default_frame_sleep")]
    frame_sleep_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlHazard {
    #[serde(default = "default_wander_chance")]
    wander_chance: f64,
}

#[derive(Deserialize, Debug)]
struct TomlScoring {
    #[serde(default = "default_penalty")]
    static_hazard_penalty: Penalty,
    #[serde(default = "default_penalty")]
    mobile_hazard_penalty: Penalty,
    #[serde(default = "default_key_bonus")]
    key_bonus_divisor: i64,
    #[serde(default = "default_projectile_bonus")]
    projectile_bonus_divisor: i64,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_fire_up")]
    fire_up: Vec<String>,
    #[serde(default = "default_fire_left")]
    fire_left: Vec<String>,
    #[serde(default = "default_fire_down")]
    fire_down: Vec<String>,
    #[serde(default = "default_fire_right")]
    fire_right: Vec<String>,
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
}

// ── Defaults ──

fn default_start_level() -> String { "level_demo.properties".into() }
fn default_save_file() -> String { "save.properties".into() }
fn default_levels_dir() -> String { "levels".into() }
fn default_log_file() -> String { "keyrunner.log".into() }
fn default_log_level() -> String { "info".into() }

fn default_start_lives() -> u32 { 5 }
fn default_fire_cooldown() -> u64 { 1000 }
fn default_player_anim() -> u64 { 500 }

fn default_projectile_step() -> u64 { 150 }
fn default_hazard_anim() -> u64 { 100 }
fn default_hazard_move() -> u64 { 500 }
fn default_damage_cooldown() -> u64 { 1000 }
fn default_hud_sample() -> u64 { 1000 }
fn default_frame_sleep() -> u64 { 5 }

fn default_wander_chance() -> f64 { 0.4 }  // 2 in 5

fn default_penalty() -> Penalty { Penalty::Divisor { divisor: 5 } }
fn default_key_bonus() -> i64 { 2 }
fn default_projectile_bonus() -> i64 { 4 }

fn default_fire_up() -> Vec<String> { vec!["Y".into()] }
fn default_fire_left() -> Vec<String> { vec!["X".into(), "L1".into()] }
fn default_fire_down() -> Vec<String> { vec!["A".into()] }
fn default_fire_right() -> Vec<String> { vec!["B".into(), "R1".into()] }
fn default_confirm() -> Vec<String> { vec!["Start".into()] }
fn default_cancel() -> Vec<String> { vec!["Select".into()] }

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            start_level: default_start_level(),
            save_file: default_save_file(),
            levels_dir: default_levels_dir(),
            log_file: default_log_file(),
            log_level: default_log_level(),
        }
    }
}

impl Default for TomlPlayer {
    fn default() -> Self {
        TomlPlayer {
            start_lives: default_start_lives(),
            fire_cooldown_ms: default_fire_cooldown(),
            anim_ms: default_player_anim(),
        }
    }
}

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            projectile_step_ms: default_projectile_step(),
            hazard_anim_ms: default_hazard_anim(),
            hazard_move_ms: default_hazard_move(),
            damage_cooldown_ms: default_damage_cooldown(),
            hud_sample_ms: default_hud_sample(),
            frame_sleep_ms: default_frame_sleep(),
        }
    }
}

impl Default for TomlHazard {
    fn default() -> Self {
        TomlHazard { wander_chance: default_wander_chance() }
    }
}

impl Default for TomlScoring {
    fn default() -> Self {
        TomlScoring {
            static_hazard_penalty: default_penalty(),
            mobile_hazard_penalty: default_penalty(),
            key_bonus_divisor: default_key_bonus(),
            projectile_bonus_divisor: default_projectile_bonus(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            fire_up: default_fire_up(),
            fire_left: default_fire_left(),
            fire_down: default_fire_down(),
            fire_right: default_fire_right(),
            confirm: default_confirm(),
            cancel: default_cancel(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::from_toml(TomlConfig::default(), &[])
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        TomlConfig::default().rules()
    }
}

impl TomlConfig {
    fn rules(&self) -> RulesConfig {
        RulesConfig {
            start_lives: self.player.start_lives,
            fire_cooldown_ms: self.player.fire_cooldown_ms,
            player_anim_ms: self.player.anim_ms,
            projectile_step_ms: self.timing.projectile_step_ms,
            hazard_anim_ms: self.timing.hazard_anim_ms,
            hazard_move_ms: self.timing.hazard_move_ms,
            damage_cooldown_ms: self.timing.damage_cooldown_ms,
            wander_chance: self.hazard.wander_chance,
            static_penalty: self.scoring.static_hazard_penalty,
            mobile_penalty: self.scoring.mobile_hazard_penalty,
            key_bonus_divisor: self.scoring.key_bonus_divisor,
            projectile_bonus_divisor: self.scoring.projectile_bonus_divisor,
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        Self::from_toml(toml_cfg, &search_dirs)
    }

    fn from_toml(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let rules = toml_cfg.rules();

        let levels_dir_str = &toml_cfg.general.levels_dir;
        let levels_dir = if Path::new(levels_dir_str).is_absolute() {
            PathBuf::from(levels_dir_str)
        } else {
            search_dirs.iter()
                .map(|d| d.join(levels_dir_str))
                .find(|p| p.is_dir())
                .unwrap_or_else(|| PathBuf::from(levels_dir_str))
        };

        GameConfig {
            start_level: toml_cfg.general.start_level,
            save_file: toml_cfg.general.save_file,
            levels_dir,
            log_file: PathBuf::from(toml_cfg.general.log_file),
            log_level: toml_cfg.general.log_level,
            frame_sleep_ms: toml_cfg.timing.frame_sleep_ms,
            hud_sample_ms: toml_cfg.timing.hud_sample_ms,
            rules,
            gamepad: GamepadConfig {
                fire_up: toml_cfg.gamepad.fire_up,
                fire_left: toml_cfg.gamepad.fire_left,
                fire_down: toml_cfg.gamepad.fire_down,
                fire_right: toml_cfg.gamepad.fire_right,
                confirm: toml_cfg.gamepad.confirm,
                cancel: toml_cfg.gamepad.cancel,
            },
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> TomlConfig {
        toml::from_str(text).expect("valid toml")
    }

    #[test]
    fn empty_file_gives_defaults() {
        let rules = parse("").rules();
        assert_eq!(rules, RulesConfig::default());
        assert_eq!(rules.start_lives, 5);
        assert_eq!(rules.hazard_move_ms, 500);
        assert_eq!(rules.static_penalty, Penalty::Divisor { divisor: 5 });
    }

    #[test]
    fn penalty_accepts_both_conventions() {
        let cfg = parse(
            "[scoring]\n\
             static_hazard_penalty = { divisor = 4 }\n\
             mobile_hazard_penalty = { points = -10000 }\n",
        );
        let rules = cfg.rules();
        assert_eq!(rules.static_penalty.score_delta(20_000), -5000);
        assert_eq!(rules.mobile_penalty.score_delta(20_000), -10_000);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = parse("[timing]\nhazard_move_ms = 300\n[general]\nsave_file = \"slot.properties\"\n");
        assert_eq!(cfg.rules().hazard_move_ms, 300);
        assert_eq!(cfg.rules().projectile_step_ms, 150);
        let game = GameConfig::from_toml(cfg, &[]);
        assert_eq!(game.save_file, "slot.properties");
        assert_eq!(game.hud_sample_ms, 1000);
        assert_eq!(game.levels_dir, PathBuf::from("levels"));
    }

    #[test]
    fn zero_divisor_does_not_panic() {
        assert_eq!(Penalty::Divisor { divisor: 0 }.score_delta(100), -100);
    }

    #[test]
    fn bundled_config_matches_defaults() {
        let cfg = parse(include_str!("../config.toml"));
        assert_eq!(cfg.rules(), RulesConfig::default());
        let game = GameConfig::from_toml(cfg, &[]);
        assert_eq!(game.start_level, "level_demo.properties");
        assert_eq!(game.gamepad.fire_left, vec!["X".to_string(), "L1".to_string()]);
    }
}
