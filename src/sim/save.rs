/// Level and save files.
///
/// ## File format
///   `.properties`-style `key=value` lines. `#`/`!` start a comment,
///   `:` is accepted in place of `=`, blank lines are skipped.
///
///   ```text
///   Width=10
///   Height=10
///   playerX=1
///   playerY=1
///   playerLives=5
///   playerScore=20000
///   playerHaskey=false
///   0,0=0
///   ```
///
///   The `player*` keys appear only in save files. Cells are `x,y=code`.
///
/// ## Cell codes
///   0 Wall  1 Entrance  2 Exit  3 Static trap  4 Moving trap  5 Key  6 Health
///
/// A file without `playerX` is a fresh level: the player spawns on the
/// first Entrance (x-major order).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::RulesConfig;
use crate::domain::tile::StaticKind;
use crate::error::LevelError;
use super::level::Level;

const CODE_MOVING_HAZARD: u8 = 4;

const KEY_WIDTH: &str = "Width";
const KEY_HEIGHT: &str = "Height";
const KEY_PLAYER_X: &str = "playerX";
const KEY_PLAYER_Y: &str = "playerY";
const KEY_PLAYER_LIVES: &str = "playerLives";
const KEY_PLAYER_SCORE: &str = "playerScore";
const KEY_PLAYER_HASKEY: &str = "playerHaskey";

// ══════════════════════════════════════════════════════════════
// Files
// ══════════════════════════════════════════════════════════════

pub fn load_level(path: &Path, name: &str, rules: &RulesConfig) -> Result<Level, LevelError> {
    let text = std::fs::read_to_string(path).map_err(|source| LevelError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let level = from_properties(name, &text, rules)?;
    tracing::info!(
        name,
        width = level.width(),
        height = level.height(),
        entities = level.entities.len(),
        "level loaded"
    );
    Ok(level)
}

/// The whole file goes out in a single write.
pub fn save_level(level: &Level, path: &Path) -> Result<(), LevelError> {
    std::fs::write(path, to_properties(level)).map_err(|source| LevelError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), "level saved");
    Ok(())
}

/// Level files in `dir` (names containing `.properties`), sorted.
pub fn list_levels(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .flatten()
            .filter(|e| e.path().is_file())
            .filter_map(|e| e.file_name().to_str().map(str::to_string))
            .filter(|n| n.contains(".properties"))
            .collect(),
        Err(_) => Vec::new(),
    };
    names.sort();
    names
}

pub fn resolve(dir: &Path, name: &str) -> PathBuf {
    let direct = PathBuf::from(name);
    if direct.is_absolute() || direct.is_file() {
        direct
    } else {
        dir.join(name)
    }
}

// ══════════════════════════════════════════════════════════════
// Encoding
// ══════════════════════════════════════════════════════════════

pub fn to_properties(level: &Level) -> String {
    let player = level.player();
    let state = level.player_state();

    let mut out = format!(
        "{KEY_WIDTH}={}\n{KEY_HEIGHT}={}\n{KEY_PLAYER_X}={}\n{KEY_PLAYER_Y}={}\n\
         {KEY_PLAYER_LIVES}={}\n{KEY_PLAYER_SCORE}={}\n{KEY_PLAYER_HASKEY}={}\n",
        level.width(),
        level.height(),
        player.x,
        player.y,
        state.lives,
        state.display_score(),
        state.has_key,
    );

    // One code per cell; a hazard standing on a tile is not representable.
    let mut cells: Vec<((i32, i32), u8)> = level
        .grid
        .iter_x_major()
        .map(|(x, y, t)| ((x, y), t.kind.save_code()))
        .collect();
    for e in level.entities.iter().filter(|e| e.persistent() && !e.at_sentinel()) {
        if !cells.iter().any(|(pos, _)| *pos == e.pos()) {
            cells.push((e.pos(), CODE_MOVING_HAZARD));
        }
    }
    cells.sort_by_key(|&((x, y), _)| (x, y));
    for ((x, y), code) in cells {
        out.push_str(&format!("{x},{y}={code}\n"));
    }
    out
}

// ══════════════════════════════════════════════════════════════
// Decoding
// ══════════════════════════════════════════════════════════════

fn parse_properties(text: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        let split = line.find(|c| c == '=' || c == ':');
        let (key, value) = match split {
            Some(i) => (&line[..i], &line[i + 1..]),
            None => (line, ""),
        };
        map.insert(key.trim().to_string(), value.trim().to_string());
    }
    map
}

fn parse_num<T: std::str::FromStr<Err = std::num::ParseIntError>>(
    key: &str,
    value: &str,
) -> Result<T, LevelError> {
    value.parse::<T>().map_err(|source| LevelError::Parse {
        key: key.to_string(),
        value: value.to_string(),
        source,
    })
}

fn required<'a>(props: &'a HashMap<String, String>, key: &'static str) -> Result<&'a str, LevelError> {
    props.get(key).map(String::as_str).ok_or(LevelError::MissingKey(key))
}

fn cell_key(key: &str) -> Option<(i32, i32)> {
    let (x, y) = key.split_once(',')?;
    Some((x.trim().parse().ok()?, y.trim().parse().ok()?))
}

pub fn from_properties(name: &str, text: &str, rules: &RulesConfig) -> Result<Level, LevelError> {
    let props = parse_properties(text);

    let width: i64 = parse_num(KEY_WIDTH, required(&props, KEY_WIDTH)?)?;
    let height: i64 = parse_num(KEY_HEIGHT, required(&props, KEY_HEIGHT)?)?;
    if width <= 0 || height <= 0 {
        return Err(LevelError::Dimensions { width, height });
    }

    let mut level = Level::new(name, width as usize, height as usize, rules.clone());

    // HashMap order is arbitrary; hazards get handles in x-major order.
    let mut cells: Vec<((i32, i32), &str, &str)> = props
        .iter()
        .filter_map(|(k, v)| cell_key(k).map(|pos| (pos, k.as_str(), v.as_str())))
        .collect();
    cells.sort_by_key(|&(pos, _, _)| pos);

    for ((x, y), key, value) in cells {
        let code: i64 = parse_num(key, value)?;
        if !level.grid.in_bounds(x, y) {
            tracing::warn!(x, y, "cell outside level bounds ignored");
            continue;
        }
        let code = u8::try_from(code).ok();
        if code == Some(CODE_MOVING_HAZARD) {
            level.add_hazard(x, y);
        } else if let Some(kind) = code.and_then(StaticKind::from_save_code) {
            level.add_static(x, y, kind);
        } else {
            tracing::debug!(x, y, value, "unknown cell code ignored");
        }
    }

    if let Some(px) = props.get(KEY_PLAYER_X) {
        let px: i32 = parse_num(KEY_PLAYER_X, px)?;
        let py: i32 = parse_num(KEY_PLAYER_Y, required(&props, KEY_PLAYER_Y)?)?;
        let lives: u32 = parse_num(KEY_PLAYER_LIVES, required(&props, KEY_PLAYER_LIVES)?)?;
        let score: i64 = parse_num(KEY_PLAYER_SCORE, required(&props, KEY_PLAYER_SCORE)?)?;
        let has_key = props.get(KEY_PLAYER_HASKEY).map_or(false, |v| v.eq_ignore_ascii_case("true"));
        level.spawn_player(px, py);
        let state = level.player_state_mut();
        state.lives = lives;
        state.score = score;
        state.has_key = has_key;
    } else if let Some((ex, ey)) = level.entrance() {
        level.spawn_player(ex, ey);
    } else {
        tracing::warn!(name, "level has no entrance, player starts at 0,0");
        level.spawn_player(0, 0);
    }

    Ok(level)
}
