/// Error types for level files and the top-level game loop.

use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LevelError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("missing required key `{0}`")]
    MissingKey(&'static str),
    #[error("bad value `{value}` for `{key}`: {source}")]
    Parse {
        key: String,
        value: String,
        #[source]
        source: ParseIntError,
    },
    #[error("level dimensions must be positive, got {width}x{height}")]
    Dimensions { width: i64, height: i64 },
}

#[derive(Error, Debug)]
pub enum GameError {
    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),
    #[error("failed to load start level `{name}`: {source}")]
    StartLevel {
        name: String,
        #[source]
        source: LevelError,
    },
    #[error("failed to reload level `{name}`: {source}")]
    Reload {
        name: String,
        #[source]
        source: LevelError,
    },
}
