use std::path::PathBuf;

use crate::board::VehicleId;

/// Reasons a vehicle cannot be admitted onto a board.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    #[error("vehicle {id} has length {length}, vehicles are at least 2 cells long")]
    TooShort { id: VehicleId, length: usize },

    #[error("the target vehicle must be horizontal with length 2")]
    MalformedTarget,

    #[error("vehicle {0} is already on the board")]
    DuplicateId(VehicleId),

    #[error("vehicle {id} does not fit on a {size}x{size} board")]
    OutOfBounds { id: VehicleId, size: usize },

    #[error("vehicle {id} overlaps vehicle {other}")]
    Overlap { id: VehicleId, other: VehicleId },
}

/// Errors produced when reading a board from its text form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("board text is empty")]
    Empty,

    #[error("row {row} has {found} cells, expected {expected}")]
    NotSquare {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("cells marked '{0}' do not form a straight line")]
    NotStraight(char),

    #[error(transparent)]
    Placement(#[from] PlacementError),
}

/// Errors produced when loading or saving level records.
#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    #[error("failed to read levels from {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write levels to {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid level JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("level {level} is {size}x{size}, supported sizes are {min} to {max}")]
    UnsupportedSize {
        level: usize,
        size: usize,
        min: usize,
        max: usize,
    },

    #[error("level {level} has no target vehicle")]
    MissingTarget { level: usize },

    #[error("level {level}: {source}")]
    Placement {
        level: usize,
        source: PlacementError,
    },
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
