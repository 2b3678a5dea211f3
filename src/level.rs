use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::board::{Board, Orientation, Vehicle, DEFAULT_SIZE, MAX_SIZE, TARGET_ID, TARGET_LENGTH};
use crate::error::LevelError;
use crate::generator::GeneratedLevel;

/// On-disk collection of levels, as consumed by the game.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelFile {
    pub levels: Vec<Level>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub id: usize,
    pub difficulty: String,
    #[serde(rename = "minMoves")]
    pub min_moves: usize,
    /// Only written for boards that are not the standard 6x6.
    #[serde(default = "default_size", skip_serializing_if = "is_default_size")]
    pub size: usize,
    pub vehicles: Vec<LevelVehicle>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelVehicle {
    pub id: String,
    pub orientation: Orientation,
    pub length: usize,
    pub position: Position,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_target: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

fn default_size() -> usize {
    DEFAULT_SIZE
}

fn is_default_size(size: &usize) -> bool {
    *size == DEFAULT_SIZE
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Level {
    /// Describes `board` as a level record.
    ///
    /// The target is listed first. Other vehicles are renamed `car{n}` or
    /// `truck{n}` by length, numbered from 1 in id order.
    pub fn from_board(board: &Board, id: usize, min_moves: usize) -> Level {
        let (targets, others): (Vec<&Vehicle>, Vec<&Vehicle>) =
            board.vehicles().partition(|v| v.id.is_target());

        let target = targets.into_iter().map(|v| LevelVehicle {
            id: TARGET_ID.to_string(),
            is_target: true,
            ..LevelVehicle::from(v)
        });
        let rest = others.into_iter().enumerate().map(|(n, v)| {
            let prefix = if v.length == 2 { "car" } else { "truck" };
            LevelVehicle {
                id: format!("{prefix}{}", n + 1),
                ..LevelVehicle::from(v)
            }
        });

        Level {
            id,
            difficulty: "Generated".to_string(),
            min_moves,
            size: board.size(),
            vehicles: target.chain(rest).collect(),
        }
    }

    pub fn from_generated(level: &GeneratedLevel, id: usize) -> Level {
        Level::from_board(&level.board, id, level.min_moves)
    }

    /// Rebuilds the board, re-checking every placement.
    pub fn to_board(&self) -> Result<Board, LevelError> {
        let min = TARGET_LENGTH + 1;
        if !(min..=MAX_SIZE).contains(&self.size) {
            return Err(LevelError::UnsupportedSize {
                level: self.id,
                size: self.size,
                min,
                max: MAX_SIZE,
            });
        }

        let mut board = Board::new(self.size);
        for v in &self.vehicles {
            let id = if v.is_target { TARGET_ID } else { v.id.as_str() };
            let vehicle = Vehicle::new(id, v.orientation, v.length, v.position.row, v.position.col);
            board
                .try_place(vehicle)
                .map_err(|source| LevelError::Placement {
                    level: self.id,
                    source,
                })?;
        }

        if board.target().is_none() {
            return Err(LevelError::MissingTarget { level: self.id });
        }
        Ok(board)
    }
}

impl From<&Vehicle> for LevelVehicle {
    fn from(v: &Vehicle) -> Self {
        LevelVehicle {
            id: v.id.to_string(),
            orientation: v.orientation,
            length: v.length,
            position: Position {
                row: v.row,
                col: v.col,
            },
            is_target: false,
        }
    }
}

impl LevelFile {
    pub fn load(path: &Path) -> Result<Self, LevelError> {
        let content = fs::read_to_string(path).map_err(|source| LevelError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| LevelError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), LevelError> {
        let json = serde_json::to_string_pretty(self).map_err(|source| LevelError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|source| LevelError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
