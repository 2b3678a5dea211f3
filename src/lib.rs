pub mod board;
pub mod config;
pub mod error;
pub mod generator;
pub mod level;
pub mod solver;

pub use board::{parse_board, Board, Move, Orientation, Vehicle, VehicleId, TARGET_ID};
pub use solver::{solve, solve_with, Outcome, SearchLimits, Solution};
