use log::{debug, info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::board::{Board, Orientation, Vehicle, DEFAULT_SIZE, MAX_SIZE, TARGET_LENGTH};
use crate::error::ConfigError;
use crate::solver::{solve_with, SearchLimits, Solution, DEFAULT_MAX_DEPTH};

const CAR_LENGTH: usize = 2;
const TRUCK_LENGTH: usize = 3;

/// Parameters for random level generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub size: usize,
    /// Row the target drives along towards the exit.
    pub target_row: usize,
    /// Candidates solvable in fewer moves are rejected.
    pub min_moves: usize,
    pub max_attempts: usize,
    pub min_vehicles: usize,
    pub max_vehicles: usize,
    pub truck_probability: f64,
    /// Random anchors tried per obstacle before it is dropped.
    pub placement_attempts: usize,
    pub max_depth: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            size: DEFAULT_SIZE,
            target_row: 2,
            min_moves: 15,
            max_attempts: 1000,
            min_vehicles: 8,
            max_vehicles: 13,
            truck_probability: 0.3,
            placement_attempts: 20,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(TARGET_LENGTH + 1..=MAX_SIZE).contains(&self.size) {
            return Err(ConfigError::Validation(format!(
                "size must be between {} and {}, got {}",
                TARGET_LENGTH + 1,
                MAX_SIZE,
                self.size
            )));
        }
        if self.target_row >= self.size {
            return Err(ConfigError::Validation(format!(
                "target_row {} is outside a {}x{} board",
                self.target_row, self.size, self.size
            )));
        }
        if self.min_vehicles > self.max_vehicles {
            return Err(ConfigError::Validation(format!(
                "min_vehicles ({}) exceeds max_vehicles ({})",
                self.min_vehicles, self.max_vehicles
            )));
        }
        if !(0.0..=1.0).contains(&self.truck_probability) {
            return Err(ConfigError::Validation(format!(
                "truck_probability must be within [0, 1], got {}",
                self.truck_probability
            )));
        }
        if self.max_attempts == 0 || self.placement_attempts == 0 {
            return Err(ConfigError::Validation(
                "max_attempts and placement_attempts must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// A board accepted by the generator together with its solution.
#[derive(Debug, Clone)]
pub struct GeneratedLevel {
    pub board: Board,
    pub min_moves: usize,
    pub solution: Solution,
}

/// Builds random boards and keeps the first one that is hard enough.
///
/// Randomness comes only from the generator passed in, so a seeded `rng`
/// reproduces the same levels.
pub struct Generator<R> {
    config: GeneratorConfig,
    rng: R,
}

impl<R: Rng> Generator<R> {
    pub fn new(config: GeneratorConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Generator { config, rng })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// One random board. The target never starts at the exit; obstacles that
    /// find no free spot within `placement_attempts` tries are left out.
    pub fn candidate(&mut self) -> Board {
        let size = self.config.size;
        let mut board = Board::new(size);

        let target_col = self.rng.random_range(0..=size - TARGET_LENGTH - 1);
        let placed = board.try_place(Vehicle::target(self.config.target_row, target_col));
        debug_assert!(placed.is_ok(), "empty board rejected the target: {placed:?}");

        let count = self
            .rng
            .random_range(self.config.min_vehicles..=self.config.max_vehicles);
        for i in 0..count {
            let length = if self.rng.random_bool(self.config.truck_probability) {
                TRUCK_LENGTH
            } else {
                CAR_LENGTH
            };
            let orientation = if self.rng.random_bool(0.5) {
                Orientation::Horizontal
            } else {
                Orientation::Vertical
            };
            let id = match length {
                CAR_LENGTH => format!("car_{i}"),
                _ => format!("truck_{i}"),
            };

            for _ in 0..self.config.placement_attempts {
                let row = self.rng.random_range(0..size);
                let col = self.rng.random_range(0..size);

                // a horizontal vehicle in the target's row can never be passed
                if row == self.config.target_row && orientation == Orientation::Horizontal {
                    continue;
                }

                let vehicle = Vehicle::new(id.as_str(), orientation, length, row, col);
                if board.try_place(vehicle).is_ok() {
                    break;
                }
            }
        }

        board
    }

    /// Draws up to `max_attempts` candidates and returns the first that is
    /// solvable in at least `min_moves` moves.
    pub fn generate(&mut self) -> Option<GeneratedLevel> {
        let limits = SearchLimits {
            max_depth: self.config.max_depth,
        };

        for attempt in 1..=self.config.max_attempts {
            let board = self.candidate();
            let solution = solve_with(&board, limits);

            match solution.min_moves() {
                Some(min_moves) if min_moves >= self.config.min_moves => {
                    info!(
                        "accepted candidate {} with {} vehicles, solvable in {} moves",
                        attempt,
                        board.vehicles().count(),
                        min_moves
                    );
                    return Some(GeneratedLevel {
                        board,
                        min_moves,
                        solution,
                    });
                }
                Some(min_moves) => debug!("candidate {attempt} too easy ({min_moves} moves)"),
                None => debug!("candidate {attempt} rejected: {:?}", solution.outcome),
            }
        }

        warn!(
            "no candidate needed {} moves within {} attempts",
            self.config.min_moves, self.config.max_attempts
        );
        None
    }
}

#[cfg(test)]
mod test {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::solver::replay;

    fn generator(config: GeneratorConfig, seed: u64) -> Generator<StdRng> {
        Generator::new(config, StdRng::seed_from_u64(seed)).unwrap()
    }

    #[test]
    fn candidates_are_valid_and_unsolved() {
        let mut generator = generator(GeneratorConfig::default(), 7);
        for _ in 0..50 {
            let board = generator.candidate();
            let target = board.target().expect("target is always placed");
            assert_eq!(target.row, 2);
            assert!(!board.is_solved());

            let cells: usize = board.vehicles().map(|v| v.length).sum();
            assert_eq!(board.occupied_cells().len(), cells, "vehicles overlap");
            assert!(board
                .occupied_cells()
                .iter()
                .all(|&(r, c)| r < board.size() && c < board.size()));
            assert!(board.vehicles().all(|v| v.id.is_target()
                || v.row != 2
                || v.orientation == Orientation::Vertical));
        }
    }

    #[test]
    fn same_seed_same_boards() {
        let mut a = generator(GeneratorConfig::default(), 42);
        let mut b = generator(GeneratorConfig::default(), 42);
        for _ in 0..10 {
            assert_eq!(a.candidate(), b.candidate());
        }
    }

    #[test]
    fn empty_boards_are_accepted_at_one_move() {
        let config = GeneratorConfig {
            min_moves: 1,
            min_vehicles: 0,
            max_vehicles: 0,
            ..GeneratorConfig::default()
        };
        let level = generator(config, 1).generate().expect("lone target is solvable");

        assert_eq!(level.min_moves, 1);
        assert_eq!(level.board.vehicles().count(), 1);
        assert!(replay(&level.board, level.solution.path()).is_solved());
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let config = GeneratorConfig {
            min_moves: 2,
            min_vehicles: 0,
            max_vehicles: 0,
            max_attempts: 5,
            ..GeneratorConfig::default()
        };
        assert!(generator(config, 1).generate().is_none());
    }

    #[test]
    fn accepted_levels_meet_the_difficulty() {
        let config = GeneratorConfig {
            min_moves: 2,
            min_vehicles: 6,
            max_vehicles: 6,
            max_attempts: 1000,
            ..GeneratorConfig::default()
        };
        let level = generator(config, 3)
            .generate()
            .expect("six obstacles block the target row within 1000 tries");

        assert!(level.min_moves >= 2);
        assert_eq!(level.solution.min_moves(), Some(level.min_moves));
        assert_eq!(level.solution.path().len(), level.min_moves);
        assert!(!level.board.is_solved());
        assert!(replay(&level.board, level.solution.path()).is_solved());
    }

    #[test]
    fn each_call_returns_a_fresh_level() {
        let config = GeneratorConfig {
            min_moves: 1,
            min_vehicles: 0,
            max_vehicles: 0,
            max_attempts: 3,
            ..GeneratorConfig::default()
        };
        let mut generator = generator(config, 11);
        for _ in 0..3 {
            assert_eq!(generator.generate().map(|level| level.min_moves), Some(1));
        }
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let bad = [
            GeneratorConfig {
                size: 2,
                ..GeneratorConfig::default()
            },
            GeneratorConfig {
                size: MAX_SIZE + 1,
                ..GeneratorConfig::default()
            },
            GeneratorConfig {
                target_row: 6,
                ..GeneratorConfig::default()
            },
            GeneratorConfig {
                min_vehicles: 5,
                max_vehicles: 4,
                ..GeneratorConfig::default()
            },
            GeneratorConfig {
                truck_probability: 1.5,
                ..GeneratorConfig::default()
            },
            GeneratorConfig {
                max_attempts: 0,
                ..GeneratorConfig::default()
            },
        ];
        for config in bad {
            assert!(matches!(
                Generator::new(config, StdRng::seed_from_u64(0)),
                Err(ConfigError::Validation(_))
            ));
        }
    }
}
