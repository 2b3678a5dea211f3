use std::collections::{HashSet, VecDeque};

use log::debug;
use pathfinding::directed::bfs::bfs;

use crate::board::{Board, Move};

/// Depth past which the search stops expanding nodes.
pub const DEFAULT_MAX_DEPTH: usize = 100;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SearchLimits {
    pub max_depth: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        SearchLimits {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// `path` is one shortest move sequence; `moves == path.len()`.
    Solved { moves: usize, path: Vec<Move> },
    /// Every reachable configuration was visited without finding the exit.
    Unsolvable,
    /// No solution within the depth ceiling, but some nodes at the ceiling
    /// were left unexpanded, so a longer solution may exist.
    DepthLimited,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes taken off the frontier and expanded.
    pub expanded: usize,
    /// Child boards produced by expansion, duplicates included.
    pub generated: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solution {
    pub outcome: Outcome,
    pub stats: SearchStats,
}

impl Solution {
    /// `false` for both unsolvable and depth-limited searches.
    pub fn is_solvable(&self) -> bool {
        matches!(self.outcome, Outcome::Solved { .. })
    }

    pub fn min_moves(&self) -> Option<usize> {
        match self.outcome {
            Outcome::Solved { moves, .. } => Some(moves),
            _ => None,
        }
    }

    pub fn path(&self) -> &[Move] {
        match &self.outcome {
            Outcome::Solved { path, .. } => path,
            _ => &[],
        }
    }
}

struct Node {
    board: Board,
    depth: usize,
    path: Vec<Move>,
}

pub fn solve(board: &Board) -> Solution {
    solve_with(board, SearchLimits::default())
}

/// Breadth-first search for the fewest slides that bring the target to the
/// exit.
///
/// Boards are marked visited when first generated, so each configuration is
/// enqueued at most once and always at its shortest distance from `board`.
pub fn solve_with(board: &Board, limits: SearchLimits) -> Solution {
    let mut stats = SearchStats::default();

    if board.is_solved() {
        return Solution {
            outcome: Outcome::Solved {
                moves: 0,
                path: Vec::new(),
            },
            stats,
        };
    }
    if board.target().is_none() {
        debug!("board has no target vehicle, nothing to solve");
        return Solution {
            outcome: Outcome::Unsolvable,
            stats,
        };
    }

    debug!(
        "searching {} vehicles, depth limit {}",
        board.vehicles().count(),
        limits.max_depth
    );

    let mut visited = HashSet::new();
    visited.insert(board.canonical_key());

    let mut frontier = VecDeque::new();
    frontier.push_back(Node {
        board: board.clone(),
        depth: 0,
        path: Vec::new(),
    });

    let mut truncated = false;
    while let Some(node) = frontier.pop_front() {
        if node.depth >= limits.max_depth {
            truncated = true;
            continue;
        }

        stats.expanded += 1;
        for (mv, child) in node.board.successors() {
            stats.generated += 1;
            if !visited.insert(child.canonical_key()) {
                continue;
            }

            let mut path = node.path.clone();
            path.push(mv);

            // ties at this depth are all minimal, the first one found wins
            if child.is_solved() {
                debug!(
                    "solved in {} moves (expanded {}, generated {})",
                    node.depth + 1,
                    stats.expanded,
                    stats.generated
                );
                return Solution {
                    outcome: Outcome::Solved {
                        moves: node.depth + 1,
                        path,
                    },
                    stats,
                };
            }

            frontier.push_back(Node {
                board: child,
                depth: node.depth + 1,
                path,
            });
        }
    }

    let outcome = if truncated {
        Outcome::DepthLimited
    } else {
        Outcome::Unsolvable
    };
    debug!(
        "no solution: {:?} after {} states (expanded {}, generated {})",
        outcome,
        visited.len(),
        stats.expanded,
        stats.generated
    );

    Solution { outcome, stats }
}

// panics on the first illegal move, like Board::apply_move
pub fn replay(board: &Board, path: &[Move]) -> Board {
    path.iter().fold(board.clone(), |b, mv| b.apply_move(mv))
}

/// Length of the shortest solution found by an uncapped breadth-first search
/// over whole boards. Slower than [`solve`] but shares none of its
/// bookkeeping, which makes it useful as a cross-check.
pub fn shortest_path_len(board: &Board) -> Option<usize> {
    bfs(
        board,
        |b| b.successors().map(|(_, next)| next).collect::<Vec<_>>(),
        Board::is_solved,
    )
    .map(|states| states.len() - 1)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::board::{parse_board, Orientation, Vehicle, TARGET_ID};

    // target row is blocked by A, which can only leave upwards once B is out of the way
    const THREE_MOVES: &str = "
        . . B B . .
        . . . . . .
        R R . A . .
        . . . A . .
        . . . C . .
        . . . C . .
    ";

    const CARD: &str = "
        A A . . . O
        P . . Q . O
        P R R Q . O
        P . . . . .
        B . . . C C
        B . E E E .
    ";

    fn lone_target() -> Board {
        let mut board = Board::default();
        board.try_place(Vehicle::target(2, 0)).unwrap();
        board
    }

    fn solvable_within(board: &Board, depth: usize) -> bool {
        board.is_solved()
            || depth > 0
                && board
                    .successors()
                    .any(|(_, next)| solvable_within(&next, depth - 1))
    }

    #[test]
    fn already_solved_board_needs_no_moves() {
        let mut board = Board::default();
        board.try_place(Vehicle::target(2, 4)).unwrap();

        let solution = solve(&board);
        assert!(solution.is_solvable());
        assert_eq!(solution.min_moves(), Some(0));
        assert!(solution.path().is_empty());
        assert_eq!(solution.stats, SearchStats::default());
    }

    #[test]
    fn board_without_target_is_unsolvable() {
        let mut board = Board::default();
        board
            .try_place(Vehicle::new("car_0", Orientation::Horizontal, 2, 2, 0))
            .unwrap();

        let solution = solve(&board);
        assert!(!solution.is_solvable());
        assert_eq!(solution.outcome, Outcome::Unsolvable);
        assert!(solution.path().is_empty());
    }

    #[test]
    fn open_lane_takes_a_single_slide() {
        let solution = solve(&lone_target());
        assert_eq!(
            solution.outcome,
            Outcome::Solved {
                moves: 1,
                path: vec![Move::new(TARGET_ID, 4)],
            }
        );
    }

    #[test]
    fn immovable_wall_is_unsolvable() {
        let mut board = lone_target();
        board
            .try_place(Vehicle::new("wall", Orientation::Vertical, 6, 0, 5))
            .unwrap();

        let solution = solve(&board);
        assert_eq!(solution.outcome, Outcome::Unsolvable);
        assert_eq!(solution.min_moves(), None);
        // the target can still shuffle between columns 0 and 3
        assert_eq!(solution.stats.expanded, 4);
    }

    #[test]
    fn two_clearing_moves_then_the_exit() {
        let board = parse_board(THREE_MOVES).unwrap();
        let solution = solve(&board);

        assert_eq!(solution.min_moves(), Some(3));
        assert_eq!(solution.path().len(), 3);
        assert_eq!(solution.path().last(), Some(&Move::new(TARGET_ID, 4)));
        assert!(replay(&board, solution.path()).is_solved());
        assert!(!solvable_within(&board, 2));
    }

    #[test]
    fn reported_minimum_is_never_beaten() {
        for text in [THREE_MOVES, CARD] {
            let board = parse_board(text).unwrap();
            let solution = solve(&board);
            let moves = solution.min_moves().expect("board is solvable");

            assert!(replay(&board, solution.path()).is_solved());
            assert!(!solvable_within(&board, moves - 1));
        }
    }

    #[test]
    fn agrees_with_whole_board_bfs() {
        for text in [THREE_MOVES, CARD] {
            let board = parse_board(text).unwrap();
            assert_eq!(solve(&board).min_moves(), shortest_path_len(&board));
        }

        let mut walled = lone_target();
        walled
            .try_place(Vehicle::new("wall", Orientation::Vertical, 6, 0, 5))
            .unwrap();
        assert_eq!(shortest_path_len(&walled), None);
    }

    #[test]
    fn depth_ceiling_is_reported_separately() {
        let board = parse_board(THREE_MOVES).unwrap();

        for max_depth in [1, 2] {
            let solution = solve_with(&board, SearchLimits { max_depth });
            assert_eq!(solution.outcome, Outcome::DepthLimited);
            assert!(!solution.is_solvable());
        }

        // solutions exactly at the ceiling are still found
        let solution = solve_with(&board, SearchLimits { max_depth: 3 });
        assert_eq!(solution.min_moves(), Some(3));
    }

    #[test]
    fn stats_count_expansions() {
        let solution = solve(&parse_board(THREE_MOVES).unwrap());
        assert!(solution.stats.expanded > 0);
        assert!(solution.stats.generated >= solution.stats.expanded);
    }
}
