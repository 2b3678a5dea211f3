use std::{
    borrow::Borrow,
    collections::{BTreeMap, HashSet},
    fmt::{self, Display},
    sync::Arc,
};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{ParseError, PlacementError};

/// Reserved id of the vehicle that has to reach the exit.
pub const TARGET_ID: &str = "target";
pub const TARGET_LENGTH: usize = 2;
pub const DEFAULT_SIZE: usize = 6;
/// Largest board accepted from level files and configuration.
pub const MAX_SIZE: usize = 16;

const EMPTY: char = '.';
const TARGET_SYMBOL: char = 'R';

pub type Cell = (usize, usize);

/// Search fingerprint of a board: `(id, row, col)` for every vehicle, sorted by id.
pub type CanonicalKey = SmallVec<[(VehicleId, usize, usize); 16]>;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Cheaply clonable vehicle name. Every board copy shares the same strings.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VehicleId(Arc<str>);

impl VehicleId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_target(&self) -> bool {
        &*self.0 == TARGET_ID
    }
}

impl From<&str> for VehicleId {
    fn from(id: &str) -> Self {
        VehicleId(Arc::from(id))
    }
}

impl From<String> for VehicleId {
    fn from(id: String) -> Self {
        VehicleId(Arc::from(id))
    }
}

impl Borrow<str> for VehicleId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A rigid piece. Only the anchor (the cell nearest the origin) ever changes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Vehicle {
    pub id: VehicleId,
    pub orientation: Orientation,
    pub length: usize,
    pub row: usize,
    pub col: usize,
}

impl Vehicle {
    pub fn new(
        id: impl Into<VehicleId>,
        orientation: Orientation,
        length: usize,
        row: usize,
        col: usize,
    ) -> Vehicle {
        Vehicle {
            id: id.into(),
            orientation,
            length,
            row,
            col,
        }
    }

    pub fn target(row: usize, col: usize) -> Vehicle {
        Vehicle::new(TARGET_ID, Orientation::Horizontal, TARGET_LENGTH, row, col)
    }

    #[auto_enums::auto_enum(Iterator)]
    pub fn cells(&self) -> impl Iterator<Item = Cell> {
        let (row, col) = (self.row, self.col);
        match self.orientation {
            Orientation::Horizontal => (col..col + self.length).map(move |c| (row, c)),
            Orientation::Vertical => (row..row + self.length).map(move |r| (r, col)),
        }
    }

    pub fn occupies(&self, cell: Cell) -> bool {
        let (row, col) = cell;
        match self.orientation {
            Orientation::Horizontal => {
                row == self.row && col >= self.col && col - self.col < self.length
            }
            Orientation::Vertical => {
                col == self.col && row >= self.row && row - self.row < self.length
            }
        }
    }

    fn along(&self) -> usize {
        match self.orientation {
            Orientation::Horizontal => self.col,
            Orientation::Vertical => self.row,
        }
    }

    fn across(&self) -> usize {
        match self.orientation {
            Orientation::Horizontal => self.row,
            Orientation::Vertical => self.col,
        }
    }

    // checked without adding to the anchor; once placed, along + length <= size
    fn fits(&self, size: usize) -> bool {
        let along = self.along();
        self.across() < size && along < size && self.length <= size - along
    }

    fn cell_along(&self, along: usize) -> Cell {
        match self.orientation {
            Orientation::Horizontal => (self.row, along),
            Orientation::Vertical => (along, self.col),
        }
    }

    /// The cell the leading edge lands on after sliding `steps` cells,
    /// or `None` if that cell is off the grid.
    fn leading_cell(&self, steps: i32, size: usize) -> Option<Cell> {
        let edge = if steps > 0 {
            self.along() + self.length - 1
        } else {
            self.along()
        };
        let reached = edge.checked_add_signed(steps as isize)?;
        (reached < size).then(|| self.cell_along(reached))
    }

    fn shifted(&self, steps: i32) -> Option<Vehicle> {
        let along = self.along().checked_add_signed(steps as isize)?;
        let mut moved = self.clone();
        match moved.orientation {
            Orientation::Horizontal => moved.col = along,
            Orientation::Vertical => moved.row = along,
        }
        Some(moved)
    }

    fn symbol(&self) -> char {
        if self.id.is_target() {
            return TARGET_SYMBOL;
        }
        let mut chars = self.id.as_str().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            (Some(c), Some(_)) => c.to_ascii_uppercase(),
            (None, _) => '?',
        }
    }
}

/// One atomic slide: `steps` cells forward (towards larger row/col) when
/// positive, backward when negative.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub vehicle: VehicleId,
    pub steps: i32,
}

impl Move {
    pub fn new(vehicle: impl Into<VehicleId>, steps: i32) -> Move {
        Move {
            vehicle: vehicle.into(),
            steps,
        }
    }
}

impl Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:+}", self.vehicle, self.steps)
    }
}

/// One configuration of vehicles on a square grid.
///
/// Occupancy is derived from the vehicles on demand rather than stored as a
/// dense grid, so copies stay small and equality is equality of placements.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    size: usize,
    vehicles: BTreeMap<VehicleId, Vehicle>,
}

impl Default for Board {
    fn default() -> Self {
        Board::new(DEFAULT_SIZE)
    }
}

impl Board {
    pub fn new(size: usize) -> Board {
        Board {
            size,
            vehicles: BTreeMap::new(),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.values()
    }

    pub fn vehicle(&self, id: &str) -> Option<&Vehicle> {
        self.vehicles.get(id)
    }

    pub fn target(&self) -> Option<&Vehicle> {
        self.vehicle(TARGET_ID)
    }

    /// Admits `vehicle` if it fits on the grid without touching any other
    /// vehicle. On error the board is left untouched.
    pub fn try_place(&mut self, vehicle: Vehicle) -> Result<(), PlacementError> {
        if vehicle.length < 2 {
            return Err(PlacementError::TooShort {
                id: vehicle.id,
                length: vehicle.length,
            });
        }
        if vehicle.id.is_target()
            && (vehicle.orientation != Orientation::Horizontal || vehicle.length != TARGET_LENGTH)
        {
            return Err(PlacementError::MalformedTarget);
        }
        if self.vehicles.contains_key(&vehicle.id) {
            return Err(PlacementError::DuplicateId(vehicle.id));
        }
        if !vehicle.fits(self.size) {
            return Err(PlacementError::OutOfBounds {
                id: vehicle.id,
                size: self.size,
            });
        }
        if let Some(other) = self
            .vehicles
            .values()
            .find(|other| vehicle.cells().any(|cell| other.occupies(cell)))
        {
            return Err(PlacementError::Overlap {
                other: other.id.clone(),
                id: vehicle.id,
            });
        }

        self.vehicles.insert(vehicle.id.clone(), vehicle);
        Ok(())
    }

    pub fn occupied_cells(&self) -> HashSet<Cell> {
        self.vehicles.values().flat_map(Vehicle::cells).collect()
    }

    pub fn is_solved(&self) -> bool {
        self.target()
            .map_or(false, |target| target.col + target.length == self.size)
    }

    /// Every single-slide move available from this configuration.
    ///
    /// Each vehicle is probed outwards in both directions one cell at a time;
    /// only the leading edge needs checking since the cells behind it already
    /// belong to the vehicle. The leading edge is always outside the vehicle's
    /// own cells, so a vehicle never blocks itself.
    pub fn legal_moves(&self) -> SmallVec<[Move; 16]> {
        let occupied = self.occupied_cells();
        let mut moves = SmallVec::new();

        for vehicle in self.vehicles.values() {
            for direction in [1, -1] {
                let mut steps = direction;
                while let Some(cell) = vehicle.leading_cell(steps, self.size) {
                    if occupied.contains(&cell) {
                        break;
                    }
                    moves.push(Move::new(vehicle.id.clone(), steps));
                    steps += direction;
                }
            }
        }

        moves
    }

    /// # Panics
    ///
    /// If `mv` is not one of [`Board::legal_moves`]: unknown vehicle, zero
    /// steps, or a slide that leaves the grid or hits another vehicle.
    pub fn apply_move(&self, mv: &Move) -> Board {
        assert!(mv.steps != 0, "move {mv} does not slide anything");
        let vehicle = self
            .vehicle(mv.vehicle.as_str())
            .unwrap_or_else(|| panic!("move {mv} names a vehicle that is not on the board"));
        let moved = vehicle
            .shifted(mv.steps)
            .unwrap_or_else(|| panic!("move {mv} slides off the board"));

        let mut next = self.clone();
        next.vehicles.remove(&mv.vehicle);
        if let Err(err) = next.try_place(moved) {
            panic!("illegal move {mv}: {err}");
        }
        next
    }

    pub fn successors(&self) -> impl Iterator<Item = (Move, Board)> + '_ {
        self.legal_moves().into_iter().map(move |mv| {
            let next = self.apply_move(&mv);
            (mv, next)
        })
    }

    pub fn canonical_key(&self) -> CanonicalKey {
        self.vehicles
            .values()
            .map(|v| (v.id.clone(), v.row, v.col))
            .collect()
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut grid = vec![vec![EMPTY; self.size]; self.size];
        for vehicle in self.vehicles.values() {
            let symbol = vehicle.symbol();
            for (r, c) in vehicle.cells() {
                grid[r][c] = symbol;
            }
        }

        write!(f, "{}", grid.iter().map(|row| row.iter().join(" ")).join("\n"))
    }
}

/// Reads a board drawn as a square grid of characters.
///
/// `.` is an empty cell, `R` the target, and any other character a vehicle
/// named by that character. Whitespace between cells is ignored.
pub fn parse_board(b: &str) -> Result<Board, ParseError> {
    let rows: Vec<Vec<char>> = b
        .trim()
        .lines()
        .map(|line| line.chars().filter(|c| !c.is_whitespace()).collect())
        .collect();

    let size = rows.len();
    if size == 0 {
        return Err(ParseError::Empty);
    }

    // BTreeMap keeps board construction (and so error reporting) deterministic
    let mut shapes: BTreeMap<char, Vec<Cell>> = BTreeMap::new();
    for (r, row) in rows.iter().enumerate() {
        if row.len() != size {
            return Err(ParseError::NotSquare {
                row: r,
                found: row.len(),
                expected: size,
            });
        }
        for (c, &symbol) in row.iter().enumerate() {
            if symbol != EMPTY {
                shapes.entry(symbol).or_default().push((r, c));
            }
        }
    }

    let mut board = Board::new(size);
    for (symbol, cells) in shapes {
        // row-major scan order puts the anchor first
        let (row, col) = cells[0];
        let orientation = if cells.iter().all(|&(r, _)| r == row) {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        };
        let id = if symbol == TARGET_SYMBOL {
            VehicleId::from(TARGET_ID)
        } else {
            VehicleId::from(symbol.to_string())
        };

        let vehicle = Vehicle::new(id, orientation, cells.len(), row, col);
        if !vehicle.cells().eq(cells.iter().copied()) {
            return Err(ParseError::NotStraight(symbol));
        }
        board.try_place(vehicle)?;
    }

    Ok(board)
}
