//! Board state representation and the packed-integer codec.
//!
//! A recorded position is a 60-bit integer: cell `i` occupies the two bits
//! at offset `2 * i`, with `0 = empty`, `1 = light`, `2 = dark`. Code `3`
//! never appears in legal play and is rejected, as is any bit set above
//! bit 59. Every integer that decodes therefore encodes back to itself.

use super::layer::{Layer, CELL_COUNT};

/// Number of bits used by one cell in the packed encoding.
const BITS_PER_CELL: u32 = 2;

/// Mask selecting one packed cell.
const CELL_MASK: u64 = 0b11;

/// Number of bits used by a full packed board.
pub const PACKED_BITS: u32 = CELL_COUNT as u32 * BITS_PER_CELL;

/// Errors that can occur while decoding a packed board.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid cell code {code} at cell {cell}")]
    InvalidCellCode { cell: usize, code: u8 },

    #[error("packed board {0:#x} has bits set above bit 59")]
    TrailingBits(u64),
}

/// Occupancy of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    #[default]
    Empty,
    Light,
    Dark,
}

impl Cell {
    /// Returns the 2-bit packed code.
    pub const fn code(self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::Light => 1,
            Cell::Dark => 2,
        }
    }

    /// Parses a cell from its 2-bit packed code.
    pub const fn from_code(code: u8) -> Option<Cell> {
        match code {
            0 => Some(Cell::Empty),
            1 => Some(Cell::Light),
            2 => Some(Cell::Dark),
            _ => None,
        }
    }

    /// Signed occupancy from light's point of view: +1, -1 or 0.
    pub const fn signed(self) -> f32 {
        match self {
            Cell::Empty => 0.0,
            Cell::Light => 1.0,
            Cell::Dark => -1.0,
        }
    }

    /// The same cell with colours exchanged.
    pub const fn flipped(self) -> Cell {
        match self {
            Cell::Empty => Cell::Empty,
            Cell::Light => Cell::Dark,
            Cell::Dark => Cell::Light,
        }
    }
}

/// Decoded board: one `Cell` per location, indexed as described in
/// [`crate::board::layer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardState {
    pub cells: [Cell; CELL_COUNT],
}

impl Default for BoardState {
    fn default() -> Self {
        BoardState::empty()
    }
}

impl BoardState {
    /// Creates a board with every cell empty.
    pub const fn empty() -> Self {
        BoardState {
            cells: [Cell::Empty; CELL_COUNT],
        }
    }

    /// Decodes a packed board.
    pub fn decode(packed: u64) -> Result<Self, DecodeError> {
        if packed >> PACKED_BITS != 0 {
            return Err(DecodeError::TrailingBits(packed));
        }
        let mut cells = [Cell::Empty; CELL_COUNT];
        for (i, cell) in cells.iter_mut().enumerate() {
            let code = ((packed >> (i as u32 * BITS_PER_CELL)) & CELL_MASK) as u8;
            *cell = Cell::from_code(code).ok_or(DecodeError::InvalidCellCode { cell: i, code })?;
        }
        Ok(BoardState { cells })
    }

    /// Encodes the board back into its packed form.
    pub fn encode(&self) -> u64 {
        self.cells
            .iter()
            .enumerate()
            .fold(0u64, |acc, (i, c)| acc | (c.code() as u64) << (i as u32 * BITS_PER_CELL))
    }

    /// Sets a cell. Returns false if it was already occupied.
    pub fn place(&mut self, index: usize, cell: Cell) -> bool {
        if self.cells[index] != Cell::Empty {
            return false;
        }
        self.cells[index] = cell;
        true
    }

    /// Signed occupancy of every cell.
    pub fn signed(&self) -> [f32; CELL_COUNT] {
        let mut out = [0.0f32; CELL_COUNT];
        for (o, c) in out.iter_mut().zip(self.cells.iter()) {
            *o = c.signed();
        }
        out
    }

    /// Cells belonging to one layer.
    pub fn layer(&self, layer: &Layer) -> &[Cell] {
        &self.cells[layer.cells()]
    }

    /// Number of light spheres on the board.
    pub fn light_count(&self) -> usize {
        self.count(Cell::Light)
    }

    /// Number of dark spheres on the board.
    pub fn dark_count(&self) -> usize {
        self.count(Cell::Dark)
    }

    /// Number of empty locations.
    pub fn empty_count(&self) -> usize {
        self.count(Cell::Empty)
    }

    fn count(&self, which: Cell) -> usize {
        self.cells.iter().filter(|&&c| c == which).count()
    }

    /// Spheres left in each side's reserve, as `(light, dark)`.
    ///
    /// Negative when a (malformed) board holds more spheres than the reserve
    /// size allows.
    pub fn reserves(&self, max_reserve: u32) -> (i64, i64) {
        let max = max_reserve as i64;
        (max - self.light_count() as i64, max - self.dark_count() as i64)
    }

    /// Returns the board with light and dark exchanged.
    pub fn flipped(&self) -> Self {
        let mut cells = self.cells;
        for c in cells.iter_mut() {
            *c = c.flipped();
        }
        BoardState { cells }
    }
}
