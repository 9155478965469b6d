//! Dihedral symmetries of the pyramid.
//!
//! Each transform is applied independently to the 4x4, 3x3 and 2x2 layers;
//! the apex is a single cell and is fixed by all of them. Since every layer
//! is centred over the one below, the same geometric operation on each layer
//! is a symmetry of the whole pyramid.

use super::layer::LAYERS;
use super::state::BoardState;

/// One of the eight symmetries of a square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symmetry {
    Identity,
    Rotate90,
    Rotate180,
    Rotate270,
    FlipHorizontal,
    FlipVertical,
    Transpose,
    AntiTranspose,
}

/// All eight symmetries, in index order.
pub const ALL_SYMMETRIES: [Symmetry; 8] = [
    Symmetry::Identity,
    Symmetry::Rotate90,
    Symmetry::Rotate180,
    Symmetry::Rotate270,
    Symmetry::FlipHorizontal,
    Symmetry::FlipVertical,
    Symmetry::Transpose,
    Symmetry::AntiTranspose,
];

/// The rotation subgroup (identity plus the three quarter turns).
pub const ROTATIONS: [Symmetry; 4] = [
    Symmetry::Identity,
    Symmetry::Rotate90,
    Symmetry::Rotate180,
    Symmetry::Rotate270,
];

impl Symmetry {
    /// Returns the symmetry with the given index (0..8).
    pub fn from_index(index: usize) -> Option<Symmetry> {
        ALL_SYMMETRIES.get(index).copied()
    }

    /// Index of this symmetry in [`ALL_SYMMETRIES`].
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The symmetry that undoes this one.
    pub const fn inverse(self) -> Symmetry {
        match self {
            Symmetry::Rotate90 => Symmetry::Rotate270,
            Symmetry::Rotate270 => Symmetry::Rotate90,
            other => other,
        }
    }

    /// Where `(row, col)` lands in a grid of the given side.
    ///
    /// Rotations are clockwise.
    #[inline]
    pub const fn map(self, row: usize, col: usize, side: usize) -> (usize, usize) {
        let n = side - 1;
        match self {
            Symmetry::Identity => (row, col),
            Symmetry::Rotate90 => (col, n - row),
            Symmetry::Rotate180 => (n - row, n - col),
            Symmetry::Rotate270 => (n - col, row),
            Symmetry::FlipHorizontal => (row, n - col),
            Symmetry::FlipVertical => (n - row, col),
            Symmetry::Transpose => (col, row),
            Symmetry::AntiTranspose => (n - col, n - row),
        }
    }

    /// Applies this symmetry to every layer of a board.
    pub fn apply(self, board: &BoardState) -> BoardState {
        if self == Symmetry::Identity {
            return *board;
        }
        let mut out = *board;
        for layer in LAYERS.iter().filter(|l| l.side > 1) {
            for row in 0..layer.side {
                for col in 0..layer.side {
                    let (r, c) = self.map(row, col, layer.side);
                    out.cells[layer.index(r, c)] = board.cells[layer.index(row, col)];
                }
            }
        }
        out
    }
}

/// How many symmetric copies of each position a dataset contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SymmetryCount {
    /// Identity only.
    #[default]
    One,
    /// Identity and the three rotations. Reflections are never mixed in.
    Four,
    /// The full dihedral group.
    Eight,
}

impl SymmetryCount {
    /// Parses a requested count; only 1, 4 and 8 are meaningful.
    pub fn from_count(count: usize) -> Option<SymmetryCount> {
        match count {
            1 => Some(SymmetryCount::One),
            4 => Some(SymmetryCount::Four),
            8 => Some(SymmetryCount::Eight),
            _ => None,
        }
    }

    /// The numeric count.
    pub const fn count(self) -> usize {
        match self {
            SymmetryCount::One => 1,
            SymmetryCount::Four => 4,
            SymmetryCount::Eight => 8,
        }
    }

    /// The symmetries applied to each position, identity first.
    pub fn symmetries(self) -> &'static [Symmetry] {
        match self {
            SymmetryCount::One => &ALL_SYMMETRIES[..1],
            SymmetryCount::Four => &ROTATIONS,
            SymmetryCount::Eight => &ALL_SYMMETRIES,
        }
    }
}
