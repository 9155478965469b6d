//! Board representation.
//!
//! Contains the pyramid layer geometry, the decoded board state with its
//! packed-integer codec, and the dihedral symmetries used for augmentation.

pub mod layer;
pub mod state;
pub mod symmetry;

pub use layer::{Layer, CELL_COUNT, LAYERS, LAYER_COUNT, WINDOW_COUNT};
pub use state::{BoardState, Cell, DecodeError, PACKED_BITS};
pub use symmetry::{Symmetry, SymmetryCount, ALL_SYMMETRIES, ROTATIONS};
