//! Board state -> feature vector encoding for the value network.
//!
//! A feature set is a table of descriptors evaluated in order; each
//! descriptor contributes a fixed number of slots. Two tables ship with the
//! crate:
//!
//! `aggregate` (66 slots):
//!   [0:30]  signed cells (+1 light, -1 dark, 0 empty)
//!   [30]    light reserve / max reserve
//!   [31]    dark reserve / max reserve
//!   [32]    (light reserve - dark reserve) / max reserve
//!   [33]    (light spheres - dark spheres) / 30
//!   [34:38] mean signed occupancy of layers 0..3
//!   [38:52] square occupancy: sum of |cell| over every 2x2 window
//!   [52:66] square balance: sum of signed cells over the same windows
//!
//! `spatial` (31 slots):
//!   [0:30]  signed cells
//!   [30]    (light reserve - dark reserve) / max reserve
//!
//! Windows are listed layer by layer (9 on the 4x4, 4 on the 3x3, 1 on the
//! 2x2), row-major by top-left corner. Every denominator is a positive
//! constant, so extraction never divides by zero.

use serde::{Deserialize, Serialize};

use crate::board::layer::{CELL_COUNT, LAYERS, LAYER_COUNT};
use crate::board::state::BoardState;

/// Width of the `aggregate` feature set.
pub const AGGREGATE_WIDTH: usize = 66;

/// Width of the `spatial` feature set.
pub const SPATIAL_WIDTH: usize = 31;

/// Errors raised when validating a custom descriptor table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeatureSetError {
    #[error("feature '{name}' covers {len} cells from cell {offset}, past the end of the board")]
    CellRange {
        name: &'static str,
        offset: usize,
        len: usize,
    },

    #[error("feature '{name}' averages an empty cell range")]
    EmptyMean { name: &'static str },

    #[error("feature '{name}' reads layer {layer}, which has no 2x2 windows")]
    NoWindows { name: &'static str, layer: usize },

    #[error("feature '{name}' has no paired {partner:?} slot")]
    UnpairedScalar { name: &'static str, partner: Scalar },

    #[error("scalar {0:?} appears more than once")]
    DuplicateScalar(Scalar),
}

/// Built-in feature-set policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureSetPolicy {
    /// Cells, reserve/material scalars, layer means and square features.
    #[default]
    Aggregate,
    /// Cells plus the reserve difference, for a windowed consumer.
    Spatial,
}

impl FeatureSetPolicy {
    /// Lowercase name, as used in configuration.
    pub const fn name(self) -> &'static str {
        match self {
            FeatureSetPolicy::Aggregate => "aggregate",
            FeatureSetPolicy::Spatial => "spatial",
        }
    }

    /// Parses a policy from its configuration name.
    pub fn from_name(name: &str) -> Option<FeatureSetPolicy> {
        match name {
            "aggregate" => Some(FeatureSetPolicy::Aggregate),
            "spatial" => Some(FeatureSetPolicy::Spatial),
            _ => None,
        }
    }
}

/// Global scalars derived from sphere counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scalar {
    /// Light spheres left in reserve.
    LightReserve,
    /// Dark spheres left in reserve.
    DarkReserve,
    /// Light reserve divided by the maximum reserve.
    LightReserveRatio,
    /// Dark reserve divided by the maximum reserve.
    DarkReserveRatio,
    /// Reserve difference (light minus dark) divided by the maximum reserve.
    ReserveDifference,
    /// Sphere difference (light minus dark) divided by the cell count.
    MaterialDifference,
}

impl Scalar {
    /// The slot this scalar trades places with when the perspective flips.
    ///
    /// `None` for scalars that are odd in side and simply change sign.
    pub const fn partner(self) -> Option<Scalar> {
        match self {
            Scalar::LightReserve => Some(Scalar::DarkReserve),
            Scalar::DarkReserve => Some(Scalar::LightReserve),
            Scalar::LightReserveRatio => Some(Scalar::DarkReserveRatio),
            Scalar::DarkReserveRatio => Some(Scalar::LightReserveRatio),
            Scalar::ReserveDifference | Scalar::MaterialDifference => None,
        }
    }
}

/// How a square window is summed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SquareMode {
    /// Sum of absolute occupancy: how close the square is to completion.
    Occupancy,
    /// Sum of signed occupancy: which side dominates the square.
    Balance,
}

/// What a descriptor computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    /// Signed cells `offset..offset + len`, one slot each.
    Raw { offset: usize, len: usize },
    /// Mean signed occupancy over `offset..offset + len`, one slot.
    Mean { offset: usize, len: usize },
    /// One slot per 2x2 window of a layer.
    SquareSum { layer: usize, mode: SquareMode },
    /// One derived global scalar.
    Scalar(Scalar),
}

impl FeatureKind {
    /// Number of slots this descriptor fills.
    pub fn width(&self) -> usize {
        match *self {
            FeatureKind::Raw { len, .. } => len,
            FeatureKind::Mean { .. } | FeatureKind::Scalar(_) => 1,
            FeatureKind::SquareSum { layer, .. } => {
                LAYERS.get(layer).map_or(0, |l| l.window_count())
            }
        }
    }
}

/// A named entry in a feature table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeatureDescriptor {
    pub name: &'static str,
    pub kind: FeatureKind,
}

const fn desc(name: &'static str, kind: FeatureKind) -> FeatureDescriptor {
    FeatureDescriptor { name, kind }
}

const fn layer_mean(name: &'static str, layer: usize) -> FeatureDescriptor {
    desc(
        name,
        FeatureKind::Mean {
            offset: LAYERS[layer].offset,
            len: LAYERS[layer].side * LAYERS[layer].side,
        },
    )
}

const fn squares(name: &'static str, layer: usize, mode: SquareMode) -> FeatureDescriptor {
    desc(name, FeatureKind::SquareSum { layer, mode })
}

const CELLS: FeatureDescriptor = desc(
    "cells",
    FeatureKind::Raw {
        offset: 0,
        len: CELL_COUNT,
    },
);

/// Descriptor table of the `aggregate` policy.
pub const AGGREGATE_TABLE: &[FeatureDescriptor] = &[
    CELLS,
    desc("light_reserve_ratio", FeatureKind::Scalar(Scalar::LightReserveRatio)),
    desc("dark_reserve_ratio", FeatureKind::Scalar(Scalar::DarkReserveRatio)),
    desc("reserve_diff", FeatureKind::Scalar(Scalar::ReserveDifference)),
    desc("material_diff", FeatureKind::Scalar(Scalar::MaterialDifference)),
    layer_mean("layer0_mean", 0),
    layer_mean("layer1_mean", 1),
    layer_mean("layer2_mean", 2),
    layer_mean("layer3_mean", 3),
    squares("layer0_square_occupancy", 0, SquareMode::Occupancy),
    squares("layer1_square_occupancy", 1, SquareMode::Occupancy),
    squares("layer2_square_occupancy", 2, SquareMode::Occupancy),
    squares("layer0_square_balance", 0, SquareMode::Balance),
    squares("layer1_square_balance", 1, SquareMode::Balance),
    squares("layer2_square_balance", 2, SquareMode::Balance),
];

/// Descriptor table of the `spatial` policy.
pub const SPATIAL_TABLE: &[FeatureDescriptor] = &[
    CELLS,
    desc("reserve_diff", FeatureKind::Scalar(Scalar::ReserveDifference)),
];

/// What happens to a slot when the board is viewed from the other side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotRule {
    /// The value is odd in side: negate it.
    Negate,
    /// The value is per-side: take the value of the paired slot.
    Swap(usize),
    /// The value does not depend on side.
    Keep,
}

/// A validated feature layout.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSet {
    name: &'static str,
    descriptors: Vec<FeatureDescriptor>,
    rules: Vec<SlotRule>,
}

impl FeatureSet {
    /// The layout of a built-in policy.
    pub fn for_policy(policy: FeatureSetPolicy) -> Self {
        let table = match policy {
            FeatureSetPolicy::Aggregate => AGGREGATE_TABLE,
            FeatureSetPolicy::Spatial => SPATIAL_TABLE,
        };
        match FeatureSet::from_descriptors(policy.name(), table) {
            Ok(set) => set,
            Err(e) => unreachable!("built-in table '{}' is invalid: {}", policy.name(), e),
        }
    }

    /// Validates a descriptor table and derives its per-slot perspective rules.
    pub fn from_descriptors(
        name: &'static str,
        descriptors: &[FeatureDescriptor],
    ) -> Result<Self, FeatureSetError> {
        let mut scalar_slots: Vec<(Scalar, usize, &'static str)> = Vec::new();
        let mut rules = Vec::new();

        for d in descriptors {
            match d.kind {
                FeatureKind::Raw { offset, len } | FeatureKind::Mean { offset, len } => {
                    if offset.checked_add(len).map_or(true, |end| end > CELL_COUNT) {
                        return Err(FeatureSetError::CellRange {
                            name: d.name,
                            offset,
                            len,
                        });
                    }
                    if len == 0 && matches!(d.kind, FeatureKind::Mean { .. }) {
                        return Err(FeatureSetError::EmptyMean { name: d.name });
                    }
                    rules.extend(std::iter::repeat(SlotRule::Negate).take(d.kind.width()));
                }
                FeatureKind::SquareSum { layer, mode } => {
                    if layer >= LAYER_COUNT || LAYERS[layer].window_count() == 0 {
                        return Err(FeatureSetError::NoWindows {
                            name: d.name,
                            layer,
                        });
                    }
                    let rule = match mode {
                        SquareMode::Occupancy => SlotRule::Keep,
                        SquareMode::Balance => SlotRule::Negate,
                    };
                    rules.extend(std::iter::repeat(rule).take(d.kind.width()));
                }
                FeatureKind::Scalar(s) => {
                    if scalar_slots.iter().any(|&(t, _, _)| t == s) {
                        return Err(FeatureSetError::DuplicateScalar(s));
                    }
                    scalar_slots.push((s, rules.len(), d.name));
                    // Paired slots are resolved once every offset is known.
                    rules.push(SlotRule::Negate);
                }
            }
        }

        for &(scalar, slot, scalar_name) in scalar_slots.iter() {
            let Some(partner) = scalar.partner() else {
                continue;
            };
            match scalar_slots.iter().find(|&&(t, _, _)| t == partner) {
                Some(&(_, other, _)) => rules[slot] = SlotRule::Swap(other),
                None => {
                    return Err(FeatureSetError::UnpairedScalar {
                        name: scalar_name,
                        partner,
                    })
                }
            }
        }

        Ok(FeatureSet {
            name,
            descriptors: descriptors.to_vec(),
            rules,
        })
    }

    /// Name of the layout.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of slots in every vector of this layout.
    pub fn width(&self) -> usize {
        self.rules.len()
    }

    pub fn descriptors(&self) -> &[FeatureDescriptor] {
        &self.descriptors
    }

    /// Perspective rule of every slot, in slot order.
    pub fn rules(&self) -> &[SlotRule] {
        &self.rules
    }
}

/// Sphere counts shared by every scalar of one board.
struct Counts {
    light: f32,
    dark: f32,
    light_reserve: f32,
    dark_reserve: f32,
}

/// Evaluates a feature set against decoded boards.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    set: FeatureSet,
    max_reserve: f32,
}

impl FeatureExtractor {
    /// Creates an extractor.
    ///
    /// A `max_reserve` of 0 is treated as 1, keeping every ratio finite.
    /// [`crate::config::DatasetConfig::validate`] rejects 0 before a builder
    /// gets here.
    pub fn new(set: FeatureSet, max_reserve: u32) -> Self {
        FeatureExtractor {
            set,
            max_reserve: max_reserve.max(1) as f32,
        }
    }

    pub fn feature_set(&self) -> &FeatureSet {
        &self.set
    }

    pub fn width(&self) -> usize {
        self.set.width()
    }

    /// Encodes a board from light's point of view.
    pub fn extract(&self, board: &BoardState) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.width());
        self.extract_into(board, &mut out);
        out
    }

    /// Appends the encoding of `board` to `out`.
    pub fn extract_into(&self, board: &BoardState, out: &mut Vec<f32>) {
        let cells = board.signed();
        let light = board.light_count() as f32;
        let dark = board.dark_count() as f32;
        let counts = Counts {
            light,
            dark,
            light_reserve: self.max_reserve - light,
            dark_reserve: self.max_reserve - dark,
        };

        for d in self.set.descriptors.iter() {
            match d.kind {
                FeatureKind::Raw { offset, len } => {
                    out.extend_from_slice(&cells[offset..offset + len]);
                }
                FeatureKind::Mean { offset, len } => {
                    let sum: f32 = cells[offset..offset + len].iter().sum();
                    out.push(sum / len as f32);
                }
                FeatureKind::SquareSum { layer, mode } => {
                    for window in LAYERS[layer].windows() {
                        let sum: f32 = match mode {
                            SquareMode::Occupancy => window.iter().map(|&i| cells[i].abs()).sum(),
                            SquareMode::Balance => window.iter().map(|&i| cells[i]).sum(),
                        };
                        out.push(sum);
                    }
                }
                FeatureKind::Scalar(s) => out.push(self.scalar(s, &counts)),
            }
        }
    }

    fn scalar(&self, scalar: Scalar, c: &Counts) -> f32 {
        match scalar {
            Scalar::LightReserve => c.light_reserve,
            Scalar::DarkReserve => c.dark_reserve,
            Scalar::LightReserveRatio => c.light_reserve / self.max_reserve,
            Scalar::DarkReserveRatio => c.dark_reserve / self.max_reserve,
            Scalar::ReserveDifference => (c.light_reserve - c.dark_reserve) / self.max_reserve,
            Scalar::MaterialDifference => (c.light - c.dark) / CELL_COUNT as f32,
        }
    }
}
