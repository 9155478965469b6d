//! Value-network input encoding.
//!
//! Converts decoded boards into fixed-width feature vectors and pairs each
//! vector with its opposite-side view.

pub mod features;
pub mod perspective;

pub use features::{
    FeatureDescriptor, FeatureExtractor, FeatureKind, FeatureSet, FeatureSetError,
    FeatureSetPolicy, Scalar, SlotRule, SquareMode, AGGREGATE_WIDTH, SPATIAL_WIDTH,
};
pub use perspective::{augment, dark_view, Perspective, TrainingExample};
