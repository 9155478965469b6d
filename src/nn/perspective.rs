//! Light/dark views of a labelled position.
//!
//! Every position yields two examples. The light view is the plain encoding
//! with the game target; the dark view is derived slot by slot from it using
//! the feature set's rules (negate, swap with the paired slot, or keep) and
//! carries the negated target.

use serde::Serialize;

use crate::board::state::BoardState;
use crate::nn::features::{FeatureExtractor, SlotRule};

/// Side the example is expressed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Perspective {
    Light,
    Dark,
}

/// One labelled feature vector.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingExample {
    pub features: Vec<f32>,
    /// Expected outcome for `perspective`, in [-1, 1].
    pub target: f32,
    pub perspective: Perspective,
}

/// Maps a light-view vector to the dark view.
pub fn dark_view(light: &[f32], rules: &[SlotRule]) -> Vec<f32> {
    debug_assert_eq!(light.len(), rules.len());
    rules
        .iter()
        .zip(light.iter())
        .map(|(rule, &v)| match *rule {
            SlotRule::Negate => -v,
            SlotRule::Swap(other) => light[other],
            SlotRule::Keep => v,
        })
        .collect()
}

/// Produces the light and dark examples for one position, light first.
pub fn augment(extractor: &FeatureExtractor, board: &BoardState, target: f32) -> [TrainingExample; 2] {
    let light = extractor.extract(board);
    let dark = dark_view(&light, extractor.feature_set().rules());
    [
        TrainingExample {
            features: light,
            target,
            perspective: Perspective::Light,
        },
        TrainingExample {
            features: dark,
            target: -target,
            perspective: Perspective::Dark,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::state::Cell;
    use crate::nn::features::{FeatureSet, FeatureSetPolicy};
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    fn extractor(policy: FeatureSetPolicy) -> FeatureExtractor {
        FeatureExtractor::new(FeatureSet::for_policy(policy), 15)
    }

    fn random_board(rng: &mut SmallRng) -> BoardState {
        let mut board = BoardState::empty();
        for c in board.cells.iter_mut() {
            *c = match rng.gen_range(0..4) {
                0 | 1 => Cell::Empty,
                2 => Cell::Light,
                _ => Cell::Dark,
            };
        }
        board
    }

    #[test]
    fn pair_obeys_slot_rules() {
        let mut rng = SmallRng::seed_from_u64(21);
        for policy in [FeatureSetPolicy::Aggregate, FeatureSetPolicy::Spatial] {
            let ex = extractor(policy);
            let rules = ex.feature_set().rules();
            for _ in 0..200 {
                let board = random_board(&mut rng);
                let target = rng.gen_range(-1.0f32..=1.0);
                let [light, dark] = augment(&ex, &board, target);

                assert_eq!(light.perspective, Perspective::Light);
                assert_eq!(dark.perspective, Perspective::Dark);
                assert_eq!(dark.target, -light.target);
                assert_eq!(light.features.len(), ex.width());
                assert_eq!(dark.features.len(), ex.width());

                for (k, rule) in rules.iter().enumerate() {
                    match *rule {
                        SlotRule::Negate => assert_eq!(dark.features[k], -light.features[k]),
                        SlotRule::Swap(j) => assert_eq!(dark.features[k], light.features[j]),
                        SlotRule::Keep => assert_eq!(dark.features[k], light.features[k]),
                    }
                }
            }
        }
    }

    #[test]
    fn dark_view_matches_colour_swapped_board() {
        let mut rng = SmallRng::seed_from_u64(22);
        for policy in [FeatureSetPolicy::Aggregate, FeatureSetPolicy::Spatial] {
            let ex = extractor(policy);
            for _ in 0..200 {
                let board = random_board(&mut rng);
                let [_, dark] = augment(&ex, &board, 0.5);
                assert_eq!(dark.features, ex.extract(&board.flipped()));
            }
        }
    }

    #[test]
    fn aggregate_reserve_ratios_swap() {
        let mut board = BoardState::empty();
        board.place(0, Cell::Light);
        board.place(1, Cell::Light);
        board.place(2, Cell::Dark);
        let [light, dark] = augment(&extractor(FeatureSetPolicy::Aggregate), &board, 1.0);
        assert_eq!(light.features[30], 13.0 / 15.0);
        assert_eq!(light.features[31], 14.0 / 15.0);
        assert_eq!(dark.features[30], 14.0 / 15.0);
        assert_eq!(dark.features[31], 13.0 / 15.0);
        assert_eq!(dark.features[0], -1.0);
        assert_eq!(dark.features[2], 1.0);
        assert_eq!(dark.target, -1.0);
    }
}
