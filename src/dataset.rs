//! Training dataset construction.
//!
//! Walks every recorded game, labels each position with the decayed game
//! outcome, expands it under the configured symmetries and both
//! perspectives, and finally shuffles the whole collection once before
//! handing the feature matrix and target vector to the trainer.
//!
//! Every example is held in memory until the shuffle, so peak memory grows
//! with `examples * feature_width`.

use std::io::Write;

use log::{debug, info};
use ndarray::{Array1, Array2};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::board::state::{BoardState, DecodeError};
use crate::board::symmetry::SymmetryCount;
use crate::config::{ConfigError, DatasetConfig};
use crate::game::{GameRecord, Winner};
use crate::nn::features::{FeatureExtractor, FeatureSet};
use crate::nn::perspective::{augment, Perspective, TrainingExample};

/// Errors that can occur while building a dataset.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("game {game}, board {position}: {source}")]
    Decode {
        game: usize,
        position: usize,
        source: DecodeError,
    },

    #[error("feature matrix has the wrong shape: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

/// Target for the board at `index` of an `n`-board game:
/// `winner * discount^(n - index - 1)`.
///
/// The last board gets exactly the winner's sign. `index` must be below `n`.
pub fn decayed_target(winner: Winner, discount: f64, n: usize, index: usize) -> f32 {
    debug_assert!(index < n, "board {} of a {}-board game", index, n);
    let moves_left = (n - index - 1) as i32;
    (winner.sign() * discount.powi(moves_left)) as f32
}

/// Summary of a dataset's targets.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DatasetStats {
    pub count: usize,
    pub light: usize,
    pub dark: usize,
    pub min: f32,
    pub max: f32,
    pub mean: f64,
    pub std: f64,
}

/// Shuffled, materialized examples ready for training.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// One row per example, `feature_width` columns.
    pub features: Array2<f32>,
    /// Target of each row.
    pub targets: Array1<f32>,
    /// Perspective of each row.
    pub perspectives: Vec<Perspective>,
    /// Name of the feature layout.
    pub feature_set: &'static str,
    /// Games that contributed examples (including empty ones).
    pub games_used: usize,
    /// Games skipped by the participant filter.
    pub games_filtered: usize,
}

#[derive(Serialize)]
struct ExampleRow {
    features: Vec<f32>,
    target: f32,
    perspective: Perspective,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn feature_width(&self) -> usize {
        self.features.ncols()
    }

    /// Hands the aligned feature matrix and target vector to the caller.
    pub fn into_arrays(self) -> (Array2<f32>, Array1<f32>) {
        (self.features, self.targets)
    }

    /// Computes target statistics.
    pub fn stats(&self) -> DatasetStats {
        let count = self.len();
        if count == 0 {
            return DatasetStats::default();
        }
        let light = self
            .perspectives
            .iter()
            .filter(|&&p| p == Perspective::Light)
            .count();
        let min = self.targets.iter().copied().fold(f32::INFINITY, f32::min);
        let max = self.targets.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let mean = self.targets.iter().map(|&t| t as f64).sum::<f64>() / count as f64;
        let var = self
            .targets
            .iter()
            .map(|&t| (t as f64 - mean).powi(2))
            .sum::<f64>()
            / count as f64;
        DatasetStats {
            count,
            light,
            dark: count - light,
            min,
            max,
            mean,
            std: var.sqrt(),
        }
    }

    /// Writes one JSON object per example, in dataset order.
    pub fn write_jsonl<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        for (i, row) in self.features.outer_iter().enumerate() {
            let line = ExampleRow {
                features: row.to_vec(),
                target: self.targets[i],
                perspective: self.perspectives[i],
            };
            serde_json::to_writer(&mut *out, &line)?;
            writeln!(out)?;
        }
        out.flush()
    }
}

/// Turns game corpora into datasets under one fixed configuration.
#[derive(Debug, Clone)]
pub struct DatasetBuilder {
    config: DatasetConfig,
    symmetries: SymmetryCount,
    extractor: FeatureExtractor,
}

impl DatasetBuilder {
    /// Validates `config` and prepares the feature layout it names.
    pub fn new(config: DatasetConfig) -> Result<Self, ConfigError> {
        let set = FeatureSet::for_policy(config.feature_set_policy);
        DatasetBuilder::with_feature_set(config, set)
    }

    /// Like [`DatasetBuilder::new`], but with a custom feature layout.
    pub fn with_feature_set(config: DatasetConfig, set: FeatureSet) -> Result<Self, ConfigError> {
        let symmetries = config.validate()?;
        let extractor = FeatureExtractor::new(set, config.max_reserve_per_side);
        Ok(DatasetBuilder {
            config,
            symmetries,
            extractor,
        })
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    pub fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    pub fn feature_width(&self) -> usize {
        self.extractor.width()
    }

    /// Number of examples each recorded board expands into.
    pub fn examples_per_board(&self) -> usize {
        self.symmetries.count() * 2
    }

    /// Appends the unshuffled examples of one game to `out`.
    ///
    /// `game_index` is the game's position in the corpus, used in errors.
    pub fn game_examples(
        &self,
        game: &GameRecord,
        game_index: usize,
        out: &mut Vec<TrainingExample>,
    ) -> Result<(), DatasetError> {
        let n = game.board_history.len();
        out.reserve(n * self.examples_per_board());
        for (i, &packed) in game.board_history.iter().enumerate() {
            let target = decayed_target(game.winner, self.config.discount_factor, n, i);
            let board = BoardState::decode(packed).map_err(|source| DatasetError::Decode {
                game: game_index,
                position: i,
                source,
            })?;
            for symmetry in self.symmetries.symmetries() {
                let transformed = symmetry.apply(&board);
                out.extend(augment(&self.extractor, &transformed, target));
            }
        }
        Ok(())
    }

    /// Builds the dataset, shuffling with the configured seed.
    pub fn build(&self, games: &[GameRecord]) -> Result<Dataset, DatasetError> {
        let mut rng = if self.config.seed != 0 {
            SmallRng::seed_from_u64(self.config.seed)
        } else {
            SmallRng::from_entropy()
        };
        self.build_with_rng(games, &mut rng)
    }

    /// Builds the dataset, shuffling with the given generator.
    pub fn build_with_rng<R: Rng + ?Sized>(
        &self,
        games: &[GameRecord],
        rng: &mut R,
    ) -> Result<Dataset, DatasetError> {
        info!(
            "Building dataset from {} games: feature set {} (width {}), {} symmetries, discount {}",
            games.len(),
            self.extractor.feature_set().name(),
            self.feature_width(),
            self.symmetries.count(),
            self.config.discount_factor,
        );

        let mut examples: Vec<TrainingExample> = Vec::new();
        let mut games_used = 0usize;
        let mut games_filtered = 0usize;

        for (idx, game) in games.iter().enumerate() {
            if idx % self.config.progress_interval == 0 {
                info!("Processed {}/{} games", idx, games.len());
            }
            if !self
                .config
                .accepts_players(&game.light_player, &game.dark_player)
            {
                debug!(
                    "Skipping game {} ({} vs {}): player not selected",
                    idx, game.light_player, game.dark_player
                );
                games_filtered += 1;
                continue;
            }
            if game.is_empty() {
                debug!("Game {} has an empty board history", idx);
            }
            self.game_examples(game, idx, &mut examples)?;
            games_used += 1;
        }

        examples.shuffle(rng);

        let width = self.feature_width();
        let count = examples.len();
        let mut flat = Vec::with_capacity(count * width);
        let mut targets = Vec::with_capacity(count);
        let mut perspectives = Vec::with_capacity(count);
        for ex in examples {
            flat.extend_from_slice(&ex.features);
            targets.push(ex.target);
            perspectives.push(ex.perspective);
        }

        let dataset = Dataset {
            features: Array2::from_shape_vec((count, width), flat)?,
            targets: Array1::from_vec(targets),
            perspectives,
            feature_set: self.extractor.feature_set().name(),
            games_used,
            games_filtered,
        };

        let stats = dataset.stats();
        info!(
            "Dataset: {} examples from {} games ({} filtered), shape ({}, {})",
            stats.count,
            games_used,
            games_filtered,
            count,
            width,
        );
        if stats.count > 0 {
            info!(
                "Targets: range [{:.4}, {:.4}], mean {:.4}, std {:.4}",
                stats.min, stats.max, stats.mean, stats.std
            );
        }

        Ok(dataset)
    }
}
