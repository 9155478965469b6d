//! Pylos training-data library.
//!
//! Turns recorded Pylos games into shuffled (feature vector, target) pairs
//! for value-network training. Exposes the board representation, feature
//! encoding, corpus loading and the dataset builder for use by integration
//! tests and the binary entry point.

pub mod board;
pub mod config;
pub mod dataset;
pub mod game;
pub mod nn;
