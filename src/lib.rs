//! perimetry - adaptive staircase threshold sampling over a visual-field grid.
//!
//! The [`sampler`] is the core: it keeps per-location trial state, picks the
//! next batch of locations, chooses probe intensities, and folds observer
//! responses back in. [`core`] holds the static inputs (intensity scale, id
//! codec, point graph, grid builder), [`observer`] simulates the responding
//! eye, and [`app`] runs the two against each other.

pub mod app;
pub mod cli;
pub mod config;
pub mod core;
pub mod observer;
pub mod sampler;
