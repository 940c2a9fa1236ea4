//! Ports (trait boundaries) for external collaborators.
//!
//! The training pipeline reports progress through these traits; concrete
//! adapters (progress bars, metric collectors, exporters) live in
//! `pipeline::observers`.

pub mod observer;

pub use observer::{EpisodeSummary, Observer};
