//! Types and traits for recording evaluation results.
//!
//! * [`Record`] - A container for key-value pairs emitted by environments
//!   and evaluators
//! * [`Recorder`] - The interface for writing records
//! * [`NullRecorder`] - A recorder that discards all records
//! * [`EpisodeCsvRecorder`] - The CSV sink for per-episode returns
mod base;
mod csv_recorder;
mod null_recorder;
mod recorder;

pub use base::{Record, RecordValue};
pub use csv_recorder::{EpisodeCsvRecorder, EpisodeRow};
pub use null_recorder::NullRecorder;
pub use recorder::Recorder;
