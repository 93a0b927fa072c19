#![warn(missing_docs)]
//! Candle-based agent loading for the evaluation harness.
//!
//! Checkpoints are safetensors files produced by the training side.
//! [`registry::load_agent`] maps the algorithm tag recovered from a
//! checkpoint name to one of the ten agent variants in [`agents`]; the
//! loaded agent is driven through [`LoadedPolicy`] during rollouts.
//!
//! Forward passes are deliberately thin. The harness only needs the
//! greedy action and a value estimate; the training-time machinery of
//! the architectures (pruning, utility tracking, gating updates) stays
//! on the training side.
pub mod agents;
mod cnn;
mod policy;
pub mod registry;
pub(crate) mod util;
pub use cnn::{Cnn, CnnConfig, FEATURE_DIM};
pub use policy::{ActionValue, LoadedPolicy, ObsToTensor};
