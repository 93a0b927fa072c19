#![warn(missing_docs)]
//! Core abstractions for evaluating continual-learning agents.
pub mod checkpoint;
pub mod error;
pub mod record;

mod base;
pub use base::{Act, Env, Info, Obs, Policy, Step};

mod evaluator;
pub use evaluator::{EvalReport, Evaluator, FixedSeedEvaluator, SeedPolicy};
