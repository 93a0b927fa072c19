//! Evaluate a policy by rollouts.
use crate::{Env, Policy};
use anyhow::Result;
mod fixed_seed;
pub use fixed_seed::{FixedSeedEvaluator, SeedPolicy};

/// Per-episode returns collected by an evaluation run.
#[derive(Debug, Clone)]
pub struct EvalReport {
    /// Return of each recorded episode, in order of completion.
    pub episode_returns: Vec<f32>,
}

impl EvalReport {
    /// Arithmetic mean of the recorded returns, NaN when none were
    /// recorded.
    pub fn mean(&self) -> f32 {
        if self.episode_returns.is_empty() {
            f32::NAN
        } else {
            self.episode_returns.iter().sum::<f32>() / self.episode_returns.len() as f32
        }
    }
}

/// Evaluate a policy.
pub trait Evaluator<E: Env> {
    /// Runs rollout episodes with `policy` and collects the returns.
    fn evaluate(&mut self, policy: &mut Box<dyn Policy<E>>) -> Result<EvalReport>;
}
