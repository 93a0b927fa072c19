//! Feature-masking agent (tag `MaskNet`).
use super::build_encoder_actor;
use crate::{util, ActionValue, Cnn, CnnConfig};
use anyhow::Result;
use candle_core::{DType, Device, Tensor};
use candle_nn::{Init, Linear, Module, VarMap};
use cleval_core::error::EvalError;
use log::info;
use std::path::Path;

/// Agent with per-task binary masks over the feature vector.
///
/// The checkpoint stores a `scores` tensor of shape
/// `(num_tasks, feature_dim)`; features with a positive score for the
/// active task pass through, the rest are zeroed. The task count is
/// not stored in the checkpoint and must be supplied by the caller
/// (derived from the environment name); a wrong count surfaces as a
/// shape mismatch at load time.
pub struct MaskNetAgent {
    varmap: VarMap,
    encoder: Cnn,
    actor: Linear,
    scores: Tensor,
    num_tasks: usize,
    active: usize,
}

impl MaskNetAgent {
    /// Constructs the agent with fresh variables for `num_tasks` tasks.
    pub fn new(n_actions: usize, num_tasks: usize, device: &Device) -> Result<Self> {
        let (varmap, encoder, actor) =
            build_encoder_actor(&CnnConfig::default(), n_actions, device)?;
        let scores = varmap.get(
            (num_tasks, encoder.feature_dim()),
            "scores",
            Init::Const(1.0),
            DType::F32,
            device,
        )?;

        Ok(Self {
            varmap,
            encoder,
            actor,
            scores,
            num_tasks,
            active: 0,
        })
    }

    /// Restores the agent from a checkpoint.
    pub fn load(
        path: impl AsRef<Path>,
        n_actions: usize,
        num_tasks: usize,
        device: &Device,
    ) -> Result<Self> {
        let mut agent = Self::new(n_actions, num_tasks, device)?;
        agent.varmap.load(&path)?;
        info!(
            "Loaded agent from {:?} with {} tasks",
            path.as_ref(),
            num_tasks
        );
        Ok(agent)
    }

    /// Saves the agent's variables as a safetensors file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.varmap.save(&path)?;
        Ok(())
    }

    /// Selects the mask of the given task.
    pub fn set_active_task(&mut self, task: i64) -> Result<()> {
        if task < 0 || task as usize >= self.num_tasks {
            return Err(EvalError::UnknownTaskView(task).into());
        }
        self.active = task as usize;
        Ok(())
    }
}

impl ActionValue for MaskNetAgent {
    fn action_value(&self, obs: &Tensor) -> Result<(i64, f32)> {
        let mask = self.scores.get(self.active)?.gt(0.0)?.to_dtype(DType::F32)?;
        let feat = self.encoder.forward(obs)?.broadcast_mul(&mask)?;
        let logits = self.actor.forward(&feat)?;
        Ok((util::greedy(&logits)?, 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn wrong_task_count_fails_at_load_time() {
        let device = Device::Cpu;
        let dir = TempDir::new("masknet").unwrap();
        let path = dir
            .path()
            .join("Freeway_trainmode0_MaskNet_seed1.safetensors");

        MaskNetAgent::new(3, 8, &device).unwrap().save(&path).unwrap();
        assert!(MaskNetAgent::load(&path, 3, 8, &device).is_ok());
        assert!(MaskNetAgent::load(&path, 3, 10, &device).is_err());
    }

    #[test]
    fn active_task_must_be_in_range() {
        let device = Device::Cpu;
        let mut agent = MaskNetAgent::new(3, 8, &device).unwrap();
        assert!(agent.set_active_task(7).is_ok());
        assert!(agent.set_active_task(8).is_err());
        assert!(agent.set_active_task(-1).is_err());
    }
}
