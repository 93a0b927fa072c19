//! Rewiring agent (tag `Rewire`).
use super::build_encoder_actor;
use crate::{util, ActionValue, Cnn, CnnConfig};
use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::{ops::sigmoid, Init, Linear, Module, VarMap};
use cleval_core::error::EvalError;
use log::info;
use std::path::Path;

/// Agent with task-specific wiring of the feature vector.
///
/// The checkpoint stores a `wiring` tensor of shape
/// `(num_tasks, feature_dim)` whose rows gate the features of the
/// corresponding task. The task count is read from the checkpoint
/// itself; the wiring of the requested test task is activated
/// explicitly with [`RewireAgent::set_active_task`] after loading.
pub struct RewireAgent {
    varmap: VarMap,
    encoder: Cnn,
    actor: Linear,
    wiring: Tensor,
    num_tasks: usize,
    active: usize,
}

impl RewireAgent {
    /// Constructs the agent with fresh variables for `num_tasks` tasks.
    pub fn new(n_actions: usize, num_tasks: usize, device: &Device) -> Result<Self> {
        let (varmap, encoder, actor) =
            build_encoder_actor(&CnnConfig::default(), n_actions, device)?;
        let wiring = varmap.get(
            (num_tasks, encoder.feature_dim()),
            "wiring",
            Init::Const(0.0),
            DType::F32,
            device,
        )?;

        Ok(Self {
            varmap,
            encoder,
            actor,
            wiring,
            num_tasks,
            active: 0,
        })
    }

    /// Restores the agent from a checkpoint, reading the task count
    /// from the stored wiring tensor.
    pub fn load(path: impl AsRef<Path>, n_actions: usize, device: &Device) -> Result<Self> {
        let tensors = candle_core::safetensors::load(path.as_ref(), device)?;
        let num_tasks = tensors
            .get("wiring")
            .with_context(|| format!("no tensor `wiring` in {:?}", path.as_ref()))?
            .dim(0)?;

        let mut agent = Self::new(n_actions, num_tasks, device)?;
        agent.varmap.load(&path)?;
        info!(
            "Loaded agent from {:?} with {} wirings",
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

    /// Activates the wiring of the given task.
    pub fn set_active_task(&mut self, task: i64) -> Result<()> {
        if task < 0 || task as usize >= self.num_tasks {
            return Err(EvalError::UnknownTaskView(task).into());
        }
        self.active = task as usize;
        info!("Activated the wiring of task {}", task);
        Ok(())
    }
}

impl ActionValue for RewireAgent {
    fn action_value(&self, obs: &Tensor) -> Result<(i64, f32)> {
        let gate = sigmoid(&self.wiring.get(self.active)?)?;
        let feat = self.encoder.forward(obs)?.broadcast_mul(&gate)?;
        let logits = self.actor.forward(&feat)?;
        Ok((util::greedy(&logits)?, 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn task_count_is_read_from_the_checkpoint() {
        let device = Device::Cpu;
        let dir = TempDir::new("rewire").unwrap();
        let path = dir
            .path()
            .join("Freeway_trainmode0_Rewire_seed1.safetensors");

        RewireAgent::new(3, 5, &device).unwrap().save(&path).unwrap();
        let mut agent = RewireAgent::load(&path, 3, &device).unwrap();
        assert!(agent.set_active_task(4).is_ok());
        assert!(matches!(
            agent
                .set_active_task(5)
                .unwrap_err()
                .downcast::<EvalError>(),
            Ok(EvalError::UnknownTaskView(5))
        ));
    }
}
