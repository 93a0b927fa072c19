//! Single-task agent (tags `F1`, `FN`, `Baseline`, `Finetune`).
use super::build_encoder_actor;
use crate::{util, ActionValue, Cnn, CnnConfig};
use anyhow::Result;
use candle_core::{Device, Tensor};
use candle_nn::{Linear, Module, VarMap};
use log::info;
use std::path::Path;

/// Plain CNN agent with a single actor head.
///
/// The critic head the training side stores in the checkpoint is
/// excluded at load time: it is simply not registered, so
/// [`VarMap::load`] skips its tensors.
pub struct SimpleAgent {
    varmap: VarMap,
    encoder: Cnn,
    actor: Linear,
}

impl SimpleAgent {
    /// Constructs the agent with fresh variables.
    pub fn new(n_actions: usize, device: &Device) -> Result<Self> {
        let (varmap, encoder, actor) =
            build_encoder_actor(&CnnConfig::default(), n_actions, device)?;
        Ok(Self {
            varmap,
            encoder,
            actor,
        })
    }

    /// Restores the agent from a checkpoint.
    pub fn load(path: impl AsRef<Path>, n_actions: usize, device: &Device) -> Result<Self> {
        let mut agent = Self::new(n_actions, device)?;
        agent.varmap.load(&path)?;
        info!("Loaded agent from {:?}", path.as_ref());
        Ok(agent)
    }

    /// Saves the agent's variables as a safetensors file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.varmap.save(&path)?;
        Ok(())
    }
}

impl ActionValue for SimpleAgent {
    fn action_value(&self, obs: &Tensor) -> Result<(i64, f32)> {
        let feat = self.encoder.forward(obs)?;
        let logits = self.actor.forward(&feat)?;
        Ok((util::greedy(&logits)?, 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::DType;
    use tempdir::TempDir;

    #[test]
    fn action_is_in_range() {
        let device = Device::Cpu;
        let agent = SimpleAgent::new(6, &device).unwrap();
        let obs = Tensor::zeros((1, 4, 84, 84), DType::U8, &device).unwrap();
        let (act, value) = agent.action_value(&obs).unwrap();
        assert!((0..6).contains(&act));
        assert_eq!(value, 0.0);
    }

    #[test]
    fn save_and_load_round_trip() {
        let device = Device::Cpu;
        let dir = TempDir::new("simple").unwrap();
        let path = dir.path().join("Pong_trainmode0_F1_seed42.safetensors");

        let agent = SimpleAgent::new(6, &device).unwrap();
        agent.save(&path).unwrap();
        let obs = Tensor::zeros((1, 4, 84, 84), DType::U8, &device).unwrap();
        let (act, _) = agent.action_value(&obs).unwrap();

        let loaded = SimpleAgent::load(&path, 6, &device).unwrap();
        let (act2, _) = loaded.action_value(&obs).unwrap();
        assert_eq!(act, act2);
    }
}
