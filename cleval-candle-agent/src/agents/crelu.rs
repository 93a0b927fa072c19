//! Concatenated-ReLU agent (tag `CReLUs`).
use super::build_encoder_actor;
use crate::{util, ActionValue, Cnn, CnnConfig};
use anyhow::Result;
use candle_core::{Device, Tensor};
use candle_nn::{Linear, Module, VarMap};
use log::info;
use std::path::Path;

/// CNN agent whose final activation is a concatenated ReLU, doubling
/// the feature dimension. The wider actor head is the only structural
/// difference from [`SimpleAgent`](super::SimpleAgent).
pub struct CReLUsAgent {
    varmap: VarMap,
    encoder: Cnn,
    actor: Linear,
}

impl CReLUsAgent {
    /// Constructs the agent with fresh variables.
    pub fn new(n_actions: usize, device: &Device) -> Result<Self> {
        let (varmap, encoder, actor) =
            build_encoder_actor(&CnnConfig::default().crelu(true), n_actions, device)?;
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

impl ActionValue for CReLUsAgent {
    fn action_value(&self, obs: &Tensor) -> Result<(i64, f32)> {
        let feat = self.encoder.forward(obs)?;
        let logits = self.actor.forward(&feat)?;
        Ok((util::greedy(&logits)?, 0.0))
    }
}
