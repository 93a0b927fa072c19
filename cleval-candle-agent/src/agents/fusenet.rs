//! Fusion agent (tags `FuseNet` and `FuseNetwMerge`).
use super::build_encoder_actor;
use crate::{util, ActionValue, Cnn, CnnConfig};
use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::{Init, Linear, Module, VarMap};
use log::info;
use std::path::Path;

/// Agent with a task-specific affine modulation of the feature vector.
///
/// The checkpoint stores a scale (`fuse.scale`) and a shift
/// (`fuse.shift`) next to the shared encoder. The plain variant applies
/// the modulation at forward time; the merging variant folds it into
/// the actor head once, at load time.
pub struct FuseNetAgent {
    varmap: VarMap,
    encoder: Cnn,
    actor: Linear,
    merged: bool,
}

impl FuseNetAgent {
    /// Constructs the agent with fresh variables: unit scale, zero
    /// shift.
    pub fn new(n_actions: usize, device: &Device) -> Result<Self> {
        let (varmap, encoder, actor) =
            build_encoder_actor(&CnnConfig::default(), n_actions, device)?;
        let dim = encoder.feature_dim();
        varmap.get(dim, "fuse.scale", Init::Const(1.0), DType::F32, device)?;
        varmap.get(dim, "fuse.shift", Init::Const(0.0), DType::F32, device)?;

        Ok(Self {
            varmap,
            encoder,
            actor,
            merged: false,
        })
    }

    /// Restores the agent from a checkpoint, keeping the modulation
    /// separate.
    pub fn load(path: impl AsRef<Path>, n_actions: usize, device: &Device) -> Result<Self> {
        let mut agent = Self::new(n_actions, device)?;
        agent.varmap.load(&path)?;
        info!("Loaded agent from {:?}", path.as_ref());
        Ok(agent)
    }

    /// Restores the agent and folds the modulation into the actor head.
    pub fn load_merged(path: impl AsRef<Path>, n_actions: usize, device: &Device) -> Result<Self> {
        let mut agent = Self::load(path, n_actions, device)?;
        agent.merge()?;
        Ok(agent)
    }

    /// Saves the agent's variables as a safetensors file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.varmap.save(&path)?;
        Ok(())
    }

    fn fuse_var(&self, name: &str) -> Result<Tensor> {
        let data = self.varmap.data().lock().unwrap();
        let var = data
            .get(name)
            .with_context(|| format!("no variable `{}`", name))?;
        Ok(var.as_tensor().clone())
    }

    /// Folds the modulation into the actor head:
    /// `W' = W * scale, b' = b + W @ shift`.
    fn merge(&mut self) -> Result<()> {
        let scale = self.fuse_var("fuse.scale")?;
        let shift = self.fuse_var("fuse.shift")?;

        let data = self.varmap.data().lock().unwrap();
        let weight = data.get("actor.weight").context("no variable `actor.weight`")?;
        let bias = data.get("actor.bias").context("no variable `actor.bias`")?;

        let w = weight.as_tensor().clone();
        let merged_weight = w.broadcast_mul(&scale.unsqueeze(0)?)?;
        let merged_bias = bias
            .as_tensor()
            .add(&w.matmul(&shift.unsqueeze(1)?)?.squeeze(1)?)?;
        weight.set(&merged_weight)?;
        bias.set(&merged_bias)?;
        drop(data);

        self.merged = true;
        info!("Merged the task modulation into the actor head");
        Ok(())
    }

    fn logits(&self, obs: &Tensor) -> Result<Tensor> {
        let feat = self.encoder.forward(obs)?;
        let feat = if self.merged {
            feat
        } else {
            let scale = self.fuse_var("fuse.scale")?;
            let shift = self.fuse_var("fuse.shift")?;
            feat.broadcast_mul(&scale)?.broadcast_add(&shift)?
        };
        Ok(self.actor.forward(&feat)?)
    }
}

impl ActionValue for FuseNetAgent {
    fn action_value(&self, obs: &Tensor) -> Result<(i64, f32)> {
        Ok((util::greedy(&self.logits(obs)?)?, 0.0))
    }
}
