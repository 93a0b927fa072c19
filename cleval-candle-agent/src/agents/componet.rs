//! Compositional agent (tag `CompoNet`).
use super::build_encoder_actor;
use crate::{util, ActionValue, Cnn, CnnConfig};
use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::{Linear, Module, VarBuilder, VarMap};
use log::info;
use std::path::{Path, PathBuf};

/// Agent that composes the encoders of all previously learned tasks.
///
/// The main checkpoint provides the current module; every prior-task
/// checkpoint contributes its (frozen) encoder. Prior checkpoints are
/// loaded encoder-only, so their heads and composition weights are
/// skipped.
pub struct CompoNetAgent {
    varmap: VarMap,
    encoder: Cnn,
    actor: Linear,
    prevs: Vec<Cnn>,
}

impl CompoNetAgent {
    /// Constructs the agent with fresh variables and no prior modules.
    pub fn new(n_actions: usize, device: &Device) -> Result<Self> {
        let (varmap, encoder, actor) =
            build_encoder_actor(&CnnConfig::default(), n_actions, device)?;
        Ok(Self {
            varmap,
            encoder,
            actor,
            prevs: vec![],
        })
    }

    /// Restores the agent from the main checkpoint and the ordered list
    /// of prior-task checkpoints.
    pub fn load(
        path: impl AsRef<Path>,
        prevs_paths: &[PathBuf],
        n_actions: usize,
        device: &Device,
    ) -> Result<Self> {
        let mut agent = Self::new(n_actions, device)?;
        for prev in prevs_paths {
            agent.prevs.push(load_prev_encoder(prev, device)?);
        }
        agent.varmap.load(&path)?;
        info!(
            "Loaded agent from {:?} with {} prior modules",
            path.as_ref(),
            agent.prevs.len()
        );
        Ok(agent)
    }

    /// Saves the current module's variables as a safetensors file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.varmap.save(&path)?;
        Ok(())
    }

    /// Number of prior-task modules.
    pub fn n_prevs(&self) -> usize {
        self.prevs.len()
    }
}

/// Loads the encoder of a prior-task checkpoint.
pub(super) fn load_prev_encoder(path: impl AsRef<Path>, device: &Device) -> Result<Cnn> {
    let mut varmap = VarMap::new();
    let encoder = {
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);
        Cnn::build(&vb.pp("encoder"), &CnnConfig::default())?
    };
    varmap
        .load(&path)
        .with_context(|| format!("loading prior-task checkpoint {:?}", path.as_ref()))?;
    Ok(encoder)
}

impl ActionValue for CompoNetAgent {
    fn action_value(&self, obs: &Tensor) -> Result<(i64, f32)> {
        let mut feat = self.encoder.forward(obs)?;
        for prev in &self.prevs {
            feat = feat.add(&prev.forward(obs)?)?;
        }
        let feat = (feat / (1.0 + self.prevs.len() as f64))?;
        let logits = self.actor.forward(&feat)?;
        Ok((util::greedy(&logits)?, 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::SimpleAgent;
    use tempdir::TempDir;

    #[test]
    fn loads_prior_modules_encoder_only() {
        let device = Device::Cpu;
        let dir = TempDir::new("componet").unwrap();

        // Prior checkpoints carry heads too; only encoders are read.
        let mut prevs = vec![];
        for i in 0..2 {
            let path = dir
                .path()
                .join(format!("Freeway_trainmode{}_CompoNet_seed1.safetensors", i));
            SimpleAgent::new(3, &device).unwrap().save(&path).unwrap();
            prevs.push(path);
        }
        let path = dir
            .path()
            .join("Freeway_trainmode2_CompoNet_seed1.safetensors");
        CompoNetAgent::new(3, &device).unwrap().save(&path).unwrap();

        let agent = CompoNetAgent::load(&path, &prevs, 3, &device).unwrap();
        assert_eq!(agent.n_prevs(), 2);

        let obs = Tensor::zeros((1, 4, 84, 84), DType::U8, &device).unwrap();
        let (act, _) = agent.action_value(&obs).unwrap();
        assert!((0..3).contains(&act));
    }

    #[test]
    fn missing_prior_checkpoint_fails() {
        let device = Device::Cpu;
        let dir = TempDir::new("componet").unwrap();
        let path = dir
            .path()
            .join("Freeway_trainmode1_CompoNet_seed1.safetensors");
        CompoNetAgent::new(3, &device).unwrap().save(&path).unwrap();

        let missing = dir
            .path()
            .join("Freeway_trainmode0_CompoNet_seed1.safetensors");
        assert!(CompoNetAgent::load(&path, &[missing], 3, &device).is_err());
    }
}
