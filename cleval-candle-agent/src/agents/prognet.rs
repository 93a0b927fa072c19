//! Progressive network agent (tag `ProgNet`).
use super::{build_encoder_actor, componet::load_prev_encoder};
use crate::{util, ActionValue, Cnn, CnnConfig};
use anyhow::Result;
use candle_core::{Device, Tensor};
use candle_nn::{Linear, Module, VarMap};
use log::info;
use std::path::{Path, PathBuf};

/// Column-wise progressive agent.
///
/// Each prior task contributes a frozen column loaded from its own
/// checkpoint; the current column and the actor head come from the
/// main checkpoint. Lateral features from earlier columns feed the
/// current column's head.
pub struct ProgressiveNetAgent {
    varmap: VarMap,
    column: Cnn,
    actor: Linear,
    prev_columns: Vec<Cnn>,
}

impl ProgressiveNetAgent {
    /// Constructs the agent with fresh variables and no prior columns.
    pub fn new(n_actions: usize, device: &Device) -> Result<Self> {
        let (varmap, column, actor) =
            build_encoder_actor(&CnnConfig::default(), n_actions, device)?;
        Ok(Self {
            varmap,
            column,
            actor,
            prev_columns: vec![],
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
            agent.prev_columns.push(load_prev_encoder(prev, device)?);
        }
        agent.varmap.load(&path)?;
        info!(
            "Loaded agent from {:?} with {} columns",
            path.as_ref(),
            agent.prev_columns.len() + 1
        );
        Ok(agent)
    }

    /// Saves the current column's variables as a safetensors file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.varmap.save(&path)?;
        Ok(())
    }

    /// Number of columns, including the current one.
    pub fn n_columns(&self) -> usize {
        self.prev_columns.len() + 1
    }
}

impl ActionValue for ProgressiveNetAgent {
    fn action_value(&self, obs: &Tensor) -> Result<(i64, f32)> {
        let mut feat = self.column.forward(obs)?;
        for column in &self.prev_columns {
            feat = feat.add(&column.forward(obs)?)?;
        }
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
    fn grows_one_column_per_prior_task() {
        let device = Device::Cpu;
        let dir = TempDir::new("prognet").unwrap();

        let mut prevs = vec![];
        for i in 0..3 {
            let path = dir
                .path()
                .join(format!("Freeway_trainmode{}_ProgNet_seed1.safetensors", i));
            ProgressiveNetAgent::new(3, &device)
                .unwrap()
                .save(&path)
                .unwrap();
            prevs.push(path);
        }
        let path = dir
            .path()
            .join("Freeway_trainmode3_ProgNet_seed1.safetensors");
        ProgressiveNetAgent::new(3, &device)
            .unwrap()
            .save(&path)
            .unwrap();

        let agent = ProgressiveNetAgent::load(&path, &prevs, 3, &device).unwrap();
        assert_eq!(agent.n_columns(), 4);

        let obs = Tensor::zeros((1, 4, 84, 84), DType::U8, &device).unwrap();
        assert!(agent.action_value(&obs).is_ok());
    }
}
