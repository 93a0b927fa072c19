//! Iterative-pruning agent (tag `PackNet`).
use crate::{util, ActionValue, Cnn, CnnConfig};
use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::{linear, Init, Linear, Module, VarBuilder, VarMap};
use log::info;
use std::path::Path;

/// Agent whose shared encoder weights are partitioned across tasks.
///
/// The checkpoint stores, next to each encoder weight, an owner tensor
/// (`owner.*`) holding the 1-based id of the task the weight was
/// assigned to during pruning. [`PackNetAgent::select_view`] keeps the
/// weights owned by the requested task or an earlier one and zeroes
/// the rest.
pub struct PackNetAgent {
    varmap: VarMap,
    encoder: Cnn,
    actor: Linear,
    critic: Linear,
    device: Device,
}

impl PackNetAgent {
    /// Constructs the agent with fresh variables; every weight starts
    /// owned by task 1.
    pub fn new(n_actions: usize, device: &Device) -> Result<Self> {
        let varmap = VarMap::new();
        let (encoder, actor, critic) = {
            let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);
            let encoder = Cnn::build(&vb.pp("encoder"), &CnnConfig::default())?;
            let actor = linear(encoder.feature_dim(), n_actions, vb.pp("actor"))?;
            let critic = linear(encoder.feature_dim(), 1, vb.pp("critic"))?;
            (encoder, actor, critic)
        };
        for (name, dims) in util::var_names_under(&varmap, "encoder.") {
            varmap.get(
                dims,
                &format!("owner.{}", name),
                Init::Const(1.0),
                DType::F32,
                device,
            )?;
        }

        Ok(Self {
            varmap,
            encoder,
            actor,
            critic,
            device: device.clone(),
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

    /// Activates the parameter view of the given 1-based task id by
    /// zeroing every encoder weight owned by a later task. `None`
    /// keeps all weights.
    pub fn select_view(&mut self, task_id: Option<i64>) -> Result<()> {
        let task_id = match task_id {
            Some(task_id) => task_id,
            None => return Ok(()),
        };

        let data = self.varmap.data().lock().unwrap();
        for (name, owner) in data.iter() {
            let weight_name = match name.strip_prefix("owner.") {
                Some(weight_name) => weight_name,
                None => continue,
            };
            let weight = data
                .get(weight_name)
                .with_context(|| format!("no variable `{}` for `{}`", weight_name, name))?;
            let keep = owner.as_tensor().le(task_id as f64)?.to_dtype(DType::F32)?;
            weight.set(&weight.as_tensor().mul(&keep)?)?;
        }
        info!("Selected the parameter view of task {}", task_id);
        Ok(())
    }

    /// Overwrites the actor and critic heads with those stored in
    /// another checkpoint, typically the sibling trained on the test
    /// task.
    pub fn swap_heads_from(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let tensors = candle_core::safetensors::load(path.as_ref(), &self.device)?;
        util::set_vars_from(&self.varmap, &tensors, &["actor.", "critic."])?;
        info!("Swapped actor/critic heads from {:?}", path.as_ref());
        Ok(())
    }

    #[cfg(test)]
    fn var(&self, name: &str) -> Tensor {
        self.varmap
            .data()
            .lock()
            .unwrap()
            .get(name)
            .unwrap()
            .as_tensor()
            .clone()
    }
}

impl ActionValue for PackNetAgent {
    fn action_value(&self, obs: &Tensor) -> Result<(i64, f32)> {
        let feat = self.encoder.forward(obs)?;
        let logits = self.actor.forward(&feat)?;
        let value = self.critic.forward(&feat)?;
        Ok((util::greedy(&logits)?, util::scalar_value(&value)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn select_view_zeroes_later_tasks_weights() {
        let device = Device::Cpu;
        let mut agent = PackNetAgent::new(4, &device).unwrap();

        // Assign the whole first conv layer to task 3.
        {
            let data = agent.varmap.data().lock().unwrap();
            let owner = data.get("owner.encoder.c1.weight").unwrap();
            let threes = (owner.as_tensor().zeros_like().unwrap() + 3.0).unwrap();
            owner.set(&threes).unwrap();
        }

        agent.select_view(Some(2)).unwrap();

        let c1 = agent.var("encoder.c1.weight");
        let c2 = agent.var("encoder.c2.weight");
        assert_eq!(
            c1.abs().unwrap().sum_all().unwrap().to_scalar::<f32>().unwrap(),
            0.0
        );
        assert!(c2.abs().unwrap().sum_all().unwrap().to_scalar::<f32>().unwrap() > 0.0);
    }

    #[test]
    fn select_view_without_task_keeps_all_weights() {
        let device = Device::Cpu;
        let mut agent = PackNetAgent::new(4, &device).unwrap();
        let before = agent.var("encoder.c1.weight");
        agent.select_view(None).unwrap();
        let after = agent.var("encoder.c1.weight");
        let diff = (before - after).unwrap().abs().unwrap();
        assert_eq!(diff.sum_all().unwrap().to_scalar::<f32>().unwrap(), 0.0);
    }

    #[test]
    fn swaps_heads_from_a_sibling_checkpoint() {
        let device = Device::Cpu;
        let dir = TempDir::new("packnet").unwrap();
        let path = dir
            .path()
            .join("Freeway_trainmode1_PackNet_seed1.safetensors");

        let other = PackNetAgent::new(4, &device).unwrap();
        {
            let data = other.varmap.data().lock().unwrap();
            let actor = data.get("actor.weight").unwrap();
            let ones = actor.as_tensor().ones_like().unwrap();
            actor.set(&ones).unwrap();
        }
        other.save(&path).unwrap();

        let mut agent = PackNetAgent::new(4, &device).unwrap();
        agent.swap_heads_from(&path).unwrap();
        let actor = agent.var("actor.weight");
        let diff = (actor.ones_like().unwrap() - actor).unwrap().abs().unwrap();
        assert_eq!(diff.sum_all().unwrap().to_scalar::<f32>().unwrap(), 0.0);
    }

    #[test]
    fn value_estimate_comes_from_the_critic() {
        let device = Device::Cpu;
        let agent = PackNetAgent::new(4, &device).unwrap();
        let obs = Tensor::zeros((1, 4, 84, 84), candle_core::DType::U8, &device).unwrap();
        assert!(agent.action_value(&obs).is_ok());
    }
}
