//! Algorithm registry and dispatch.
//!
//! Maps the algorithm tag recovered from a checkpoint name to the
//! loading procedure of one of the ten agent variants. The mapping is
//! a closed set; an unrecognized tag fails at [`Algorithm::from_str`]
//! and is treated as fatal by the caller.
use crate::{
    agents::{
        CReLUsAgent, CbpNetAgent, CompoNetAgent, FuseNetAgent, MaskNetAgent, PackNetAgent,
        ProgressiveNetAgent, RewireAgent, SimpleAgent,
    },
    ActionValue,
};
use anyhow::{Context, Result};
use candle_core::Device;
use cleval_core::{checkpoint::CheckpointName, error::EvalError};
use std::{fmt, path::PathBuf, str::FromStr};

/// The closed set of algorithm tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Algorithm {
    F1,
    FN,
    Baseline,
    Finetune,
    CompoNet,
    ProgNet,
    PackNet,
    FuseNet,
    FuseNetwMerge,
    MaskNet,
    Rewire,
    CReLUs,
    CbpNet,
}

impl FromStr for Algorithm {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "F1" => Ok(Self::F1),
            "FN" => Ok(Self::FN),
            "Baseline" => Ok(Self::Baseline),
            "Finetune" => Ok(Self::Finetune),
            "CompoNet" => Ok(Self::CompoNet),
            "ProgNet" => Ok(Self::ProgNet),
            "PackNet" => Ok(Self::PackNet),
            "FuseNet" => Ok(Self::FuseNet),
            "FuseNetwMerge" => Ok(Self::FuseNetwMerge),
            "MaskNet" => Ok(Self::MaskNet),
            "Rewire" => Ok(Self::Rewire),
            "CReLUs" => Ok(Self::CReLUs),
            "CbpNet" => Ok(Self::CbpNet),
            _ => Err(EvalError::UnknownAlgorithm(s.to_string())),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::F1 => "F1",
            Self::FN => "FN",
            Self::Baseline => "Baseline",
            Self::Finetune => "Finetune",
            Self::CompoNet => "CompoNet",
            Self::ProgNet => "ProgNet",
            Self::PackNet => "PackNet",
            Self::FuseNet => "FuseNet",
            Self::FuseNetwMerge => "FuseNetwMerge",
            Self::MaskNet => "MaskNet",
            Self::Rewire => "Rewire",
            Self::CReLUs => "CReLUs",
            Self::CbpNet => "CbpNet",
        };
        write!(f, "{}", tag)
    }
}

/// Task count of an environment, used by agents with per-task
/// parameter tables whose checkpoints do not store the count.
pub fn num_tasks_for_env(env_name: &str) -> Result<usize, EvalError> {
    if env_name.contains("SpaceInvaders") {
        Ok(10)
    } else if env_name.contains("Freeway") {
        Ok(8)
    } else {
        Err(EvalError::UnsupportedEnvironment(env_name.to_string()))
    }
}

/// Everything the loading procedures need besides the algorithm tag.
pub struct AgentSpec {
    /// Path of the main checkpoint.
    pub path: PathBuf,

    /// Provenance recovered from the checkpoint name.
    pub name: CheckpointName,

    /// Test mode from the invocation; `None` evaluates on the train
    /// mode.
    pub mode: Option<i64>,

    /// Number of prior tasks, for agents that rebuild on earlier
    /// checkpoints.
    pub train_mode: Option<i64>,

    /// Size of the environment's action set.
    pub n_actions: usize,

    /// Device the agent runs on.
    pub device: Device,
}

impl AgentSpec {
    /// The mode the agent is evaluated on.
    pub fn test_mode(&self) -> i64 {
        self.mode.unwrap_or(self.name.train_mode)
    }

    /// Paths of the checkpoints of all prior tasks, in task order.
    fn prev_paths(&self) -> Result<Vec<PathBuf>> {
        let train_mode = self
            .train_mode
            .context("the number of prior tasks (train_mode) is required")?;
        (0..train_mode)
            .map(|i| Ok(CheckpointName::sibling(&self.path, i)?))
            .collect()
    }
}

/// Runs the loading procedure of the given algorithm.
pub fn load_agent(algorithm: Algorithm, spec: &AgentSpec) -> Result<Box<dyn ActionValue>> {
    use Algorithm::*;

    match algorithm {
        F1 | FN | Baseline | Finetune => Ok(Box::new(SimpleAgent::load(
            &spec.path,
            spec.n_actions,
            &spec.device,
        )?)),
        CompoNet => Ok(Box::new(CompoNetAgent::load(
            &spec.path,
            &spec.prev_paths()?,
            spec.n_actions,
            &spec.device,
        )?)),
        ProgNet => Ok(Box::new(ProgressiveNetAgent::load(
            &spec.path,
            &spec.prev_paths()?,
            spec.n_actions,
            &spec.device,
        )?)),
        PackNet => {
            let mut agent = PackNetAgent::load(&spec.path, spec.n_actions, &spec.device)?;
            agent.select_view(spec.mode.map(|m| m + 1))?;
            if spec.test_mode() != spec.name.train_mode {
                let path = CheckpointName::sibling(&spec.path, spec.test_mode())?;
                agent.swap_heads_from(&path)?;
            }
            Ok(Box::new(agent))
        }
        FuseNet => Ok(Box::new(FuseNetAgent::load(
            &spec.path,
            spec.n_actions,
            &spec.device,
        )?)),
        FuseNetwMerge => Ok(Box::new(FuseNetAgent::load_merged(
            &spec.path,
            spec.n_actions,
            &spec.device,
        )?)),
        MaskNet => {
            let num_tasks = num_tasks_for_env(&spec.name.env_name)?;
            Ok(Box::new(MaskNetAgent::load(
                &spec.path,
                spec.n_actions,
                num_tasks,
                &spec.device,
            )?))
        }
        Rewire => {
            let mut agent = RewireAgent::load(&spec.path, spec.n_actions, &spec.device)?;
            agent.set_active_task(spec.test_mode())?;
            Ok(Box::new(agent))
        }
        CReLUs => Ok(Box::new(CReLUsAgent::load(
            &spec.path,
            spec.n_actions,
            &spec.device,
        )?)),
        CbpNet => Ok(Box::new(CbpNetAgent::load(
            &spec.path,
            spec.n_actions,
            &spec.device,
        )?)),
    }
}
