//! Checkpoint naming scheme.
//!
//! Checkpoint files encode their provenance in the base name:
//! `{env}_trainmode{N}_{algo}_seed{S}.{ext}`, for example
//! `Pong_trainmode0_F1_seed42.pt`. The fields are recovered by
//! [`CheckpointName::parse`], and [`CheckpointName::sibling`] derives
//! the path of the equivalent checkpoint trained on another task.
use crate::error::EvalError;
use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
};

/// Provenance of a checkpoint, recovered from its file name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckpointName {
    /// Environment id the agent was trained on.
    pub env_name: String,

    /// Task (game mode) index the agent was trained on.
    pub train_mode: i64,

    /// Algorithm tag, verbatim from the file name.
    pub algorithm: String,

    /// Seed of the training run.
    pub seed: i64,
}

fn malformed(path: &Path) -> EvalError {
    EvalError::MalformedCheckpointName(path.to_string_lossy().into_owned())
}

impl CheckpointName {
    /// Parses the base name of `path`.
    ///
    /// The base name is split from the right, so environment ids
    /// containing underscores stay intact. Fails with
    /// [`EvalError::MalformedCheckpointName`]; callers treat this as
    /// fatal.
    pub fn parse(path: impl AsRef<Path>) -> Result<Self, EvalError> {
        let path = path.as_ref();
        let stem = path
            .file_stem()
            .and_then(OsStr::to_str)
            .ok_or_else(|| malformed(path))?;

        let mut it = stem.rsplitn(4, '_');
        let seed = it.next();
        let algorithm = it.next();
        let mode = it.next();
        let env_name = it.next();

        match (env_name, mode, algorithm, seed) {
            (Some(env_name), Some(mode), Some(algorithm), Some(seed))
                if !env_name.is_empty()
                    && !algorithm.is_empty()
                    && mode.starts_with("trainmode")
                    && seed.starts_with("seed") =>
            {
                let train_mode = mode["trainmode".len()..]
                    .parse()
                    .map_err(|_| malformed(path))?;
                let seed = seed["seed".len()..].parse().map_err(|_| malformed(path))?;
                Ok(Self {
                    env_name: env_name.to_string(),
                    train_mode,
                    algorithm: algorithm.to_string(),
                    seed,
                })
            }
            _ => Err(malformed(path)),
        }
    }

    /// Derives the path of the checkpoint trained on task `mode`,
    /// next to `path` and with the same extension.
    pub fn sibling(path: impl AsRef<Path>, mode: i64) -> Result<PathBuf, EvalError> {
        let path = path.as_ref();
        let name = Self::parse(path)?;
        let mut base = format!(
            "{}_trainmode{}_{}_seed{}",
            name.env_name, mode, name.algorithm, name.seed
        );
        if let Some(ext) = path.extension().and_then(OsStr::to_str) {
            base.push('.');
            base.push_str(ext);
        }
        Ok(path.with_file_name(base))
    }

    /// Output label of the algorithm.
    ///
    /// "Baseline" and "Finetune" are the long forms of "F1" and "FN";
    /// all other tags are used verbatim.
    pub fn normalized_algorithm(&self) -> &str {
        match self.algorithm.as_str() {
            "Baseline" => "F1",
            "Finetune" => "FN",
            other => other,
        }
    }
}
