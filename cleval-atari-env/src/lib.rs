//! Atari environment with DQN-style preprocessing.
//!
//! The preprocessing pipeline is fixed and applied in this order:
//! episode statistics, frame-skip 4 with max-pooling over the skipped
//! frames, resize to 84x84, grayscale conversion, stack of the last 4
//! frames. It matches the pipeline the evaluated checkpoints were
//! trained with.
//!
//! The emulator behind the pipeline is abstracted by the [`Emulator`]
//! trait. The ALE backend (feature `ale`) loads ROM images from the
//! directory given by the environment variable `ATARI_ROM_DIR`; an easy
//! way to populate it is the [AutoROM](https://pypi.org/project/AutoROM/)
//! Python package. A deterministic scripted backend, selected by the
//! environment name `Scripted-v0`, is provided for tests and smoke runs.
mod act;
#[cfg(feature = "ale")]
pub mod ale;
mod emulator;
mod env;
mod obs;
pub mod util;
pub use act::AtariAct;
pub use emulator::{build_emulator, Emulator};
pub use env::{AtariEnv, AtariEnvConfig};
pub use obs::AtariObs;

/// Width and height of a preprocessed frame.
pub const FRAME_SIZE: usize = 84;

/// Number of stacked frames in an observation.
pub const N_STACK: usize = 4;

pub(crate) const FRAME_IN_BYTES: usize = FRAME_SIZE * FRAME_SIZE;
