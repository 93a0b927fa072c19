//! Emulator backend interface.
use crate::env::AtariEnvConfig;
use anyhow::Result;

/// A raw emulator driven by the preprocessing pipeline.
pub trait Emulator {
    /// Starts a new episode with the given random seed.
    ///
    /// Resetting with the same seed replays the same episode.
    fn reset(&mut self, seed: i64);

    /// Advances one raw frame and returns the reward.
    fn step(&mut self, act: u8) -> f32;

    /// Whether the game is over.
    fn is_over(&self) -> bool;

    /// Size of the action set.
    fn n_actions(&self) -> usize;

    /// Width of a raw frame in pixels.
    fn width(&self) -> usize;

    /// Height of a raw frame in pixels.
    fn height(&self) -> usize;

    /// Writes the current RGB frame into `buf` (`width * height * 3` bytes).
    fn render_rgb24(&self, buf: &mut [u8]);

    /// Displays the current frame on screen. No-op for headless backends.
    fn render(&mut self) {}
}

/// Builds the emulator backend selected by the configuration.
///
/// The name `Scripted-v0` selects the deterministic scripted backend;
/// everything else is an ALE game and requires the `ale` feature.
pub fn build_emulator(config: &AtariEnvConfig, seed: i64) -> Result<Box<dyn Emulator>> {
    log::debug!("building emulator for {}", config.name);
    if config.name == "Scripted-v0" {
        return Ok(Box::new(crate::util::test::ScriptedEmulator::new(seed)));
    }

    #[cfg(feature = "ale")]
    return Ok(Box::new(crate::ale::AleEmulator::build(config, seed)?));

    #[cfg(not(feature = "ale"))]
    anyhow::bail!(
        "no emulator backend for `{}`; rebuild with the `ale` feature",
        config.name
    )
}
