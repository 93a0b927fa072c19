//! ALE emulator backend (feature `ale`).
use crate::{env::AtariEnvConfig, Emulator};
use anyhow::{bail, Result};
use c_str_macro::c_str;
use std::{ffi::CString, path::PathBuf};

/// Maps an environment name like `SpaceInvaders-v5` to the file name of
/// its ROM image, e.g. `space_invaders.bin`.
fn rom_file_name(name: &str) -> Result<String> {
    let game = name.split('-').next().unwrap_or(name);
    if game.is_empty() {
        bail!("empty environment name");
    }

    let mut snake = String::new();
    for (i, c) in game.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i != 0 {
                snake.push('_');
            }
            snake.push(c.to_ascii_lowercase());
        } else {
            snake.push(c);
        }
    }
    snake.push_str(".bin");
    Ok(snake)
}

/// The Arcade Learning Environment behind the preprocessing pipeline.
///
/// The random seed only takes effect when a ROM is loaded, so
/// [`Emulator::reset`] reloads the ROM with the new seed before
/// restarting the game. Episodes reset with the same seed replay
/// identically.
pub struct AleEmulator {
    inner: *mut atari_env_sys::ALEInterface,

    rom_path: CString,

    mode: Option<i64>,

    // Minimal action set of the loaded game
    actions: Vec<i32>,

    window: Option<minifb::Window>,
}

impl Drop for AleEmulator {
    fn drop(&mut self) {
        unsafe {
            atari_env_sys::ALE_del(self.inner);
        }
    }
}

impl AleEmulator {
    /// Loads the ROM of the configured game and applies the evaluation
    /// settings: no sticky actions, no color averaging, no frame skip
    /// inside the emulator.
    pub fn build(config: &AtariEnvConfig, seed: i64) -> Result<Self> {
        let rom_path: PathBuf = [&config.rom_dir, &rom_file_name(&config.name)?]
            .iter()
            .collect();
        if !rom_path.exists() {
            bail!("ROM image not found: {}", rom_path.display());
        }

        let ale = unsafe { atari_env_sys::ALE_new() };
        unsafe {
            atari_env_sys::setInt(ale, c_str!("random_seed").as_ptr(), seed as i32);
            atari_env_sys::setFloat(ale, c_str!("repeat_action_probability").as_ptr(), 0.0);
            atari_env_sys::setBool(ale, c_str!("color_averaging").as_ptr(), false);
            atari_env_sys::setInt(ale, c_str!("frame_skip").as_ptr(), 1);
            atari_env_sys::setBool(ale, c_str!("display_screen").as_ptr(), false);
            atari_env_sys::setBool(ale, c_str!("sound").as_ptr(), false);
        }

        let rom_path = CString::new(rom_path.display().to_string())?;
        unsafe {
            atari_env_sys::loadROM(ale, rom_path.as_ptr());

            if let Some(mode) = config.mode {
                atari_env_sys::setMode(ale, mode as i32);
            }
            atari_env_sys::reset_game(ale);
        }

        let n = unsafe { atari_env_sys::getMinimalActionSize(ale) } as usize;
        let mut actions = vec![0i32; n];
        unsafe {
            atari_env_sys::getMinimalActionSet(ale, actions.as_mut_ptr());
        }

        log::info!(
            "loaded {} with mode {:?} and {} actions",
            config.name,
            config.mode,
            n
        );

        Ok(Self {
            inner: ale,
            rom_path,
            mode: config.mode,
            actions,
            window: None,
        })
    }
}

impl Emulator for AleEmulator {
    fn reset(&mut self, seed: i64) {
        // The seed only takes effect when a ROM is loaded.
        unsafe {
            atari_env_sys::setInt(self.inner, c_str!("random_seed").as_ptr(), seed as i32);
            atari_env_sys::loadROM(self.inner, self.rom_path.as_ptr());
            if let Some(mode) = self.mode {
                atari_env_sys::setMode(self.inner, mode as i32);
            }
            atari_env_sys::reset_game(self.inner);
        }
    }

    fn step(&mut self, act: u8) -> f32 {
        let action = self.actions[act as usize];
        let reward = unsafe { atari_env_sys::act(self.inner, action) };
        reward as f32
    }

    fn is_over(&self) -> bool {
        unsafe { atari_env_sys::game_over(self.inner) }
    }

    fn n_actions(&self) -> usize {
        self.actions.len()
    }

    fn width(&self) -> usize {
        unsafe { atari_env_sys::getScreenWidth(self.inner) as usize }
    }

    fn height(&self) -> usize {
        unsafe { atari_env_sys::getScreenHeight(self.inner) as usize }
    }

    fn render_rgb24(&self, buf: &mut [u8]) {
        unsafe {
            atari_env_sys::getScreenRGB2(self.inner, buf.as_mut_ptr());
        }
    }

    fn render(&mut self) {
        let (w, h) = (self.width(), self.height());
        if self.window.is_none() {
            match minifb::Window::new("cleval", w, h, minifb::WindowOptions::default()) {
                Ok(window) => self.window = Some(window),
                Err(e) => {
                    log::warn!("failed to open a window: {}", e);
                    return;
                }
            }
        }

        let mut rgb = vec![0u8; w * h * 3];
        self.render_rgb24(&mut rgb);
        let buf = rgb
            .chunks_exact(3)
            .map(|p| ((p[0] as u32) << 16) | ((p[1] as u32) << 8) | (p[2] as u32))
            .collect::<Vec<_>>();

        if let Some(window) = self.window.as_mut() {
            if let Err(e) = window.update_with_buffer(&buf, w, h) {
                log::warn!("failed to update the window: {}", e);
            }
        }
    }
}
