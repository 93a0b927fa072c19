//! Configuration of [`AtariEnv`](super::AtariEnv).
//!
//! If environment variable `ATARI_ROM_DIR` exists, it is used as the
//! directory from which ROM images of the Atari games are loaded.
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    env,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`AtariEnv`](super::AtariEnv).
///
/// Only the game, the game mode and the render flag are configurable;
/// the preprocessing pipeline is fixed.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AtariEnvConfig {
    /// Directory of the ROM images.
    pub rom_dir: String,

    /// Name of the game, e.g. `SpaceInvaders-v5`.
    pub name: String,

    /// Game mode (task index). `None` keeps the game's default mode.
    pub mode: Option<i64>,

    /// Opens a window displaying the game.
    pub render: bool,
}

impl Default for AtariEnvConfig {
    fn default() -> Self {
        let rom_dir = if let Ok(var) = env::var("ATARI_ROM_DIR") {
            var
        } else {
            "".to_string()
        };

        Self {
            rom_dir,
            name: "".to_string(),
            mode: None,
            render: false,
        }
    }
}

impl AtariEnvConfig {
    /// Sets the name of the game.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the game mode.
    pub fn mode(mut self, mode: Option<i64>) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the render flag.
    pub fn render(mut self, render: bool) -> Self {
        self.render = render;
        self
    }

    /// Constructs [`AtariEnvConfig`] from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let config = serde_yaml::from_reader(rdr)?;
        Ok(config)
    }

    /// Saves [`AtariEnvConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_round_trip() {
        let config = AtariEnvConfig::default()
            .name("Freeway-v5")
            .mode(Some(3))
            .render(false);
        let yaml = serde_yaml::to_string(&config).unwrap();
        let config2: AtariEnvConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config2.name, "Freeway-v5");
        assert_eq!(config2.mode, Some(3));
        assert!(!config2.render);
    }
}
