//! Action for [`AtariEnv`](crate::AtariEnv).
use cleval_core::Act;

/// Index into the emulator's action set.
#[derive(Debug, Clone)]
pub struct AtariAct {
    /// Action index.
    pub act: u8,
}

impl AtariAct {
    /// Constructs the action.
    pub fn new(act: u8) -> Self {
        Self { act }
    }
}

impl Act for AtariAct {
    fn len(&self) -> usize {
        1
    }
}

impl From<u8> for AtariAct {
    fn from(act: u8) -> Self {
        Self { act }
    }
}
