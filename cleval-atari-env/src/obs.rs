use cleval_core::Obs;

/// Observation of [`AtariEnv`](crate::AtariEnv): 4 stacked grayscale
/// frames of 84x84 pixels, channel first.
#[derive(Debug, Clone)]
pub struct AtariObs {
    /// 4 * 84 * 84 bytes.
    pub frames: Vec<u8>,
}

impl From<Vec<u8>> for AtariObs {
    fn from(frames: Vec<u8>) -> Self {
        Self { frames }
    }
}

impl Obs for AtariObs {
    fn len(&self) -> usize {
        1
    }
}

#[cfg(feature = "candle")]
impl cleval_candle_agent::ObsToTensor for AtariObs {
    /// Shape (1, 4, 84, 84), dtype U8. Scaling to the unit range is
    /// done inside the networks.
    fn to_tensor(&self, device: &candle_core::Device) -> anyhow::Result<candle_core::Tensor> {
        let t = candle_core::Tensor::from_slice(
            &self.frames,
            (crate::N_STACK, crate::FRAME_SIZE, crate::FRAME_SIZE),
            device,
        )?;
        Ok(t.unsqueeze(0)?)
    }
}
