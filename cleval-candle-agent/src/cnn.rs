//! Shared convolutional encoder.
use anyhow::Result;
use candle_core::{DType::F32, Tensor};
use candle_nn::{
    conv::Conv2dConfig,
    conv2d_no_bias, linear,
    sequential::{seq, Sequential},
    Module, VarBuilder,
};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Dimension of the feature vector produced by [`Cnn`].
pub const FEATURE_DIM: usize = 512;

/// Configuration of [`Cnn`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct CnnConfig {
    /// Number of stacked frames in the input.
    pub n_stack: usize,

    /// Concatenated ReLU after the linear layer. Doubles the feature
    /// dimension to `2 * FEATURE_DIM`.
    pub crelu: bool,
}

impl Default for CnnConfig {
    fn default() -> Self {
        Self {
            n_stack: 4,
            crelu: false,
        }
    }
}

impl CnnConfig {
    /// Sets the concatenated-ReLU flag.
    pub fn crelu(mut self, v: bool) -> Self {
        self.crelu = v;
        self
    }

    /// Constructs [`CnnConfig`] from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`CnnConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Convolutional encoder with the architecture of the DQN paper.
///
/// Maps a U8 observation of shape `(batch, n_stack, 84, 84)` to a
/// feature vector; raw pixel values are scaled to the unit range
/// inside the forward pass.
pub struct Cnn {
    seq: Sequential,
    feature_dim: usize,
}

impl Cnn {
    fn stride(s: usize) -> Conv2dConfig {
        Conv2dConfig {
            stride: s,
            ..Default::default()
        }
    }

    /// Builds the encoder, registering its variables under `vb`.
    pub fn build(vb: &VarBuilder, config: &CnnConfig) -> Result<Self> {
        let seq = seq()
            .add_fn(|xs| xs.to_dtype(F32)? / 255.0)
            .add(conv2d_no_bias(config.n_stack, 32, 8, Self::stride(4), vb.pp("c1"))?)
            .add_fn(|xs| xs.relu())
            .add(conv2d_no_bias(32, 64, 4, Self::stride(2), vb.pp("c2"))?)
            .add_fn(|xs| xs.relu())
            .add(conv2d_no_bias(64, 64, 3, Self::stride(1), vb.pp("c3"))?)
            .add_fn(|xs| xs.relu()?.flatten_from(1))
            .add(linear(3136, FEATURE_DIM, vb.pp("l1"))?);

        let (seq, feature_dim) = if config.crelu {
            let seq = seq.add_fn(|xs| Tensor::cat(&[xs.relu()?, xs.neg()?.relu()?], 1));
            (seq, 2 * FEATURE_DIM)
        } else {
            (seq.add_fn(|xs| xs.relu()), FEATURE_DIM)
        };

        Ok(Self { seq, feature_dim })
    }

    /// Dimension of the feature vector.
    pub fn feature_dim(&self) -> usize {
        self.feature_dim
    }

    /// Computes the feature vector.
    pub fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        Ok(self.seq.forward(xs)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device};
    use candle_nn::{VarBuilder, VarMap};

    fn obs(device: &Device) -> Tensor {
        Tensor::zeros((1, 4, 84, 84), DType::U8, device).unwrap()
    }

    #[test]
    fn feature_vector_has_the_expected_dimension() {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let cnn = Cnn::build(&vb, &CnnConfig::default()).unwrap();
        let feat = cnn.forward(&obs(&device)).unwrap();
        assert_eq!(feat.dims(), &[1, FEATURE_DIM]);
    }

    #[test]
    fn crelu_doubles_the_feature_dimension() {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let cnn = Cnn::build(&vb, &CnnConfig::default().crelu(true)).unwrap();
        assert_eq!(cnn.feature_dim(), 2 * FEATURE_DIM);
        let feat = cnn.forward(&obs(&device)).unwrap();
        assert_eq!(feat.dims(), &[1, 2 * FEATURE_DIM]);
    }
}
