//! Driving a loaded agent as a policy.
use anyhow::Result;
use candle_core::{Device, Tensor};
use cleval_core::{Env, Policy};
use std::marker::PhantomData;

/// Decision function of a loaded agent.
///
/// All agent variants expose the same capability; the differences live
/// in their construction (see [`crate::registry`]).
pub trait ActionValue {
    /// Greedy action and value estimate for a batched observation.
    ///
    /// Agents without a critic head report a value of 0.0.
    fn action_value(&self, obs: &Tensor) -> Result<(i64, f32)>;
}

/// Conversion of an observation into a batched input tensor.
pub trait ObsToTensor {
    /// Converts the observation, placing it on `device`.
    fn to_tensor(&self, device: &Device) -> Result<Tensor>;
}

/// A [`Policy`] backed by a loaded agent.
pub struct LoadedPolicy<E> {
    agent: Box<dyn ActionValue>,
    device: Device,
    phantom: PhantomData<E>,
}

impl<E> LoadedPolicy<E> {
    /// Wraps the agent, converting observations onto `device`.
    pub fn new(agent: Box<dyn ActionValue>, device: Device) -> Self {
        Self {
            agent,
            device,
            phantom: PhantomData,
        }
    }
}

impl<E: Env> Policy<E> for LoadedPolicy<E>
where
    E::Obs: ObsToTensor,
    E::Act: From<u8>,
{
    fn sample(&mut self, obs: &E::Obs) -> E::Act {
        let obs = obs.to_tensor(&self.device).unwrap();
        let (act, _) = self.agent.action_value(&obs).unwrap();
        (act as u8).into()
    }
}
