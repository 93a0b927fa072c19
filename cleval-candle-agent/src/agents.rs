//! The ten continual-learning agent variants.
//!
//! Each variant is a thin inference-time reconstruction of the trained
//! architecture: it registers the variables its checkpoint layout
//! requires, restores them with [`candle_nn::VarMap::load`], and
//! exposes the decision function through
//! [`ActionValue`](crate::ActionValue). Task-isolating variants add
//! explicit post-construction calls (`select_view`, `swap_heads_from`,
//! `set_active_task`) so parameter mutation stays visible at the call
//! site.
use crate::{Cnn, CnnConfig};
use anyhow::Result;
use candle_core::{DType, Device};
use candle_nn::{linear, Linear, VarBuilder, VarMap};

mod cbp;
mod componet;
mod crelu;
mod fusenet;
mod masknet;
mod packnet;
mod prognet;
mod rewire;
mod simple;
pub use cbp::CbpNetAgent;
pub use componet::CompoNetAgent;
pub use crelu::CReLUsAgent;
pub use fusenet::FuseNetAgent;
pub use masknet::MaskNetAgent;
pub use packnet::PackNetAgent;
pub use prognet::ProgressiveNetAgent;
pub use rewire::RewireAgent;
pub use simple::SimpleAgent;

/// Encoder and actor head registered under `encoder.*` and `actor.*`,
/// the layout shared by all checkpoint kinds.
fn build_encoder_actor(
    config: &CnnConfig,
    n_actions: usize,
    device: &Device,
) -> Result<(VarMap, Cnn, Linear)> {
    let varmap = VarMap::new();
    let (encoder, actor) = {
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);
        let encoder = Cnn::build(&vb.pp("encoder"), config)?;
        let actor = linear(encoder.feature_dim(), n_actions, vb.pp("actor"))?;
        (encoder, actor)
    };
    Ok((varmap, encoder, actor))
}
