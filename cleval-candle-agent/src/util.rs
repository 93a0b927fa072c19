//! Utilities for manipulating agent variables.
use anyhow::{Context, Result};
use candle_core::{Tensor, D};
use candle_nn::VarMap;
use std::collections::HashMap;

/// Greedy action from a `(1, n_actions)` logits tensor.
pub(crate) fn greedy(logits: &Tensor) -> Result<i64> {
    let act = logits.argmax(D::Minus1)?.squeeze(0)?.to_scalar::<u32>()?;
    Ok(act as i64)
}

/// Scalar value estimate from a `(1, 1)` critic output.
pub(crate) fn scalar_value(value: &Tensor) -> Result<f32> {
    Ok(value.squeeze(1)?.squeeze(0)?.to_scalar::<f32>()?)
}

/// Names and shapes of the variables under `prefix`.
pub(crate) fn var_names_under(varmap: &VarMap, prefix: &str) -> Vec<(String, Vec<usize>)> {
    let data = varmap.data().lock().unwrap();
    data.iter()
        .filter(|(name, _)| name.starts_with(prefix))
        .map(|(name, var)| (name.clone(), var.dims().to_vec()))
        .collect()
}

/// Overwrites the variables whose names start with one of `prefixes`
/// with the equally named tensors from `tensors`.
///
/// Variables are identified by their names, as in soft-update tracking.
pub(crate) fn set_vars_from(
    varmap: &VarMap,
    tensors: &HashMap<String, Tensor>,
    prefixes: &[&str],
) -> Result<()> {
    let data = varmap.data().lock().unwrap();
    for (name, var) in data.iter() {
        if prefixes.iter().any(|p| name.starts_with(p)) {
            let t = tensors
                .get(name)
                .with_context(|| format!("missing tensor `{}` in the source checkpoint", name))?;
            var.set(t)?;
        }
    }
    Ok(())
}
