use anyhow::Result;
use candle_core::{DType, Tensor};

/// Mean over unmasked tokens followed by L2 normalization: `[B,T,H] -> [B,H]`.
pub fn masked_mean_l2(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    let (batch, _tokens, hidden_dim) = hidden.dims3()?;

    let mask = attention_mask.to_device(hidden.device())?.to_dtype(hidden.dtype())?;
    let mask_broadcast = mask.unsqueeze(2)?.broadcast_as(hidden.shape())?;
    let sum = (hidden * &mask_broadcast)?.sum(1)?;
    // An all-padding row would divide by zero; floor the length at one token.
    let lengths = mask.sum(1)?.unsqueeze(1)?.maximum(1f64)?;
    let mean = sum.broadcast_div(&lengths)?;

    let eps_val = match hidden.dtype() { DType::F16 | DType::BF16 => 1e-6f64, _ => 1e-12f64 };
    let norm = (mean.sqr()?.sum_keepdim(1)?.sqrt()? + eps_val)?;
    let normalized = mean.broadcast_div(&norm)?;
    debug_assert_eq!(normalized.dims(), &[batch, hidden_dim]);
    Ok(normalized)
}
