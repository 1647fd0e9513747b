use anyhow::{Result, anyhow};
use candle_core::{Device, Tensor};
use tokenizers::{Tokenizer, TruncationParams};

/// Let the tokenizer truncate to `max_len`, keeping the special tokens the
/// post-processor adds (`[CLS] ... [SEP]`).
pub fn configure_truncation(tokenizer: &mut Tokenizer, max_len: usize) -> Result<()> {
    let params = TruncationParams { max_length: max_len, ..TruncationParams::default() };
    tokenizer.with_truncation(Some(params)).map_err(|e| anyhow!("Failed to set truncation: {}", e))?;
    Ok(())
}

/// Input tensors for one BERT forward pass, each shaped `[B, T]`.
pub struct BatchInputs {
    pub input_ids: Tensor,
    pub token_type_ids: Tensor,
    pub attention_mask: Tensor,
}

/// Tokenize `texts` and right-pad with id 0 to the longest row in the batch.
/// Rows are also capped at `max_len` in case the tokenizer was not configured
/// with [`configure_truncation`].
pub fn tokenize_batch(tokenizer: &Tokenizer, texts: &[String], max_len: usize, device: &Device) -> Result<BatchInputs> {
    let encodings = tokenizer.encode_batch(texts.to_vec(), true).map_err(|e| anyhow!("Tokenization failed: {}", e))?;
    let seq_len = encodings.iter().map(|e| e.get_ids().len().min(max_len)).max().unwrap_or(0).max(1);

    let mut ids = Vec::with_capacity(texts.len() * seq_len);
    let mut mask = Vec::with_capacity(texts.len() * seq_len);
    for enc in &encodings {
        let row_ids: Vec<u32> = enc.get_ids().iter().take(seq_len).copied().collect();
        let row_mask: Vec<u32> = enc.get_attention_mask().iter().take(seq_len).copied().collect();
        let pad = seq_len - row_ids.len();
        ids.extend(row_ids);
        ids.extend(std::iter::repeat(0u32).take(pad));
        mask.extend(row_mask);
        mask.extend(std::iter::repeat(0u32).take(pad));
    }

    let shape = (encodings.len(), seq_len);
    let input_ids = Tensor::from_vec(ids, shape, device)?;
    let attention_mask = Tensor::from_vec(mask, shape, device)?;
    let token_type_ids = input_ids.zeros_like()?;
    Ok(BatchInputs { input_ids, token_type_ids, attention_mask })
}
