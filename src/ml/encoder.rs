// ============================================================
// Layer 5 — Sentence Encoder (frozen feature extractor)
// ============================================================
// Turns a padded token-id sequence into one fixed-width vector:
// an embedding lookup per token, mean pooling over the positions
// the attention mask marks as real, then L2 normalisation so
// every sentence lands on the unit sphere.
//
// The encoder is FROZEN: its output is detached from the
// autodiff graph before it leaves this module, so no gradient
// ever reaches the embedding table and the optimizer never
// updates it. Only the classification head on top learns. The
// table still lives inside the model record, which keeps the
// feature space identical across save/load cycles.
//
// Reference: Burn Book §3 (Modules)
//            Reimers & Gurevych (2019) - Sentence-BERT
//            (mean pooling over token embeddings)

use burn::{
    nn::{Embedding, EmbeddingConfig},
    prelude::*,
};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct SentenceEncoderConfig {
    pub vocab_size:  usize,
    pub embed_width: usize,
}

impl SentenceEncoderConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> SentenceEncoder<B> {
        SentenceEncoder {
            token_embedding: EmbeddingConfig::new(self.vocab_size, self.embed_width)
                .init(device),
        }
    }
}

#[derive(Module, Debug)]
pub struct SentenceEncoder<B: Backend> {
    pub token_embedding: Embedding<B>,
}

impl<B: Backend> SentenceEncoder<B> {
    /// token_ids, attention_mask: [batch, seq_len] → [batch, embed_width]
    ///
    /// The returned features are detached; treat them as inputs,
    /// not as part of the trainable graph.
    pub fn forward(
        &self,
        token_ids:      Tensor<B, 2, Int>,
        attention_mask: Tensor<B, 2, Int>,
    ) -> Tensor<B, 2> {
        let [batch_size, seq_len] = token_ids.dims();

        let tok_emb = self.token_embedding.forward(token_ids); // [batch, seq, width]
        let [_, _, width] = tok_emb.dims();

        let mask = attention_mask.float(); // [batch, seq]

        // Masked sum via batched matmul: [batch, 1, seq] x
        // [batch, seq, width] → [batch, 1, width]. Padded
        // positions carry mask 0 and contribute nothing.
        let summed = mask.clone()
            .reshape([batch_size, 1, seq_len])
            .matmul(tok_emb)
            .reshape([batch_size, width]);

        // Mean over the real tokens. clamp_min keeps an all-pad
        // row (empty input) from dividing by zero; it pools to
        // the zero vector instead.
        let counts = mask.sum_dim(1).clamp_min(1.0); // [batch, 1]
        let mean   = summed / counts;

        // Unit length, so feature scale is independent of how
        // many tokens the utterance had
        let norms = (mean.clone() * mean.clone())
            .sum_dim(1)
            .sqrt()
            .clamp_min(1e-12); // [batch, 1]

        (mean / norms).detach()
    }
}
