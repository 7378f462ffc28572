// ============================================================
// Layer 4 — Intent Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec<IntentSample>
// into tensors the model consumes.
//
// What is a Batcher?
//   A Batcher takes a list of individual samples and stacks
//   them into a single batch tensor, so one forward pass covers
//   many samples at once.
//
// How batching works here:
//   Input:  Vec of N IntentSamples, each with sequences of length S
//   Output: IntentBatch with [N, S] id/mask tensors and an [N]
//           label tensor
//
//   We flatten all token_ids into one long Vec, then reshape:
//   [s1_t1, s1_t2, ..., s1_tS, s2_t1, ..., sN_tS] → [N, S]
//
// Why is this easy here?
//   Because all sequences are already padded to the same length
//   by encode_fixed. If they weren't, we'd need dynamic padding.
//
// Reference: Burn Book §4 (Batcher)
//            Rust Book §8 (Vectors)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::IntentSample;

// ─── IntentBatch ──────────────────────────────────────────────────────────────
/// A batch of samples ready for the model forward pass.
/// All tensors have batch_size as their first dimension.
///
/// B is the Burn Backend (e.g. NdArray, Autodiff<NdArray>) —
/// generic so the same batcher serves training and inference.
#[derive(Debug, Clone)]
pub struct IntentBatch<B: Backend> {
    /// Token ID sequences — shape: [batch_size, seq_len]
    pub token_ids: Tensor<B, 2, Int>,

    /// Attention masks — shape: [batch_size, seq_len]
    /// 1 = real token, 0 = padding
    pub attention_mask: Tensor<B, 2, Int>,

    /// Ground truth class ids — shape: [batch_size]
    pub labels: Tensor<B, 1, Int>,
}

// ─── IntentBatcher ────────────────────────────────────────────────────────────
/// The batcher struct — holds the target device so tensors
/// are created in the right place.
#[derive(Clone, Debug)]
pub struct IntentBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> IntentBatcher<B> {
    /// Create a new batcher for the given device
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

// ─── Burn Batcher Trait Implementation ────────────────────────────────────────
// This is what makes IntentBatcher work with Burn's DataLoader.
// The DataLoader calls .batch(items) with each mini-batch.
impl<B: Backend> Batcher<IntentSample, IntentBatch<B>> for IntentBatcher<B> {
    fn batch(&self, items: Vec<IntentSample>) -> IntentBatch<B> {
        let batch_size = items.len();
        // All sequences have the same length (pre-padded); an
        // empty batch stacks to empty tensors
        let seq_len    = items.first().map_or(0, |s| s.token_ids.len());

        // Vec<Vec<u32>> → Vec<i32>, samples in order (Burn takes
        // i32 slices for Int tensors)
        let ids_flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.token_ids.iter().map(|&x| x as i32))
            .collect();

        let mask_flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.attention_mask.iter().map(|&x| x as i32))
            .collect();

        let labels_flat: Vec<i32> = items
            .iter()
            .map(|s| s.label_id as i32)
            .collect();

        let token_ids = Tensor::<B, 1, Int>::from_ints(
            ids_flat.as_slice(), &self.device
        ).reshape([batch_size, seq_len]);

        let attention_mask = Tensor::<B, 1, Int>::from_ints(
            mask_flat.as_slice(), &self.device
        ).reshape([batch_size, seq_len]);

        // Class ids stay as a 1D tensor [batch_size]
        let labels = Tensor::<B, 1, Int>::from_ints(
            labels_flat.as_slice(), &self.device
        );

        IntentBatch {
            token_ids,
            attention_mask,
            labels,
        }
    }
}
