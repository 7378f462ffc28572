// ============================================================
// Layer 5 — Predictor
// ============================================================
use anyhow::Result;
use burn::prelude::*;
use tokenizers::Tokenizer;

use crate::data::dataset::encode_fixed;
use crate::data::labels::LabelEncoder;
use crate::data::normalizer::Normalizer;
use crate::domain::traits::IntentResolver;
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::tokenizer_store::TokenizerStore;
use crate::ml::model::IntentClassifier;

// Inference runs on the plain backend: no gradient tape, and
// dropout layers pass activations through unchanged, so the
// same query always maps to the same intent.
type InferBackend = burn::backend::NdArray;

pub struct Predictor {
    model:       IntentClassifier<InferBackend>,
    tokenizer:   Tokenizer,
    labels:      LabelEncoder,
    normalizer:  Normalizer,
    max_seq_len: usize,
    device:      burn::backend::ndarray::NdArrayDevice,
}

impl Predictor {
    /// Rebuild the full inference pipeline from a training run's
    /// checkpoint directory: architecture, weights, class list
    /// and tokenizer.
    pub fn from_checkpoint(ckpt_manager: &CheckpointManager) -> Result<Self> {
        let device = burn::backend::ndarray::NdArrayDevice::default();

        let train_cfg = ckpt_manager.load_config()?;
        let model_cfg = ckpt_manager.load_model_config()?;
        let labels    = LabelEncoder::from_classes(ckpt_manager.load_labels()?);
        let tokenizer = TokenizerStore::new(ckpt_manager.dir()).load()?;

        let model: IntentClassifier<InferBackend> = model_cfg.init(&device);
        let model = ckpt_manager.load_model(model, &device)?;
        tracing::info!(
            "Model loaded from checkpoint ({} classes, vocab_size={})",
            labels.num_classes(),
            model_cfg.vocab_size,
        );

        Ok(Self {
            model,
            tokenizer,
            labels,
            normalizer: Normalizer::new(),
            max_seq_len: train_cfg.max_seq_len,
            device,
        })
    }

    /// Classify one query into an intent tag.
    ///
    /// The query goes through the same pipeline a training row
    /// did, with the stricter inference cleanup in front:
    /// strip to letters, drop stopwords, encode to a fixed-width
    /// id row, forward pass, argmax.
    pub fn predict(&self, query: &str) -> Result<String> {
        let cleaned = self.normalizer.clean_for_inference(query);

        let (ids, mask) = encode_fixed(&self.tokenizer, &cleaned, self.max_seq_len)?;

        let ids_flat:  Vec<i32> = ids.iter().map(|&x| x as i32).collect();
        let mask_flat: Vec<i32> = mask.iter().map(|&x| x as i32).collect();

        let ids_tensor = Tensor::<InferBackend, 1, Int>::from_ints(
            ids_flat.as_slice(), &self.device,
        ).unsqueeze::<2>();
        let mask_tensor = Tensor::<InferBackend, 1, Int>::from_ints(
            mask_flat.as_slice(), &self.device,
        ).unsqueeze::<2>();

        // [1, num_classes] log-distribution over intents
        let log_probs = self.model.forward(ids_tensor, mask_tensor);

        let class_id   = log_probs.clone().argmax(1).into_scalar().elem::<i64>() as usize;
        let confidence = log_probs.exp().max_dim(1).into_scalar().elem::<f32>();

        let intent = self.labels.decode(class_id)?.to_string();
        tracing::debug!("query='{}' intent='{}' p={:.3}", cleaned, intent, confidence);

        Ok(intent)
    }
}

impl IntentResolver for Predictor {
    fn resolve(&self, query: &str) -> Result<String> {
        self.predict(query)
    }
}
