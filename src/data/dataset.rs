use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokenizers::Tokenizer;

use crate::infra::tokenizer_store::PAD_ID;

#[derive(Debug, Error)]
pub enum EncodeError {
    /// The tokenizer refused the input text.
    #[error("tokenisation failed: {0}")]
    Tokenize(String),
}

/// Encode text to exactly `max_len` token ids plus a matching
/// 0/1 attention mask: truncate past the limit, pad below it.
/// Both the trainer and the predictor go through here, so an
/// utterance is encoded identically at training and serving time.
/// Empty text encodes to all padding with an all-zero mask.
pub fn encode_fixed(
    tokenizer: &Tokenizer,
    text:      &str,
    max_len:   usize,
) -> Result<(Vec<u32>, Vec<u32>), EncodeError> {
    let encoding = tokenizer
        .encode(text, false)
        .map_err(|e| EncodeError::Tokenize(e.to_string()))?;

    let mut ids: Vec<u32> = encoding.get_ids().to_vec();
    ids.truncate(max_len);

    let mut mask = vec![1u32; ids.len()];
    while ids.len() < max_len {
        ids.push(PAD_ID);
        mask.push(0);
    }

    Ok((ids, mask))
}

/// One fully tokenised and padded training sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentSample {
    pub token_ids:      Vec<u32>,
    pub attention_mask: Vec<u32>,
    pub label_id:       usize,
}

pub struct IntentDataset {
    samples: Vec<IntentSample>,
}

impl IntentDataset {
    pub fn new(samples: Vec<IntentSample>) -> Self { Self { samples } }

    pub fn sample_count(&self) -> usize { self.samples.len() }
}

impl Dataset<IntentSample> for IntentDataset {
    fn get(&self, index: usize) -> Option<IntentSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::tokenizer_store::TokenizerStore;
    use tempfile::tempdir;

    fn test_tokenizer() -> Tokenizer {
        let dir   = tempdir().unwrap();
        let texts = vec![
            "hello there friend".to_string(),
            "goodbye friend see you".to_string(),
        ];
        TokenizerStore::new(dir.path()).rebuild(&texts, 100).unwrap()
    }

    #[test]
    fn test_short_text_is_padded_to_max_len() {
        let tokenizer   = test_tokenizer();
        let (ids, mask) = encode_fixed(&tokenizer, "hello friend", 8).unwrap();

        assert_eq!(ids.len(), 8);
        assert_eq!(mask.len(), 8);
        assert_eq!(&mask[..2], &[1, 1]);
        assert_eq!(&mask[2..], &[0; 6]);
        assert!(ids[2..].iter().all(|&id| id == PAD_ID));
    }

    #[test]
    fn test_long_text_is_truncated_to_max_len() {
        let tokenizer   = test_tokenizer();
        let long        = "hello there friend goodbye see you hello there friend";
        let (ids, mask) = encode_fixed(&tokenizer, long, 4).unwrap();

        assert_eq!(ids.len(), 4);
        assert_eq!(mask, vec![1, 1, 1, 1]);
    }

    #[test]
    fn test_empty_text_encodes_to_all_padding() {
        let tokenizer   = test_tokenizer();
        let (ids, mask) = encode_fixed(&tokenizer, "", 8).unwrap();

        assert_eq!(ids, vec![PAD_ID; 8]);
        assert_eq!(mask, vec![0; 8]);
    }

    #[test]
    fn test_dataset_get_and_len() {
        let sample = IntentSample {
            token_ids:      vec![5, 6, 0, 0],
            attention_mask: vec![1, 1, 0, 0],
            label_id:       1,
        };
        let dataset = IntentDataset::new(vec![sample.clone()]);

        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.get(0), Some(sample));
        assert_eq!(dataset.get(1), None);
    }
}
