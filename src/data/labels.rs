// ============================================================
// Layer 4 — Label Encoder
// ============================================================
// Maps intent tags ("greeting", "farewell", ...) to dense class
// ids [0, num_classes) and back. The model trains and predicts
// over the ids; everything user-facing speaks tags.
//
// Ids are assigned in lexicographic tag order, so fitting the
// same tag set always reproduces the same mapping and a saved
// class list reloads to an identical encoder.
//
// Fitting twice over different corpora silently changes the
// mapping and makes any head trained against the old ids decode
// nonsense. Fit once, persist the class list with the model,
// reload from that list at inference time.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LabelError {
    /// A label was never seen when the encoder was fitted.
    #[error("unknown label '{0}' not present in the fitted label set")]
    UnknownLabel(String),

    /// A class id outside [0, num_classes) was asked to decode.
    #[error("class id {id} out of range for {num_classes} classes")]
    InvalidId { id: usize, num_classes: usize },
}

/// Bijective tag ↔ id mapping, fixed at fit time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Fit over the labels observed in the training corpus.
    /// Duplicates collapse; ids follow sorted tag order.
    pub fn fit<S: AsRef<str>>(labels: &[S]) -> Self {
        let mut classes: Vec<String> = labels.iter().map(|l| l.as_ref().to_string()).collect();
        classes.sort();
        classes.dedup();
        Self { classes }
    }

    /// Rebuild an encoder from a persisted class list. The list
    /// must be the one saved at fit time, in its saved order.
    pub fn from_classes(classes: Vec<String>) -> Self {
        Self { classes }
    }

    pub fn encode(&self, label: &str) -> Result<usize, LabelError> {
        self.classes
            .iter()
            .position(|c| c == label)
            .ok_or_else(|| LabelError::UnknownLabel(label.to_string()))
    }

    pub fn decode(&self, id: usize) -> Result<&str, LabelError> {
        self.classes
            .get(id)
            .map(|c| c.as_str())
            .ok_or(LabelError::InvalidId {
                id,
                num_classes: self.classes.len(),
            })
    }

    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Balanced class weights over the encoded training labels:
    ///
    ///   weight[c] = n_samples / (num_classes * count[c])
    ///
    /// Rare classes get proportionally larger weights so they pull
    /// on the loss as hard as common ones. Every fitted class is
    /// expected to appear at least once in `label_ids` (true by
    /// construction when the ids come from the same corpus the
    /// encoder was fitted on).
    pub fn class_weights(&self, label_ids: &[usize]) -> Vec<f32> {
        let num_classes = self.classes.len();
        let mut counts  = vec![0usize; num_classes];

        for &id in label_ids {
            if id < num_classes {
                counts[id] += 1;
            }
        }

        let n_samples = label_ids.len() as f32;
        counts
            .iter()
            .map(|&c| n_samples / (num_classes as f32 * c.max(1) as f32))
            .collect()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn fitted() -> LabelEncoder {
        LabelEncoder::fit(&["greeting", "farewell", "thanks", "greeting", "farewell"])
    }

    #[test]
    fn test_ids_follow_sorted_tag_order() {
        let enc = fitted();
        assert_eq!(enc.classes(), &["farewell", "greeting", "thanks"]);
        assert_eq!(enc.encode("farewell").unwrap(), 0);
        assert_eq!(enc.encode("greeting").unwrap(), 1);
        assert_eq!(enc.encode("thanks").unwrap(), 2);
    }

    #[test]
    fn test_round_trip_every_fitted_label() {
        let enc = fitted();
        for tag in ["greeting", "farewell", "thanks"] {
            let id = enc.encode(tag).unwrap();
            assert_eq!(enc.decode(id).unwrap(), tag);
        }
    }

    #[test]
    fn test_unknown_label_is_an_error() {
        let enc = fitted();
        assert_eq!(
            enc.encode("smalltalk"),
            Err(LabelError::UnknownLabel("smalltalk".to_string()))
        );
    }

    #[test]
    fn test_out_of_range_id_is_an_error() {
        let enc = fitted();
        assert_eq!(
            enc.decode(3),
            Err(LabelError::InvalidId { id: 3, num_classes: 3 })
        );
    }

    #[test]
    fn test_refit_from_saved_classes_matches() {
        let enc      = fitted();
        let reloaded = LabelEncoder::from_classes(enc.classes().to_vec());
        assert_eq!(reloaded.encode("thanks").unwrap(), enc.encode("thanks").unwrap());
    }

    #[test]
    fn test_class_weights_shape_and_positivity() {
        let enc = fitted();
        // 4 samples: two of class 1, one each of classes 0 and 2
        let ids     = vec![1, 1, 0, 2];
        let weights = enc.class_weights(&ids);

        assert_eq!(weights.len(), enc.num_classes());
        assert!(weights.iter().all(|&w| w > 0.0));
    }

    #[test]
    fn test_rarer_class_weighs_more() {
        let enc     = fitted();
        let ids     = vec![1, 1, 1, 0, 2, 2];
        let weights = enc.class_weights(&ids);

        // class 0 (1 sample) > class 2 (2 samples) > class 1 (3 samples)
        assert!(weights[0] > weights[2]);
        assert!(weights[2] > weights[1]);
    }

    #[test]
    fn test_balanced_weight_values() {
        let enc     = LabelEncoder::fit(&["a", "b"]);
        let weights = enc.class_weights(&[0, 0, 0, 1]);

        // n / (k * count): 4 / (2 * 3) and 4 / (2 * 1)
        assert!((weights[0] - 4.0 / 6.0).abs() < 1e-6);
        assert!((weights[1] - 2.0).abs() < 1e-6);
    }
}
