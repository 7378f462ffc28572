// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores the trained model using Burn's
// CompactRecorder, together with everything the chat session
// needs to rebuild the predictor without retraining.
//
// What gets saved per training run:
//   1. model.mpk.gz       — frozen encoder + trained head
//   2. model_config.json  — architecture (widths, classes)
//   3. train_config.json  — training hyperparameters, incl.
//                           max_seq_len used for encoding
//   4. labels.json        — fitted class list, in id order
//
// Why save the configs separately?
//   When loading for inference, we need the exact architecture
//   to rebuild the model before loading the weights into it,
//   and the exact max_seq_len so a query is encoded the same
//   way training rows were.
//
// Burn's CompactRecorder:
//   - Serialises model parameters to MessagePack format
//   - Compresses with gzip for smaller file size
//   - Type-safe: loading fails if architecture doesn't match
//
// Reference: Burn Book §5 (Records and Checkpointing)
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};
use burn::{
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkGzFileRecorder, Recorder},
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::{IntentClassifier, IntentClassifierConfig};

/// Manages saving and loading of model checkpoints.
/// All files are stored in the configured directory.
pub struct CheckpointManager {
    /// Path to the directory where checkpoints are stored
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a new CheckpointManager.
    /// Creates the directory if it doesn't already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        // create_dir_all creates parent directories too, like `mkdir -p`
        // .ok() ignores the error if the directory already exists
        fs::create_dir_all(&dir).ok();
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save the model weights.
    ///
    /// Uses Burn's CompactRecorder which:
    ///   1. Calls model.into_record() to extract all parameters
    ///   2. Serialises to MessagePack binary format
    ///   3. Compresses with gzip
    ///   4. Writes to {dir}/model.mpk.gz
    pub fn save_model<B: AutodiffBackend>(&self, model: &IntentClassifier<B>) -> Result<()> {
        // Build the file path (without extension — recorder adds it)
        let path = self.dir.join("model");

        NamedMpkGzFileRecorder::<FullPrecisionSettings>::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| {
                format!("Failed to save checkpoint to '{}'", path.display())
            })?;

        tracing::debug!("Saved model checkpoint to '{}'", path.display());
        Ok(())
    }

    /// Load model weights into a freshly initialised model.
    ///
    /// The model parameter must have the correct architecture
    /// (matching the saved checkpoint) or loading will fail.
    pub fn load_model<B: Backend>(
        &self,
        model:  IntentClassifier<B>,
        device: &B::Device,
    ) -> Result<IntentClassifier<B>> {
        let path = self.dir.join("model");

        let record = NamedMpkGzFileRecorder::<FullPrecisionSettings>::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load checkpoint '{}'. Have you trained the model first?",
                    path.display())
            })?;

        // load_record() returns a new model with the loaded weights
        Ok(model.load_record(record))
    }

    /// Save the training configuration to JSON.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        self.write_json("train_config.json", cfg)
    }

    /// Load the training configuration from JSON.
    ///
    /// Called by the Predictor to recover max_seq_len, so a
    /// query is encoded exactly like the training rows were.
    pub fn load_config(&self) -> Result<TrainConfig> {
        self.read_json("train_config.json", "train")
    }

    /// Save the model architecture to JSON.
    pub fn save_model_config(&self, cfg: &IntentClassifierConfig) -> Result<()> {
        self.write_json("model_config.json", cfg)
    }

    /// Load the model architecture from JSON.
    pub fn load_model_config(&self) -> Result<IntentClassifierConfig> {
        self.read_json("model_config.json", "train")
    }

    /// Save the fitted class list, in id order.
    pub fn save_labels(&self, classes: &[String]) -> Result<()> {
        self.write_json("labels.json", &classes.to_vec())
    }

    /// Load the fitted class list saved at training time.
    pub fn load_labels(&self) -> Result<Vec<String>> {
        self.read_json("labels.json", "train")
    }

    fn write_json<T: serde::Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let path = self.dir.join(name);

        // to_string_pretty adds indentation for readability
        let json = serde_json::to_string_pretty(value)?;

        fs::write(&path, json)
            .with_context(|| format!("Cannot write '{}'", path.display()))?;

        tracing::debug!("Saved '{}'", path.display());
        Ok(())
    }

    fn read_json<T: serde::de::DeserializeOwned>(&self, name: &str, needed_by: &str) -> Result<T> {
        let path = self.dir.join(name);

        let json = fs::read_to_string(&path)
            .with_context(|| {
                format!(
                    "Cannot read '{}'. Make sure you have run '{}' first.",
                    path.display(),
                    needed_by,
                )
            })?;

        Ok(serde_json::from_str(&json)?)
    }
}
