// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load the intent corpus      (Layer 4 - data)
//   Step 2: Log the class distribution  (Layer 2)
//   Step 3: Clean every utterance       (Layer 4 - data)
//   Step 4: Fit labels + class weights  (Layer 4 - data)
//   Step 5: Build / load tokenizer      (Layer 6 - infra)
//   Step 6: Encode fixed-width samples  (Layer 4 - data)
//   Step 7: Save checkpoint artifacts   (Layer 6 - infra)
//   Step 8: Run training loop           (Layer 5 - ml)
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §5 (Training)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::data::{
    corpus::CsvCorpusStore,
    dataset::{encode_fixed, IntentDataset, IntentSample},
    labels::LabelEncoder,
    normalizer::Normalizer,
};
use crate::domain::record::CorpusRecord;
use crate::infra::{
    checkpoint::CheckpointManager,
    tokenizer_store::TokenizerStore,
};
use crate::ml::{model::IntentClassifierConfig, trainer::run_training};

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run.
// Serialisable so it can be saved to disk and reloaded for inference.
// The #[derive(Serialize, Deserialize)] macros from serde handle
// reading/writing this struct to JSON automatically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub corpus_path:    String,
    pub checkpoint_dir: String,
    pub max_seq_len:    usize,
    pub batch_size:     usize,
    pub epochs:         usize,
    pub lr:             f64,
    pub embed_width:    usize,
    pub hidden_1:       usize,
    pub hidden_2:       usize,
    pub dropout:        f64,
    pub grad_clip:      f32,
    pub vocab_size:     usize,
    pub seed:           u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            corpus_path:    "data/corpus.csv".to_string(),
            checkpoint_dir: "checkpoints".to_string(),
            max_seq_len:    8,
            batch_size:     16,
            epochs:         200,
            lr:             1e-3,
            embed_width:    768,
            hidden_1:       512,
            hidden_2:       256,
            dropout:        0.2,
            grad_clip:      1.0,
            vocab_size:     30522,
            seed:           42,
        }
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
// Owns the config and runs the full training pipeline.
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    /// Create a new TrainUseCase with the given configuration
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<()> {
        let cfg = &self.config;

        // ── Step 1: Load the labelled corpus ──────────────────────────────────
        tracing::info!("Loading corpus from '{}'", cfg.corpus_path);
        let store   = CsvCorpusStore::new(&cfg.corpus_path);
        let records = store.load()?;
        if records.is_empty() {
            anyhow::bail!(
                "Corpus '{}' has no rows. Add `text,label` rows before training.",
                cfg.corpus_path
            );
        }
        tracing::info!("Loaded {} utterances", records.len());

        // ── Step 2: Log the class distribution ────────────────────────────────
        let distribution = label_distribution(&records);
        tracing::info!("Class distribution across {} intents:", distribution.len());
        for (label, n, share) in &distribution {
            tracing::info!("  {:<16} {:>5} rows  {:>5.1}%", label, n, share * 100.0);
        }

        // ── Step 3: Clean every utterance ─────────────────────────────────────
        // Stopword removal and punctuation stripping; the tokenizer
        // vocabulary is built from these cleaned strings, so the
        // model never sees a stopword
        let normalizer = Normalizer::new();
        let cleaned: Vec<String> = records
            .iter()
            .map(|r| normalizer.clean_for_training(&r.text))
            .collect();

        // ── Step 4: Fit the label encoder and class weights ───────────────────
        // Classes are fitted sorted, so the tag→id mapping is the
        // same on every run over the same corpus
        let raw_labels: Vec<&str> = records.iter().map(|r| r.label.as_str()).collect();
        let labels    = LabelEncoder::fit(&raw_labels);
        let label_ids = records
            .iter()
            .map(|r| labels.encode(&r.label))
            .collect::<Result<Vec<_>, _>>()?;

        // Balanced weights: under-represented intents contribute
        // proportionally more to the loss
        let class_weights = labels.class_weights(&label_ids);
        tracing::debug!("Class weights: {:?}", class_weights);

        // ── Step 5: Build tokenizer ───────────────────────────────────────────
        // Rebuilt from the current cleaned corpus on every run, so
        // a retrain picks up the words feedback rows have added
        // since the last one
        let tok_store = TokenizerStore::new(&cfg.checkpoint_dir);
        let tokenizer = tok_store.rebuild(&cleaned, cfg.vocab_size)?;

        // The embedding table is sized to the vocabulary that was
        // actually built, not the configured cap
        let vocab_size = tokenizer.get_vocab_size(true);
        tracing::info!("Tokenizer ready ({} entries)", vocab_size);

        // ── Step 6: Encode fixed-width samples ────────────────────────────────
        // Every utterance becomes (token_ids, attention_mask, label_id)
        // rows of exactly max_seq_len positions
        let mut samples = Vec::with_capacity(records.len());
        for (text, &label_id) in cleaned.iter().zip(label_ids.iter()) {
            let (token_ids, attention_mask) = encode_fixed(&tokenizer, text, cfg.max_seq_len)
                .with_context(|| format!("Cannot encode corpus row '{text}'"))?;
            samples.push(IntentSample { token_ids, attention_mask, label_id });
        }
        tracing::info!("Built {} training samples", samples.len());
        let dataset = IntentDataset::new(samples);

        // ── Step 7: Save checkpoint artifacts for inference ───────────────────
        // The predictor needs the architecture, the training config
        // (for max_seq_len) and the class list to rebuild itself
        let model_cfg = IntentClassifierConfig::new(vocab_size, labels.num_classes())
            .with_embed_width(cfg.embed_width)
            .with_hidden_1(cfg.hidden_1)
            .with_hidden_2(cfg.hidden_2)
            .with_dropout(cfg.dropout);

        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir);
        ckpt_manager.save_config(cfg)?;
        ckpt_manager.save_model_config(&model_cfg)?;
        ckpt_manager.save_labels(labels.classes())?;

        // ── Step 8: Run training loop (Layer 5) ───────────────────────────────
        run_training(cfg, &model_cfg, dataset, class_weights, ckpt_manager)?;

        Ok(())
    }
}

/// Per-class row count and share of the corpus, in tag order.
/// The BTreeMap keeps the report stable across runs.
fn label_distribution(records: &[CorpusRecord]) -> Vec<(String, usize, f64)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records {
        *counts.entry(record.label.as_str()).or_insert(0) += 1;
    }

    let total = records.len() as f64;
    counts
        .into_iter()
        .map(|(label, n)| (label.to_string(), n, n as f64 / total))
        .collect()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::tokenizer_store::UNK_ID;
    use crate::ml::predictor::Predictor;
    use tempfile::tempdir;

    fn seed_corpus(store: &CsvCorpusStore) {
        let rows = [
            ("hello", "greeting"),
            ("hi there", "greeting"),
            ("hey hello", "greeting"),
            ("good morning", "greeting"),
            ("bye", "farewell"),
            ("goodbye friend", "farewell"),
            ("see you later", "farewell"),
            ("farewell my friend", "farewell"),
            ("thank you", "thanks"),
            ("thanks a lot", "thanks"),
            ("many thanks", "thanks"),
            ("much appreciated", "thanks"),
        ];
        for (text, label) in rows {
            store.append(&CorpusRecord::new(text, label)).unwrap();
        }
    }

    #[test]
    fn test_training_on_an_empty_corpus_fails_with_a_diagnostic() {
        let dir  = tempdir().unwrap();
        let path = dir.path().join("corpus.csv");
        std::fs::write(&path, "text,label\n").unwrap();

        let cfg = TrainConfig {
            corpus_path:    path.display().to_string(),
            checkpoint_dir: dir.path().join("ckpt").display().to_string(),
            ..TrainConfig::default()
        };

        let err = TrainUseCase::new(cfg).execute().unwrap_err();
        assert!(err.to_string().contains("no rows"));
    }

    #[test]
    fn test_label_distribution_reports_counts_and_shares() {
        let records = vec![
            CorpusRecord::new("hi", "greeting"),
            CorpusRecord::new("hello", "greeting"),
            CorpusRecord::new("bye", "farewell"),
            CorpusRecord::new("thanks", "thanks"),
        ];

        let dist = label_distribution(&records);
        assert_eq!(dist.len(), 3);
        assert_eq!(dist[0], ("farewell".to_string(), 1, 0.25));
        assert_eq!(dist[1], ("greeting".to_string(), 2, 0.5));
    }

    /// A retrain into the same checkpoint dir must rebuild the
    /// vocabulary from the grown corpus; words contributed by
    /// feedback rows must not collapse to [UNK].
    #[test]
    fn test_retrain_rebuilds_the_vocabulary_from_the_grown_corpus() {
        let dir         = tempdir().unwrap();
        let corpus_path = dir.path().join("corpus.csv");
        let ckpt_dir    = dir.path().join("ckpt");

        let store = CsvCorpusStore::new(&corpus_path);
        seed_corpus(&store);

        let cfg = TrainConfig {
            corpus_path:    corpus_path.display().to_string(),
            checkpoint_dir: ckpt_dir.display().to_string(),
            batch_size:     4,
            epochs:         2,
            embed_width:    16,
            hidden_1:       16,
            hidden_2:       8,
            ..TrainConfig::default()
        };
        TrainUseCase::new(cfg.clone()).execute().unwrap();

        // The feedback loop adds a row with a word the first
        // vocabulary never saw
        store.append(&CorpusRecord::new("howdy partner", "greeting")).unwrap();
        TrainUseCase::new(cfg).execute().unwrap();

        let tokenizer = TokenizerStore::new(ckpt_dir.display().to_string()).load().unwrap();
        let enc = tokenizer.encode("howdy", false).unwrap();
        assert_ne!(enc.get_ids(), &[UNK_ID]);
    }

    /// Full pipeline: corpus on disk, training run, checkpoint
    /// reload, live prediction. Small widths keep this fast on
    /// the CPU backend.
    #[test]
    fn test_end_to_end_training_then_prediction() {
        let dir         = tempdir().unwrap();
        let corpus_path = dir.path().join("corpus.csv");
        let ckpt_dir    = dir.path().join("ckpt");

        let store = CsvCorpusStore::new(&corpus_path);
        seed_corpus(&store);

        let cfg = TrainConfig {
            corpus_path:    corpus_path.display().to_string(),
            checkpoint_dir: ckpt_dir.display().to_string(),
            batch_size:     4,
            epochs:         150,
            embed_width:    16,
            hidden_1:       16,
            hidden_2:       8,
            ..TrainConfig::default()
        };
        TrainUseCase::new(cfg).execute().unwrap();

        // Every artifact the predictor needs is in place
        for artifact in ["model.mpk.gz", "train_config.json", "model_config.json",
                         "labels.json", "tokenizer.json", "metrics.csv"] {
            assert!(ckpt_dir.join(artifact).exists(), "missing {artifact}");
        }

        let predictor = Predictor::from_checkpoint(
            &CheckpointManager::new(ckpt_dir.display().to_string()),
        ).unwrap();

        // "there" is a stopword, so this reduces to the training
        // row "hello"
        assert_eq!(predictor.predict("hello there").unwrap(), "greeting");
        assert_eq!(predictor.predict("bye!").unwrap(), "farewell");
        assert_eq!(predictor.predict("many thanks").unwrap(), "thanks");
    }
}
