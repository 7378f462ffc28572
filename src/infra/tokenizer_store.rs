// ============================================================
// Layer 6 — Tokenizer Store
// ============================================================
// Manages tokenizer building, saving, and loading. Training
// rebuilds the vocabulary from the cleaned corpus on every run
// (the corpus grows between runs via feedback rows); inference
// loads the file the training run saved.
//
// In tokenizers 0.15, train_from_files requires Trainer::Model
// to equal ModelWrapper. The correct approach is to build the
// tokenizer JSON manually and load it, bypassing the trainer
// type mismatch entirely. A word-level vocabulary is all an
// intent corpus needs: utterances are short and the cleanup
// pass has already stripped punctuation.
//
// Vocabulary layout:
//   [PAD] = 0, [UNK] = 1, then corpus words by descending
//   frequency (ties broken alphabetically, so the same corpus
//   always produces the same vocabulary).

use anyhow::{Context, Result};
use std::path::PathBuf;
use tokenizers::Tokenizer;

/// Id the padding token always gets; sequence padding and
/// attention masks rely on it.
pub const PAD_ID: u32 = 0;

/// Id for out-of-vocabulary words.
pub const UNK_ID: u32 = 1;

/// Slots reserved before corpus words: [PAD] and [UNK].
const RESERVED_TOKENS: usize = 2;

pub struct TokenizerStore {
    dir: PathBuf,
}

impl TokenizerStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Build the vocabulary from the current corpus texts and
    /// save it, replacing whatever a previous run left behind.
    /// A retrain must see the words feedback rows added since
    /// the last run; reusing the old file would collapse every
    /// new word to [UNK].
    pub fn rebuild(&self, texts: &[String], vocab_size: usize) -> Result<Tokenizer> {
        tracing::info!("Building tokenizer vocabulary (cap {})", vocab_size);
        self.build_and_save(texts, vocab_size)
    }

    /// Load a previously saved tokenizer from JSON file
    pub fn load(&self) -> Result<Tokenizer> {
        let path = self.dir.join("tokenizer.json");
        Tokenizer::from_file(&path)
            .map_err(|e| anyhow::anyhow!(
                "Cannot load tokenizer from '{}': {}", path.display(), e
            ))
    }

    /// Build a word-level vocabulary from the cleaned corpus
    /// texts and write a valid tokenizer JSON directly.
    fn build_and_save(&self, texts: &[String], vocab_size: usize) -> Result<Tokenizer> {
        std::fs::create_dir_all(&self.dir).ok();

        // ── Step 1: Build vocabulary from word frequencies ────────────────────
        use std::collections::HashMap;
        let mut freq: HashMap<String, usize> = HashMap::new();

        for text in texts {
            for word in text.split_whitespace() {
                // Lowercase to match the BertNormalizer applied
                // at encode time
                let w = word.to_lowercase();
                let w = w.trim_matches(|c: char| !c.is_alphanumeric());
                if !w.is_empty() {
                    *freq.entry(w.to_string()).or_insert(0) += 1;
                }
            }
        }

        // Frequency descending, alphabetical on ties, capped at
        // vocab_size minus the reserved slots
        let mut words: Vec<(String, usize)> = freq.into_iter().collect();
        words.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        words.truncate(vocab_size.saturating_sub(RESERVED_TOKENS));

        // ── Step 2: Build vocab JSON ──────────────────────────────────────────
        let mut vocab = serde_json::json!({
            "[PAD]": PAD_ID,
            "[UNK]": UNK_ID,
        });

        let mut next_id = RESERVED_TOKENS;
        for (word, _) in &words {
            vocab[word.as_str()] = serde_json::json!(next_id);
            next_id += 1;
        }

        // ── Step 3: Write tokenizer JSON in HuggingFace format ────────────────
        // This format is what Tokenizer::from_file() expects
        let tokenizer_json = serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": [
                {"id": PAD_ID, "content": "[PAD]", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
                {"id": UNK_ID, "content": "[UNK]", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true}
            ],
            "normalizer": {
                "type": "BertNormalizer",
                "clean_text": true,
                "handle_chinese_chars": true,
                "strip_accents": null,
                "lowercase": true
            },
            "pre_tokenizer": {
                "type": "Whitespace"
            },
            "post_processor": null,
            "decoder": null,
            "model": {
                "type": "WordLevel",
                "vocab": vocab,
                "unk_token": "[UNK]"
            }
        });

        let tok_path = self.dir.join("tokenizer.json");
        std::fs::write(
            &tok_path,
            serde_json::to_string_pretty(&tokenizer_json)?
        ).with_context(|| "Cannot write tokenizer JSON")?;

        tracing::info!(
            "Tokenizer built with {} entries, saved to '{}'",
            next_id,
            tok_path.display()
        );

        // Load back as a proper Tokenizer instance
        Tokenizer::from_file(&tok_path)
            .map_err(|e| anyhow::anyhow!("Cannot reload tokenizer: {e}"))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_texts() -> Vec<String> {
        vec![
            "hello friend".to_string(),
            "hello again".to_string(),
            "goodbye friend".to_string(),
        ]
    }

    #[test]
    fn test_known_words_get_stable_ids() {
        let dir       = tempdir().unwrap();
        let store     = TokenizerStore::new(dir.path());
        let tokenizer = store.rebuild(&sample_texts(), 100).unwrap();

        // "hello" and "friend" both occur twice, alphabetical
        // tie-break puts "friend" first
        let enc = tokenizer.encode("friend hello", false).unwrap();
        assert_eq!(enc.get_ids(), &[RESERVED_TOKENS as u32, RESERVED_TOKENS as u32 + 1]);
    }

    #[test]
    fn test_unknown_word_maps_to_unk() {
        let dir       = tempdir().unwrap();
        let store     = TokenizerStore::new(dir.path());
        let tokenizer = store.rebuild(&sample_texts(), 100).unwrap();

        let enc = tokenizer.encode("zebra", false).unwrap();
        assert_eq!(enc.get_ids(), &[UNK_ID]);
    }

    #[test]
    fn test_rebuild_replaces_the_saved_vocabulary() {
        let dir   = tempdir().unwrap();
        let store = TokenizerStore::new(dir.path());

        store.rebuild(&sample_texts(), 100).unwrap();

        // A later run whose corpus gained a word must not see it
        // collapse to [UNK]
        let mut texts = sample_texts();
        texts.push("zebra crossing".to_string());
        store.rebuild(&texts, 100).unwrap();

        let reloaded = store.load().unwrap();
        let enc = reloaded.encode("zebra", false).unwrap();
        assert_ne!(enc.get_ids(), &[UNK_ID]);
    }
}
