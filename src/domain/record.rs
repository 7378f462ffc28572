// ============================================================
// Layer 3 — Corpus Record Domain Type
// ============================================================
// Represents one labelled utterance from the training corpus.
// This is a plain data struct with no behaviour —
// just the raw text and the intent tag a human assigned to it.
//
// The text here is RAW: cleaning happens downstream in the
// data layer, so the corpus on disk always keeps what the
// user actually typed.
//
// Reference: Rust Book §5 (Structs and Methods)

use serde::{Deserialize, Serialize};

/// A labelled training utterance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusRecord {
    /// The utterance exactly as typed, before any cleaning
    pub text: String,

    /// The intent tag this utterance belongs to, e.g. "greeting"
    pub label: String,
}

impl CorpusRecord {
    /// Create a new CorpusRecord.
    /// Uses impl Into<String> so callers can pass &str or String.
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text:  text.into(),
            label: label.into(),
        }
    }
}
