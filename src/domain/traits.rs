// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// Traits are Rust's way of defining shared behaviour —
// similar to interfaces in Java or abstract classes in Python.
//
// By programming against traits instead of concrete types,
// the layers above can swap implementations without changing
// the code that uses them. For example:
//   - CsvCorpusStore implements CorpusSource
//   - A future SqliteCorpusStore could also implement it
//   - The application layer only sees CorpusSource
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)
//            Rust Book §17 (Object Oriented Patterns)

use anyhow::Result;
use crate::domain::record::CorpusRecord;

// ─── CorpusSource ─────────────────────────────────────────────────────────────
/// Any component that can load the labelled training corpus.
///
/// Implementations:
///   - CsvCorpusStore → loads from a delimited text file
///   - (future) SqliteCorpusStore → loads from a database
pub trait CorpusSource {
    /// Load all available records from this source.
    fn load_all(&self) -> Result<Vec<CorpusRecord>>;
}

// ─── IntentResolver ───────────────────────────────────────────────────────────
/// Any component that can map a raw user query to an intent tag.
///
/// Implementations:
///   - Predictor → runs the trained classification head
///   - test stubs → return a fixed tag, so the serving loop can
///     be driven without a trained model
pub trait IntentResolver {
    /// Given a raw query string, return the predicted intent tag.
    fn resolve(&self, query: &str) -> Result<String>;
}
