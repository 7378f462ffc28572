// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// This layer handles everything from the raw corpus file
// all the way to tensor batches.
//
// The pipeline flows in this order:
//
//   corpus.csv
//       │
//       ▼
//   CsvCorpusStore    → reads labelled (text, intent) rows
//       │
//       ▼
//   Normalizer        → stopword removal, punctuation strip
//       │
//       ▼
//   LabelEncoder      → intent tags to dense class ids
//       │
//       ▼
//   Tokenizer         → converts words to token ID numbers
//       │
//       ▼
//   IntentDataset     → implements Burn's Dataset trait
//       │
//       ▼
//   IntentBatcher     → stacks samples into tensor batches
//       │
//       ▼
//   DataLoader        → feeds batches to the training loop
//
// Each module is responsible for exactly one step.
// This makes each step independently testable and replaceable.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)
//            Rust Book §13 (Iterators and Closures)

/// Loads and appends the labelled corpus file
pub mod corpus;

/// Cleans utterances: the training and inference passes
pub mod normalizer;

/// Maps intent tags to class ids and back, plus class weights
pub mod labels;

/// Implements Burn's Dataset trait for encoded samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
