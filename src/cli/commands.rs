// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands: `train` and `chat`
// and all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, etc.)
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use crate::application::train_use_case::TrainConfig;

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the intent classifier on a labelled corpus
    Train(TrainArgs),

    /// Chat interactively using a trained checkpoint
    Chat(ChatArgs),
}

/// All arguments for the `train` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// CSV corpus of `text,label` rows to train on
    #[arg(long, default_value = "data/corpus.csv")]
    pub corpus: String,

    /// Directory to save the model checkpoint and tokenizer
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Maximum number of tokens per utterance; shorter ones are
    /// padded, longer ones truncated
    #[arg(long, default_value_t = 8)]
    pub max_seq_len: usize,

    /// Number of samples processed together in one forward pass
    #[arg(long, default_value_t = 16)]
    pub batch_size: usize,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 200)]
    pub epochs: usize,

    /// How fast the model learns — too high causes instability,
    /// too low causes slow convergence
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Width of the token embedding vectors
    #[arg(long, default_value_t = 768)]
    pub embed_width: usize,

    /// Width of the first hidden layer of the head
    #[arg(long, default_value_t = 512)]
    pub hidden_1: usize,

    /// Width of the second hidden layer of the head
    #[arg(long, default_value_t = 256)]
    pub hidden_2: usize,

    /// Dropout probability — randomly zeroes activations during
    /// training to prevent overfitting
    #[arg(long, default_value_t = 0.2)]
    pub dropout: f64,

    /// Gradient-norm clipping threshold applied before each
    /// optimiser step
    #[arg(long, default_value_t = 1.0)]
    pub grad_clip: f32,

    /// Upper bound on vocabulary entries (including reserved
    /// tokens); the built vocabulary may be smaller
    #[arg(long, default_value_t = 30522)]
    pub vocab_size: usize,

    /// Seed for parameter init, dropout and epoch shuffling
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// This is the boundary between Layer 1 and Layer 2 —
/// the application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            corpus_path:    a.corpus,
            checkpoint_dir: a.checkpoint_dir,
            max_seq_len:    a.max_seq_len,
            batch_size:     a.batch_size,
            epochs:         a.epochs,
            lr:             a.lr,
            embed_width:    a.embed_width,
            hidden_1:       a.hidden_1,
            hidden_2:       a.hidden_2,
            dropout:        a.dropout,
            grad_clip:      a.grad_clip,
            vocab_size:     a.vocab_size,
            seed:           a.seed,
        }
    }
}

/// All arguments for the `chat` command
#[derive(Args, Debug)]
pub struct ChatArgs {
    /// Directory where the checkpoint was saved during training
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// CSV corpus confirmed-helpful queries are appended to
    /// (same file used during training)
    #[arg(long, default_value = "data/corpus.csv")]
    pub corpus: String,

    /// JSON catalog mapping each intent tag to its responses
    #[arg(long, default_value = "data/intents.json")]
    pub catalog: String,
}
