// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `train` — fits the intent classifier on a labelled corpus
//   2. `chat`  — loads a checkpoint and serves queries
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

// Declare the commands submodule
pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{ChatArgs, Commands, TrainArgs};

/// The main CLI struct — clap reads the fields and generates
/// argument parsing code automatically via the Parser derive macro.
#[derive(Parser, Debug)]
#[command(
    name = "intent-chat",
    version = "0.1.0",
    about = "Train an intent classifier on a labelled corpus, then chat with it."
)]
pub struct Cli {
    /// The subcommand to run (train or chat)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    /// This keeps the CLI layer thin — it only routes, never computes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args) => Self::run_train(args),
            Commands::Chat(args)  => Self::run_chat(args),
        }
    }

    /// Handles the `train` subcommand.
    /// Converts CLI args into a TrainConfig and hands off to Layer 2.
    fn run_train(args: TrainArgs) -> Result<()> {
        use crate::application::train_use_case::TrainUseCase;

        tracing::info!("Starting training on corpus: {}", args.corpus);

        // Convert CLI args → application config (separates presentation from domain)
        let use_case = TrainUseCase::new(args.into());
        use_case.execute()?;

        println!("Training complete. Checkpoint saved.");
        Ok(())
    }

    /// Handles the `chat` subcommand.
    /// Loads the model from checkpoint and runs the serving loop
    /// on the process console.
    fn run_chat(args: ChatArgs) -> Result<()> {
        use crate::application::chat_use_case::ChatUseCase;

        let use_case = ChatUseCase::new(args.checkpoint_dir, args.corpus, args.catalog)?;

        use_case.run()
    }
}
