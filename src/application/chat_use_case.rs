// ============================================================
// Layer 2 — Chat Use Case
// ============================================================
// The interactive serving loop. Observable protocol:
//
//   prompt for a query
//     "quit" (or end of input) → session over
//     anything else           → predict intent, print one of the
//                               catalog's responses for it
//   prompt for a y/n helpfulness answer
//     "quit" (or end of input) → session over
//     "y"  → record the raw query + predicted intent in the
//            corpus, acknowledge with "ok" if it was new
//     else → no action, back to the query prompt
//
// A failed prediction is reported and the loop continues; only
// console IO failures end the session early. The loop runs
// against generic reader/writer handles, so the whole protocol
// is testable without a TTY.
//
// Reference: Rust Book §12 (An IO Project)
//            Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::{Context, Result};
use std::io::{BufRead, Write};

use crate::data::corpus::{CsvCorpusStore, FeedbackRecorder};
use crate::domain::catalog::IntentCatalog;
use crate::domain::traits::IntentResolver;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::predictor::Predictor;

pub struct ChatUseCase {
    predictor: Predictor,
    catalog:   IntentCatalog,
    recorder:  FeedbackRecorder,
}

impl ChatUseCase {
    /// Load everything a chat session needs: the trained model,
    /// the intent catalog, and the corpus snapshot the feedback
    /// dedup check runs against.
    pub fn new(
        checkpoint_dir: String,
        corpus_path:    String,
        catalog_path:   String,
    ) -> Result<Self> {
        let ckpt      = CheckpointManager::new(&checkpoint_dir);
        let predictor = Predictor::from_checkpoint(&ckpt)?;

        let raw = std::fs::read_to_string(&catalog_path)
            .with_context(|| format!("Cannot read intent catalog '{catalog_path}'"))?;
        let catalog = IntentCatalog::from_json(&raw)?;

        // A trained class with no catalog entry only surfaces once
        // the model predicts it mid-session; warn up front instead
        let known: Vec<&str> = catalog.tags().collect();
        for class in ckpt.load_labels()? {
            if !known.contains(&class.as_str()) {
                tracing::warn!("Trained class '{class}' has no catalog entry");
            }
        }

        let store    = CsvCorpusStore::new(&corpus_path);
        let corpus   = store.load()?;
        let recorder = FeedbackRecorder::new(store, &corpus);

        Ok(Self { predictor, catalog, recorder })
    }

    /// Run the session on the process console.
    pub fn run(mut self) -> Result<()> {
        let stdin  = std::io::stdin();
        let stdout = std::io::stdout();

        run_session(
            &self.predictor,
            &self.catalog,
            &mut self.recorder,
            &mut stdin.lock(),
            &mut stdout.lock(),
        )
    }
}

// ─── Serving Loop ─────────────────────────────────────────────────────────────

pub fn run_session<P, R, W>(
    resolver: &P,
    catalog:  &IntentCatalog,
    recorder: &mut FeedbackRecorder,
    input:    &mut R,
    output:   &mut W,
) -> Result<()>
where
    P: IntentResolver,
    R: BufRead,
    W: Write,
{
    writeln!(output, "Ask me anything. Type 'quit' to exit.")?;

    loop {
        write!(output, "You (ask me something): ")?;
        output.flush()?;
        let Some(query) = read_trimmed(input)? else { break };
        if query == "quit" {
            break;
        }

        // A bad query must not end the session; report and move on
        let intent = match resolver.resolve(&query) {
            Ok(tag) => tag,
            Err(e) => {
                tracing::warn!("Prediction failed: {e:#}");
                writeln!(output, "Bot: Sorry, I could not process that ({e}).")?;
                continue;
            }
        };
        let response = match catalog.select_response(&intent) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Response lookup failed: {e}");
                writeln!(output, "Bot: Sorry, I could not process that ({e}).")?;
                continue;
            }
        };

        writeln!(output, "Bot: {response}")?;
        writeln!(output, "Bot: Was this helpful? Please type y/n.")?;
        write!(output, "You: ")?;
        output.flush()?;

        let Some(feedback) = read_trimmed(input)? else { break };
        if feedback == "quit" {
            break;
        }
        if feedback == "y" {
            // A lost feedback row is a degradation, not a reason
            // to end the session
            match recorder.record_if_new(&query, &intent) {
                Ok(true)  => writeln!(output, "ok")?,
                Ok(false) => {}
                Err(e)    => tracing::warn!("Could not record feedback: {e:#}"),
            }
        }
    }

    Ok(())
}

/// One console line, trimmed. `None` means end of input.
fn read_trimmed<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::CorpusRecord;
    use std::cell::Cell;
    use std::io::Cursor;
    use std::path::Path;
    use tempfile::tempdir;

    struct FixedResolver(&'static str);

    impl IntentResolver for FixedResolver {
        fn resolve(&self, _query: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct CountingResolver {
        calls: Cell<usize>,
    }

    impl IntentResolver for CountingResolver {
        fn resolve(&self, _query: &str) -> Result<String> {
            self.calls.set(self.calls.get() + 1);
            Ok("greeting".to_string())
        }
    }

    struct FailingResolver;

    impl IntentResolver for FailingResolver {
        fn resolve(&self, _query: &str) -> Result<String> {
            anyhow::bail!("no checkpoint loaded")
        }
    }

    fn catalog() -> IntentCatalog {
        IntentCatalog::from_json(
            r#"{ "intents": [ { "tag": "greeting", "responses": ["Hello!"] } ] }"#,
        )
        .unwrap()
    }

    fn recorder_at(dir: &Path) -> FeedbackRecorder {
        FeedbackRecorder::new(CsvCorpusStore::new(dir.join("chat.csv")), &[])
    }

    fn drive(
        resolver: &impl IntentResolver,
        recorder: &mut FeedbackRecorder,
        script:   &str,
    ) -> String {
        let catalog    = catalog();
        let mut input  = Cursor::new(script.as_bytes().to_vec());
        let mut output = Vec::new();
        run_session(resolver, &catalog, recorder, &mut input, &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_quit_at_the_query_prompt_never_invokes_the_model() {
        let dir      = tempdir().unwrap();
        let resolver = CountingResolver { calls: Cell::new(0) };

        let output = drive(&resolver, &mut recorder_at(dir.path()), "quit\n");

        assert_eq!(resolver.calls.get(), 0);
        assert!(output.contains("Ask me anything"));
    }

    #[test]
    fn test_quit_at_the_feedback_prompt_terminates_without_recording() {
        let dir    = tempdir().unwrap();
        let output = drive(
            &FixedResolver("greeting"),
            &mut recorder_at(dir.path()),
            "hello\nquit\n",
        );

        assert!(output.contains("Bot: Hello!"));
        assert!(!dir.path().join("chat.csv").exists());
    }

    #[test]
    fn test_y_feedback_appends_once_and_acknowledges() {
        let dir    = tempdir().unwrap();
        let output = drive(
            &FixedResolver("greeting"),
            &mut recorder_at(dir.path()),
            "hello\ny\nhello\ny\nquit\n",
        );

        // Second confirmation of the same text is a no-op
        assert_eq!(output.matches("ok\n").count(), 1);

        let rows = CsvCorpusStore::new(dir.path().join("chat.csv")).load().unwrap();
        assert_eq!(rows, vec![CorpusRecord::new("hello", "greeting")]);
    }

    #[test]
    fn test_non_y_feedback_appends_nothing() {
        let dir    = tempdir().unwrap();
        let output = drive(
            &FixedResolver("greeting"),
            &mut recorder_at(dir.path()),
            "hello\nn\nquit\n",
        );

        assert!(!output.contains("ok\n"));
        assert!(!dir.path().join("chat.csv").exists());
    }

    #[test]
    fn test_prediction_error_is_reported_and_the_loop_continues() {
        let dir    = tempdir().unwrap();
        let output = drive(&FailingResolver, &mut recorder_at(dir.path()), "boom\nquit\n");

        assert!(output.contains("Sorry"));
        // The query prompt appears again after the failure
        assert_eq!(output.matches("You (ask me something): ").count(), 2);
    }

    #[test]
    fn test_tag_missing_from_the_catalog_is_reported_not_fatal() {
        let dir    = tempdir().unwrap();
        let output = drive(
            &FixedResolver("smalltalk"),
            &mut recorder_at(dir.path()),
            "hey\nquit\n",
        );

        assert!(output.contains("smalltalk"));
        assert_eq!(output.matches("You (ask me something): ").count(), 2);
    }

    #[test]
    fn test_end_of_input_terminates_like_quit() {
        let dir    = tempdir().unwrap();
        let output = drive(&FixedResolver("greeting"), &mut recorder_at(dir.path()), "");

        assert_eq!(output.matches("You (ask me something): ").count(), 1);
    }
}
