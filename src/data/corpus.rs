// ============================================================
// Layer 4 — Corpus Store
// ============================================================
// Loads and appends the labelled corpus file. The format is a
// two-column delimited text file with a header row:
//
//   text,label
//   hello there,greeting
//   "thanks, that helped",thanks
//
// Writes quote any field containing a comma, quote, or line
// break (quotes doubled inside quoted fields), and reads accept
// the same quoting. A row that does not parse to exactly two
// columns is a malformed-row error: better to stop loudly than
// to train on a corpus that silently lost rows.
//
// Appends open the file in append mode per write, so the store
// never rewrites history. The FeedbackRecorder below layers the
// text-dedup rule on top of the raw store.
//
// Reference: Rust Book §9 (Error Handling)
//            Rust Book §12 (I/O and File Handling)
//            RFC 4180 (CSV escaping rules)

use anyhow::{Context, Result};
use std::{
    collections::HashSet,
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};
use thiserror::Error;

use crate::domain::record::CorpusRecord;
use crate::domain::traits::CorpusSource;

/// Header row written when a corpus file is first created.
pub const CORPUS_HEADER: &str = "text,label";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CorpusError {
    /// A data row parsed to the wrong number of columns, e.g. an
    /// unquoted comma written by an older tool.
    #[error("malformed corpus row at line {line}: expected 2 columns, found {columns}")]
    MalformedRow { line: usize, columns: usize },

    /// A quoted field was opened but never closed on its line.
    #[error("unterminated quoted field in corpus row at line {line}")]
    UnterminatedQuote { line: usize },
}

/// The persistent corpus file.
pub struct CsvCorpusStore {
    path: PathBuf,
}

impl CsvCorpusStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read and parse every record in the corpus file.
    pub fn load(&self) -> Result<Vec<CorpusRecord>> {
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read corpus file '{}'", self.path.display()))?;

        let records = parse_corpus(&raw)
            .with_context(|| format!("Failed to parse corpus file '{}'", self.path.display()))?;

        tracing::debug!("Loaded {} corpus records from '{}'", records.len(), self.path.display());
        Ok(records)
    }

    /// Append one record, creating the file (with header) on
    /// first use. Fields are quoted as needed.
    pub fn append(&self, record: &CorpusRecord) -> Result<()> {
        if !self.path.exists() {
            if let Some(dir) = self.path.parent() {
                if !dir.as_os_str().is_empty() {
                    fs::create_dir_all(dir)?;
                }
            }
            let mut f = fs::File::create(&self.path)?;
            writeln!(f, "{CORPUS_HEADER}")?;
        }

        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open corpus file '{}'", self.path.display()))?;

        writeln!(f, "{},{}", quote_field(&record.text), quote_field(&record.label))?;
        Ok(())
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl CorpusSource for CsvCorpusStore {
    fn load_all(&self) -> Result<Vec<CorpusRecord>> {
        self.load()
    }
}

/// Quote a field when it contains the delimiter, a quote, or a
/// line break; double any quotes inside.
fn quote_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Split one physical line into fields, honouring quotes.
fn split_row(line: &str, line_no: usize) -> Result<Vec<String>, CorpusError> {
    let mut fields    = Vec::new();
    let mut field     = String::new();
    let mut in_quotes = false;
    let mut chars     = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                // A doubled quote is a literal quote; a lone one
                // closes the field
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
        } else {
            match c {
                '"' if field.is_empty() => in_quotes = true,
                ','                     => fields.push(std::mem::take(&mut field)),
                _                       => field.push(c),
            }
        }
    }

    if in_quotes {
        return Err(CorpusError::UnterminatedQuote { line: line_no });
    }

    fields.push(field);
    Ok(fields)
}

fn parse_corpus(raw: &str) -> Result<Vec<CorpusRecord>, CorpusError> {
    let mut records = Vec::new();

    // A quoted field may span physical lines; an odd number of
    // quotes means the record continues on the next one
    let mut pending: Option<(String, usize)> = None;

    for (idx, line) in raw.lines().enumerate() {
        let line_no = idx + 1;

        let (row, start_line) = match pending.take() {
            Some((mut buf, start)) => {
                buf.push('\n');
                buf.push_str(line);
                (buf, start)
            }
            None => {
                // Header row and blank lines carry no data
                if idx == 0 && line == CORPUS_HEADER {
                    continue;
                }
                if line.trim().is_empty() {
                    continue;
                }
                (line.to_string(), line_no)
            }
        };

        if row.matches('"').count() % 2 == 1 {
            pending = Some((row, start_line));
            continue;
        }

        let fields = split_row(&row, start_line)?;
        match <[String; 2]>::try_from(fields) {
            Ok([text, label]) => records.push(CorpusRecord::new(text, label)),
            Err(fields) => {
                return Err(CorpusError::MalformedRow {
                    line:    start_line,
                    columns: fields.len(),
                })
            }
        }
    }

    if let Some((_, start_line)) = pending {
        return Err(CorpusError::UnterminatedQuote { line: start_line });
    }

    Ok(records)
}

// ─── FeedbackRecorder ─────────────────────────────────────────────────────────
/// Appends user-confirmed examples to the corpus, once per
/// distinct text. The dedup check runs against an in-memory
/// snapshot of the corpus texts taken at session start and kept
/// current across appends, so confirming the same query twice in
/// one session still writes a single row.
///
/// Recording never re-fits labels or retrains the head; new rows
/// only feed the next offline training run.
pub struct FeedbackRecorder {
    store: CsvCorpusStore,
    seen:  HashSet<String>,
}

impl FeedbackRecorder {
    pub fn new(store: CsvCorpusStore, corpus: &[CorpusRecord]) -> Self {
        let seen = corpus.iter().map(|r| r.text.clone()).collect();
        Self { store, seen }
    }

    /// Append (text, label) unless the text is already in the
    /// corpus. Returns whether a row was written.
    pub fn record_if_new(&mut self, text: &str, label: &str) -> Result<bool> {
        if self.seen.contains(text) {
            tracing::debug!("Feedback text already in corpus, skipping append");
            return Ok(false);
        }

        self.store.append(&CorpusRecord::new(text, label))?;
        self.seen.insert(text.to_string());
        Ok(true)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_in(dir: &tempfile::TempDir) -> CsvCorpusStore {
        CsvCorpusStore::new(dir.path().join("corpus.csv"))
    }

    #[test]
    fn test_append_then_load_round_trip() {
        let dir   = tempdir().unwrap();
        let store = store_in(&dir);

        store.append(&CorpusRecord::new("hello there", "greeting")).unwrap();
        store.append(&CorpusRecord::new("see you later", "farewell")).unwrap();

        let records = store.load().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], CorpusRecord::new("hello there", "greeting"));
        assert_eq!(records[1], CorpusRecord::new("see you later", "farewell"));
    }

    #[test]
    fn test_header_written_exactly_once() {
        let dir   = tempdir().unwrap();
        let store = store_in(&dir);

        store.append(&CorpusRecord::new("a", "x")).unwrap();
        store.append(&CorpusRecord::new("b", "y")).unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw.lines().next(), Some(CORPUS_HEADER));
        assert_eq!(raw.lines().filter(|l| *l == CORPUS_HEADER).count(), 1);
    }

    #[test]
    fn test_comma_in_text_survives_round_trip() {
        let dir   = tempdir().unwrap();
        let store = store_in(&dir);

        store.append(&CorpusRecord::new("thanks, that helped", "thanks")).unwrap();

        let records = store.load().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "thanks, that helped");
        assert_eq!(records[0].label, "thanks");
    }

    #[test]
    fn test_quotes_in_text_survive_round_trip() {
        let dir   = tempdir().unwrap();
        let store = store_in(&dir);

        store.append(&CorpusRecord::new(r#"say "hello" for me"#, "greeting")).unwrap();

        let records = store.load().unwrap();
        assert_eq!(records[0].text, r#"say "hello" for me"#);
    }

    #[test]
    fn test_line_break_in_text_survives_round_trip() {
        let dir   = tempdir().unwrap();
        let store = store_in(&dir);

        store.append(&CorpusRecord::new("first line\nsecond line", "multiline")).unwrap();

        let records = store.load().unwrap();
        assert_eq!(records[0].text, "first line\nsecond line");
        assert_eq!(records[0].label, "multiline");
    }

    #[test]
    fn test_unterminated_quote_is_an_error() {
        let dir  = tempdir().unwrap();
        let path = dir.path().join("corpus.csv");
        fs::write(&path, "text,label\n\"never closed,greeting\n").unwrap();

        let err = CsvCorpusStore::new(&path).load().unwrap_err();
        let err = err.downcast::<CorpusError>().unwrap();
        assert_eq!(err, CorpusError::UnterminatedQuote { line: 2 });
    }

    #[test]
    fn test_unquoted_extra_comma_is_malformed() {
        let dir  = tempdir().unwrap();
        let path = dir.path().join("corpus.csv");
        fs::write(&path, "text,label\nbad, row, here,greeting\n").unwrap();

        let err = CsvCorpusStore::new(&path).load().unwrap_err();
        let err = err.downcast::<CorpusError>().unwrap();
        assert_eq!(err, CorpusError::MalformedRow { line: 2, columns: 4 });
    }

    #[test]
    fn test_record_if_new_is_idempotent_within_a_session() {
        let dir          = tempdir().unwrap();
        let store        = store_in(&dir);
        let mut recorder = FeedbackRecorder::new(store, &[]);

        assert!(recorder.record_if_new("where is the gym", "directions").unwrap());
        assert!(!recorder.record_if_new("where is the gym", "directions").unwrap());

        let records = store_in(&dir).load().unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_record_if_new_skips_text_already_in_corpus() {
        let dir    = tempdir().unwrap();
        let store  = store_in(&dir);
        let corpus = vec![CorpusRecord::new("hello there", "greeting")];

        let mut recorder = FeedbackRecorder::new(store, &corpus);
        assert!(!recorder.record_if_new("hello there", "greeting").unwrap());
    }
}
