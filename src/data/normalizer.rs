// ============================================================
// Layer 4 — Text Normalizer
// ============================================================
// Cleans raw utterances before tokenisation. Two entry points:
//
//   clean_for_training  — applied to every corpus row before the
//                         tokenizer vocabulary is built
//   clean_for_inference — applied to live user queries right
//                         before prediction
//
// Both share the same stopword-removal and punctuation-strip core,
// so a query and a corpus row containing the same words reduce to
// the same token string. That identity is what keeps the model's
// training-time and serving-time views of text in sync.
//
// The inference path adds one extra filter up front: everything
// except ASCII letters and spaces is dropped. Digits therefore
// survive training cleanup but not inference cleanup. The two
// paths stay separate, named functions; folding them together
// would change what the model sees at training time.
//
// Reference: Rust Book §8 (Strings in Rust)
//            Rust Book §13 (Iterators)

/// English stopwords, matched case-insensitively against tokens
/// with leading/trailing punctuation trimmed off.
const STOP_WORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you",
    "your", "yours", "yourself", "yourselves", "he", "him", "his",
    "himself", "she", "her", "hers", "herself", "it", "its", "itself",
    "they", "them", "their", "theirs", "themselves", "what", "which",
    "who", "whom", "this", "that", "these", "those", "am", "is", "are",
    "was", "were", "be", "been", "being", "have", "has", "had", "having",
    "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if",
    "or", "because", "as", "until", "while", "of", "at", "by", "for",
    "with", "about", "against", "between", "into", "through", "during",
    "before", "after", "above", "below", "to", "from", "up", "down",
    "in", "out", "on", "off", "over", "under", "again", "further",
    "then", "once", "here", "there", "when", "where", "why", "how",
    "all", "any", "both", "each", "few", "more", "most", "other",
    "some", "such", "no", "nor", "not", "only", "own", "same", "so",
    "than", "too", "very", "s", "t", "can", "will", "just", "don",
    "should", "now",
];

pub struct Normalizer;

impl Normalizer {
    /// Create a new Normalizer instance
    pub fn new() -> Self {
        Self
    }

    /// Cleanup applied to every corpus row before the vocabulary is
    /// built: stopword removal, then punctuation stripping.
    pub fn clean_for_training(&self, text: &str) -> String {
        strip_punctuation(&remove_stopwords(text))
    }

    /// Cleanup applied to live user queries: a letters-and-spaces
    /// pre-filter, then the same stopword-removal and
    /// punctuation-strip passes as training.
    pub fn clean_for_inference(&self, text: &str) -> String {
        strip_punctuation(&remove_stopwords(&strip_to_letters(text)))
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// True when a token matches a stopword once its surrounding
/// punctuation is trimmed. "The," counts the same as "the".
fn is_stop_word(token: &str) -> bool {
    let core = token
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();
    STOP_WORDS.contains(&core.as_str())
}

/// Split on whitespace, drop stopword tokens, rejoin with single
/// spaces. Token text is kept as-is; only membership is decided on
/// the trimmed, lowercased form.
fn remove_stopwords(text: &str) -> String {
    text.split_whitespace()
        .filter(|token| !is_stop_word(token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Second pass over the whole string: keep word characters and
/// spaces, drop everything else, then collapse space runs left
/// behind by removed characters.
fn strip_punctuation(text: &str) -> String {
    let kept: String = text
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == ' ')
        .collect();

    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Inference-only pre-filter: ASCII letters and spaces survive,
/// anything else (digits included) is dropped.
fn strip_to_letters(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphabetic() || *c == ' ')
        .collect()
}
