// ============================================================
// Layer 3 — Intent Catalog Domain Type
// ============================================================
// Maps each intent tag to the canned responses the bot may give
// for it. Loaded once from a JSON document shaped like:
//
//   { "intents": [
//       { "tag": "greeting",
//         "responses": ["Hello!", "Hi there, how can I help?"] }
//   ] }
//
// The catalog is immutable for the lifetime of a session. A tag
// the model can predict but the catalog does not know is a
// configuration mismatch; it surfaces as a typed error the
// serving loop reports without crashing.
//
// Reference: Rust Book §5 (Structs)
//            serde_json documentation (derive-based JSON)

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// The predicted tag has no entry in the catalog.
    #[error("no catalog entry for intent '{0}'")]
    UnknownIntent(String),

    /// An entry exists but offers nothing to say.
    #[error("intent '{0}' has an empty response list")]
    EmptyResponses(String),
}

/// One intent with its response templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intent {
    pub tag:       String,
    pub responses: Vec<String>,
}

/// The full tag → responses mapping for a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentCatalog {
    pub intents: Vec<Intent>,
}

impl IntentCatalog {
    /// Parse a catalog from its JSON form and reject entries that
    /// could never produce a response.
    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let catalog: IntentCatalog = serde_json::from_str(raw)?;

        for intent in &catalog.intents {
            if intent.responses.is_empty() {
                return Err(CatalogError::EmptyResponses(intent.tag.clone()).into());
            }
        }

        Ok(catalog)
    }

    /// Pick one of the tag's responses uniformly at random.
    pub fn select_response(&self, tag: &str) -> Result<&str, CatalogError> {
        let intent = self
            .intents
            .iter()
            .find(|i| i.tag == tag)
            .ok_or_else(|| CatalogError::UnknownIntent(tag.to_string()))?;

        intent
            .responses
            .choose(&mut rand::thread_rng())
            .map(|s| s.as_str())
            .ok_or_else(|| CatalogError::EmptyResponses(intent.tag.clone()))
    }

    /// All tags the catalog knows, in file order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.intents.iter().map(|i| i.tag.as_str())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG_JSON: &str = r#"{
        "intents": [
            { "tag": "greeting", "responses": ["Hello!", "Hi there!"] },
            { "tag": "farewell", "responses": ["Goodbye!"] }
        ]
    }"#;

    #[test]
    fn test_parses_catalog_json() {
        let catalog = IntentCatalog::from_json(CATALOG_JSON).unwrap();
        assert_eq!(catalog.intents.len(), 2);
        assert_eq!(catalog.intents[0].tag, "greeting");
    }

    #[test]
    fn test_selected_response_comes_from_the_tag_list() {
        let catalog  = IntentCatalog::from_json(CATALOG_JSON).unwrap();
        let response = catalog.select_response("greeting").unwrap();
        assert!(["Hello!", "Hi there!"].contains(&response));
    }

    #[test]
    fn test_unknown_intent_is_an_error_not_a_panic() {
        let catalog = IntentCatalog::from_json(CATALOG_JSON).unwrap();
        assert_eq!(
            catalog.select_response("smalltalk"),
            Err(CatalogError::UnknownIntent("smalltalk".to_string()))
        );
    }

    #[test]
    fn test_empty_response_list_rejected_at_load() {
        let raw = r#"{ "intents": [ { "tag": "void", "responses": [] } ] }"#;
        assert!(IntentCatalog::from_json(raw).is_err());
    }

    #[test]
    fn test_tags_in_file_order() {
        let catalog: Vec<_> = IntentCatalog::from_json(CATALOG_JSON)
            .unwrap()
            .tags()
            .map(str::to_string)
            .collect();
        assert_eq!(catalog, vec!["greeting", "farewell"]);
    }
}
