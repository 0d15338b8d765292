use serde_json::{Map, Value};

/// A document body: a flat or nested JSON object keyed by field name.
pub type Document = Map<String, Value>;

/// Reference to a document the store has just created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentHandle {
    /// System-assigned identifier, unique within the collection.
    pub id: String,
    /// Full resource path of the document.
    pub path: String,
}

impl DocumentHandle {
    pub fn new(id: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
        }
    }
}
