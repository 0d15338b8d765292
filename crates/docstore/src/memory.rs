//! In-process document store.

use std::collections::HashMap;

use async_trait::async_trait;
use rand::Rng;
use rand::distributions::Alphanumeric;
use tokio::sync::Mutex;

use crate::errors::StoreError;
use crate::models::{Document, DocumentHandle};
use crate::writer::DocumentWriter;

/// Length of a Firestore auto-generated document id.
const AUTO_ID_LEN: usize = 20;

/// A document held by [`MemoryStore`].
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub id: String,
    pub fields: Document,
}

/// Keeps documents in memory, assigning Firestore-style auto ids.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Vec<StoredDocument>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the documents of a collection in insertion order.
    pub async fn documents(&self, collection: &str) -> Vec<StoredDocument> {
        self.collections
            .lock()
            .await
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl DocumentWriter for MemoryStore {
    async fn insert(
        &self,
        collection: &str,
        document: &Document,
    ) -> Result<DocumentHandle, StoreError> {
        let mut collections = self.collections.lock().await;
        let documents = collections.entry(collection.to_string()).or_default();

        let mut id = auto_id();
        while documents.iter().any(|d| d.id == id) {
            id = auto_id();
        }

        documents.push(StoredDocument {
            id: id.clone(),
            fields: document.clone(),
        });

        let path = format!("{collection}/{id}");
        Ok(DocumentHandle::new(id, path))
    }
}

fn auto_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(AUTO_ID_LEN)
        .map(char::from)
        .collect()
}
