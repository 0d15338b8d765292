use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::StoreError;
use crate::models::{Document, DocumentHandle};

/// Capability to create new documents in a named collection.
///
/// Every call creates a fresh document with a store-assigned id; writing the
/// same body twice yields two documents.
#[async_trait]
pub trait DocumentWriter: Send + Sync {
    async fn insert(
        &self,
        collection: &str,
        document: &Document,
    ) -> Result<DocumentHandle, StoreError>;
}

#[async_trait]
impl<W: DocumentWriter + ?Sized> DocumentWriter for Arc<W> {
    async fn insert(
        &self,
        collection: &str,
        document: &Document,
    ) -> Result<DocumentHandle, StoreError> {
        (**self).insert(collection, document).await
    }
}
