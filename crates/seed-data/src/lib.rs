//! Seed data for rotiku.
//!
//! This crate holds the sample product catalog and the tooling that writes it
//! into the document store, one product at a time, reporting each generated
//! document id.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use seed_data::prelude::*;
//!
//! let config = SeedConfig::from_env();
//! let catalog = config.load_catalog()?;
//! let result = run(connect(&config), &config, &catalog, log_event).await;
//! std::process::exit(exit_status(&result).into());
//! ```

pub mod catalog;
pub mod config;
pub mod db;

use docstore::{CredentialError, DocumentWriter, FirestoreClient, ServiceAccountKey};
use tracing::info;

use crate::catalog::Catalog;
use crate::config::{DEFAULT_EMULATOR_PROJECT, SeedConfig};
use crate::db::{SeedError, SeedEvent, SeedReport, Seeder};

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::catalog::{Catalog, CatalogError, ProductRecord};
    pub use crate::config::SeedConfig;
    pub use crate::db::{InsertedProduct, SeedError, SeedEvent, SeedReport, Seeder, log_event};
    pub use crate::{connect, exit_status, run};
}

/// Builds the authenticated store client described by `config`.
///
/// With an emulator host configured no key file is read; otherwise the
/// service-account key is loaded and validated here.
pub fn connect(config: &SeedConfig) -> Result<FirestoreClient, CredentialError> {
    if let Some(host) = &config.emulator_host {
        let project_id = config
            .project_id
            .clone()
            .unwrap_or_else(|| DEFAULT_EMULATOR_PROJECT.to_string());
        info!("Using Firestore emulator at {} (project {})", host, project_id);
        return FirestoreClient::emulator(host, project_id);
    }

    let mut key = ServiceAccountKey::from_file(&config.credentials_path)?;
    if let Some(project_id) = &config.project_id {
        key.project_id = project_id.clone();
    }
    FirestoreClient::new(key)
}

/// Seeds `catalog` through the writer produced by `connection`.
///
/// A failed connection is reported and returned without attempting any
/// insert.
pub async fn run<W: DocumentWriter>(
    connection: Result<W, CredentialError>,
    config: &SeedConfig,
    catalog: &Catalog,
    notifier: impl Fn(&SeedEvent<'_>) + Send + Sync + 'static,
) -> Result<SeedReport, SeedError> {
    let writer = match connection {
        Ok(writer) => writer,
        Err(e) => {
            let err = SeedError::from(e);
            notifier(&SeedEvent::Failed { error: &err });
            return Err(err);
        }
    };

    info!("Connected to document store");

    Seeder::new(writer)
        .with_collection(config.collection.as_str())
        .with_notifier(notifier)
        .seed_products(catalog)
        .await
}

/// Maps a run outcome to the process exit status: 0 on success, 1 otherwise.
pub fn exit_status<T>(result: &Result<T, SeedError>) -> u8 {
    match result {
        Ok(_) => 0,
        Err(_) => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use docstore::{Document, DocumentHandle, MemoryStore, StoreError};

    fn capture() -> (Arc<Mutex<Vec<String>>>, impl Fn(&SeedEvent<'_>) + Send + Sync + 'static) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&lines);
        (lines, move |event: &SeedEvent<'_>| {
            sink.lock().unwrap().push(event.to_string())
        })
    }

    #[tokio::test]
    async fn test_run_seeds_catalog() {
        let store = Arc::new(MemoryStore::new());
        let config = SeedConfig::default();
        let catalog = Catalog::bakery();
        let (lines, notifier) = capture();

        let result = run(Ok(Arc::clone(&store)), &config, &catalog, notifier).await;

        assert_eq!(exit_status(&result), 0);
        assert_eq!(result.unwrap().inserted_count(), 6);
        assert_eq!(store.count("products").await, 6);
        assert_eq!(
            lines.lock().unwrap().last().map(String::as_str),
            Some("Successfully added 6 products!")
        );
    }

    /// Counts insert calls and rejects every one of them.
    #[derive(Default)]
    struct RejectingWriter {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DocumentWriter for RejectingWriter {
        async fn insert(
            &self,
            _collection: &str,
            _document: &Document,
        ) -> Result<DocumentHandle, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Rejected {
                status: 403,
                message: "PERMISSION_DENIED: Missing or insufficient permissions.".into(),
            })
        }
    }

    #[tokio::test]
    async fn test_credential_failure_reports_and_exits_nonzero() {
        let config = SeedConfig::default();
        let (lines, notifier) = capture();

        let connection: Result<Arc<RejectingWriter>, _> =
            Err(CredentialError::MissingField("private_key"));
        let result = run(connection, &config, &Catalog::bakery(), notifier).await;

        assert_eq!(exit_status(&result), 1);
        assert!(matches!(result, Err(SeedError::Credential(_))));

        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("Error adding products: Credential error"));
    }

    #[tokio::test]
    async fn test_insertion_failure_exits_nonzero() {
        let writer = Arc::new(RejectingWriter::default());
        let config = SeedConfig::default();
        let (lines, notifier) = capture();

        let result = run(Ok(Arc::clone(&writer)), &config, &Catalog::bakery(), notifier).await;

        assert_eq!(exit_status(&result), 1);
        assert!(matches!(
            result,
            Err(SeedError::Insertion { position: 1, .. })
        ));
        assert_eq!(writer.calls.load(Ordering::SeqCst), 1);

        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("PERMISSION_DENIED"));
    }

    #[test]
    fn test_connect_without_key_file_fails() {
        let config = SeedConfig {
            credentials_path: PathBuf::from("/nonexistent/serviceAccountKey.json"),
            ..SeedConfig::default()
        };

        assert!(matches!(connect(&config), Err(CredentialError::Io { .. })));
    }

    #[test]
    fn test_connect_emulator_defaults_project() {
        let config = SeedConfig {
            emulator_host: Some("localhost:8080".into()),
            ..SeedConfig::default()
        };

        let client = connect(&config).unwrap();
        assert_eq!(client.project_id(), DEFAULT_EMULATOR_PROJECT);
    }
}
