//! Document store client for rotiku.
//!
//! This crate owns everything needed to write documents into the catalog
//! store: loading a service-account credential, minting OAuth access tokens,
//! and creating documents through the Firestore REST API. Callers program
//! against the [`DocumentWriter`] trait so the store can be swapped for the
//! in-process [`MemoryStore`] in tests.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use docstore::{DocumentWriter, FirestoreClient};
//!
//! let client = FirestoreClient::from_key_file("./serviceAccountKey.json")?;
//! let handle = client.insert("products", &document).await?;
//! println!("created {}", handle.id);
//! ```

pub mod auth;
pub mod credentials;
pub mod errors;
pub mod firestore;
pub mod memory;
pub mod models;
pub mod writer;

pub use credentials::ServiceAccountKey;
pub use errors::{CredentialError, StoreError};
pub use firestore::FirestoreClient;
pub use memory::{MemoryStore, StoredDocument};
pub use models::{Document, DocumentHandle};
pub use writer::DocumentWriter;
