//! Configuration for the seed run.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, CatalogError};
use crate::db::DEFAULT_COLLECTION;

/// Key file path used when `GOOGLE_APPLICATION_CREDENTIALS` is unset.
pub const DEFAULT_CREDENTIALS_PATH: &str = "./serviceAccountKey.json";

/// Project used against the emulator when `FIREBASE_PROJECT_ID` is unset.
pub const DEFAULT_EMULATOR_PROJECT: &str = "demo-rotiku";

/// Configuration for seeding operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Service-account key file.
    pub credentials_path: PathBuf,

    /// `host:port` of a Firestore emulator. When set, no key file is read.
    pub emulator_host: Option<String>,

    /// Overrides the project named in the key file.
    pub project_id: Option<String>,

    /// JSON catalog to seed instead of the built-in bakery catalog.
    pub catalog_path: Option<PathBuf>,

    /// Target collection.
    pub collection: String,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            credentials_path: PathBuf::from(DEFAULT_CREDENTIALS_PATH),
            emulator_host: None,
            project_id: None,
            catalog_path: None,
            collection: DEFAULT_COLLECTION.to_string(),
        }
    }
}

impl SeedConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            credentials_path: var("GOOGLE_APPLICATION_CREDENTIALS")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CREDENTIALS_PATH)),
            emulator_host: var("FIRESTORE_EMULATOR_HOST"),
            project_id: var("FIREBASE_PROJECT_ID"),
            catalog_path: var("SEED_CATALOG").map(PathBuf::from),
            collection: DEFAULT_COLLECTION.to_string(),
        }
    }

    /// Loads the configured catalog, or the bakery catalog if none is set.
    pub fn load_catalog(&self) -> Result<Catalog, CatalogError> {
        match &self.catalog_path {
            Some(path) => Catalog::from_json_file(path),
            None => Ok(Catalog::bakery()),
        }
    }
}
