//! Sequential catalog seeding.

use std::error::Error as StdError;
use std::fmt;

use docstore::{CredentialError, DocumentWriter, StoreError};
use thiserror::Error;
use tracing::{error, info};

use crate::catalog::Catalog;

/// Collection the app reads products from.
pub const DEFAULT_COLLECTION: &str = "products";

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    /// A write failed. Products in `inserted` were persisted before it and
    /// are not rolled back.
    #[error("Failed to insert '{name}' (product {position}): {source}")]
    Insertion {
        position: usize,
        name: String,
        inserted: Vec<InsertedProduct>,
        #[source]
        source: StoreError,
    },
}

/// A product that was written, with its store-assigned id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertedProduct {
    pub name: String,
    pub id: String,
}

impl fmt::Display for InsertedProduct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Added: {} (ID: {})", self.name, self.id)
    }
}

/// Result of a fully successful seed run.
#[derive(Debug, Clone)]
pub struct SeedReport {
    pub collection: String,
    /// In catalog order.
    pub inserted: Vec<InsertedProduct>,
}

impl SeedReport {
    pub fn inserted_count(&self) -> usize {
        self.inserted.len()
    }
}

/// Progress notifications emitted during a run.
#[derive(Debug)]
pub enum SeedEvent<'a> {
    Added(&'a InsertedProduct),
    Completed { count: usize },
    Failed { error: &'a SeedError },
}

impl fmt::Display for SeedEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedEvent::Added(product) => write!(f, "{product}"),
            SeedEvent::Completed { count } => write!(f, "Successfully added {count} products!"),
            SeedEvent::Failed { error } => {
                write!(f, "Error adding products: {}", render_chain(*error))
            }
        }
    }
}

/// Renders an error followed by every cause its message does not already
/// include, so transport details such as "Connection refused" are kept.
fn render_chain(error: &dyn StdError) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !rendered.contains(&text) {
            rendered.push_str(": ");
            rendered.push_str(&text);
        }
        source = cause.source();
    }
    rendered
}

/// Receives seed events.
pub type Notifier = Box<dyn Fn(&SeedEvent<'_>) + Send + Sync>;

/// Default notifier: logs each event.
pub fn log_event(event: &SeedEvent<'_>) {
    match event {
        SeedEvent::Failed { .. } => error!("{event}"),
        _ => info!("{event}"),
    }
}

/// Writes catalog products into a collection, one document per product.
pub struct Seeder<W> {
    writer: W,
    collection: String,
    notifier: Notifier,
}

impl<W: DocumentWriter> Seeder<W> {
    /// Creates a seeder targeting the products collection.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            collection: DEFAULT_COLLECTION.to_string(),
            notifier: Box::new(log_event),
        }
    }

    /// Sets the target collection.
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    /// Replaces the default logging notifier.
    pub fn with_notifier(
        mut self,
        notifier: impl Fn(&SeedEvent<'_>) + Send + Sync + 'static,
    ) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Seeds every product in catalog order.
    ///
    /// Each insert is awaited before the next starts. The first failure stops
    /// the run; later products are not attempted.
    pub async fn seed_products(&self, catalog: &Catalog) -> Result<SeedReport, SeedError> {
        info!(
            "Seeding {} products into '{}'...",
            catalog.len(),
            self.collection
        );

        let mut inserted = Vec::with_capacity(catalog.len());

        for (i, product) in catalog.iter().enumerate() {
            match self
                .writer
                .insert(&self.collection, &product.to_document())
                .await
            {
                Ok(handle) => {
                    let added = InsertedProduct {
                        name: product.name.clone(),
                        id: handle.id,
                    };
                    (self.notifier)(&SeedEvent::Added(&added));
                    inserted.push(added);
                }
                Err(source) => {
                    let err = SeedError::Insertion {
                        position: i + 1,
                        name: product.name.clone(),
                        inserted,
                        source,
                    };
                    (self.notifier)(&SeedEvent::Failed { error: &err });
                    return Err(err);
                }
            }
        }

        let report = SeedReport {
            collection: self.collection.clone(),
            inserted,
        };
        (self.notifier)(&SeedEvent::Completed {
            count: report.inserted_count(),
        });

        Ok(report)
    }
}
