//! Document store integration for seeding the catalog.
//!
//! The [`Seeder`] writes catalog products one at a time through any
//! [`DocumentWriter`](docstore::DocumentWriter) and reports each outcome.

mod seeder;

pub use seeder::{
    DEFAULT_COLLECTION, InsertedProduct, Notifier, SeedError, SeedEvent, SeedReport, Seeder,
    log_event,
};
