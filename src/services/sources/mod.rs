//! Catalog data source abstraction
//!
//! Loading tabular data is the job of a collaborator outside the scoring core.
//! Each source turns its storage format into a validated [`CatalogSnapshot`];
//! the service holds the source so a snapshot can be reloaded at runtime.

use crate::{error::AppResult, services::catalog::CatalogSnapshot};

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileSource;
pub use memory::InMemorySource;

/// Trait for catalog and borrowing-history sources
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogSource: Send + Sync {
    /// Loads a fresh snapshot of the catalog and borrow records
    async fn load(&self) -> AppResult<CatalogSnapshot>;

    /// Source name for logging and debugging
    fn name(&self) -> &'static str;
}
