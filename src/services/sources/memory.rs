//! In-memory source
//!
//! Serves a fixed set of rows, for embedding the service and for tests.

use crate::{
    error::AppResult,
    models::{Book, BorrowRecord},
    services::{catalog::CatalogSnapshot, sources::CatalogSource},
};

#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    books: Vec<Book>,
    records: Vec<BorrowRecord>,
}

impl InMemorySource {
    pub fn new(books: Vec<Book>, records: Vec<BorrowRecord>) -> Self {
        Self { books, records }
    }
}

#[async_trait::async_trait]
impl CatalogSource for InMemorySource {
    async fn load(&self) -> AppResult<CatalogSnapshot> {
        Ok(CatalogSnapshot::new(self.books.clone(), self.records.clone())?)
    }

    fn name(&self) -> &'static str {
        "in_memory"
    }
}
