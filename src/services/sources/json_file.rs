//! JSON file source
//!
//! Reads two JSON arrays whose objects use the fixed column names of the
//! library exports: `{ID, TITLE, AUTHOR, CATEGORY}` for the catalog and
//! `{EMPLOYEE_ID, EMPLOYEE_NAME, TITLE, AUTHOR, CATEGORY}` for borrow records.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::{
    error::AppResult,
    models::{Book, BookRow, BorrowRecord, BorrowRow},
    services::{catalog::CatalogSnapshot, sources::CatalogSource},
};

#[derive(Debug, Clone)]
pub struct JsonFileSource {
    catalog_path: PathBuf,
    borrowers_path: PathBuf,
}

impl JsonFileSource {
    pub fn new(catalog_path: impl Into<PathBuf>, borrowers_path: impl Into<PathBuf>) -> Self {
        Self {
            catalog_path: catalog_path.into(),
            borrowers_path: borrowers_path.into(),
        }
    }

    async fn read_rows<T: DeserializeOwned>(path: &Path) -> AppResult<Vec<T>> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "Failed to read data file");
            e
        })?;
        let rows: Vec<T> = serde_json::from_slice(&bytes)?;
        Ok(rows)
    }
}

#[async_trait::async_trait]
impl CatalogSource for JsonFileSource {
    async fn load(&self) -> AppResult<CatalogSnapshot> {
        let (book_rows, borrow_rows) = tokio::try_join!(
            Self::read_rows::<BookRow>(&self.catalog_path),
            Self::read_rows::<BorrowRow>(&self.borrowers_path),
        )?;

        tracing::info!(
            catalog = %self.catalog_path.display(),
            borrowers = %self.borrowers_path.display(),
            book_rows = book_rows.len(),
            borrow_rows = borrow_rows.len(),
            "Data files read"
        );

        let books: Vec<Book> = book_rows.into_iter().map(Book::from).collect();
        let records: Vec<BorrowRecord> = borrow_rows.into_iter().map(BorrowRecord::from).collect();

        Ok(CatalogSnapshot::new(books, records)?)
    }

    fn name(&self) -> &'static str {
        "json_file"
    }
}
