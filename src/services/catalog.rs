//! Immutable catalog and borrowing-history snapshot
//!
//! A snapshot is built once per load and shared behind an `Arc`. Scorers only
//! ever borrow it; anything that needs a working copy clones out of it.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{Book, BookFeatures, BorrowRecord, Employee, EmployeeId};

/// Error types for snapshot construction
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("Duplicate book title in catalog: {0}")]
    DuplicateTitle(String),
    #[error("Catalog book {0} has an empty title")]
    BlankTitle(String),
}

/// Read-only view of the catalog and borrow records for one session
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    books: Vec<Book>,
    records: Vec<BorrowRecord>,
    title_index: HashMap<String, usize>,
    loaded_at: DateTime<Utc>,
}

impl CatalogSnapshot {
    /// Builds a snapshot, rejecting catalogs whose titles are not unique
    ///
    /// Titles are the join key between books and borrow records, so a duplicate
    /// would silently merge two books under every strategy.
    pub fn new(books: Vec<Book>, records: Vec<BorrowRecord>) -> Result<Self, CatalogError> {
        let mut title_index = HashMap::with_capacity(books.len());

        for (position, book) in books.iter().enumerate() {
            if book.title.is_empty() {
                return Err(CatalogError::BlankTitle(book.id.clone()));
            }
            if title_index.insert(book.title.clone(), position).is_some() {
                return Err(CatalogError::DuplicateTitle(book.title.clone()));
            }
        }

        let unknown_titles = records
            .iter()
            .filter(|record| !title_index.contains_key(&record.title))
            .count();
        if unknown_titles > 0 {
            tracing::warn!(
                count = unknown_titles,
                "Borrow records reference titles missing from the catalog"
            );
        }

        tracing::info!(
            books = books.len(),
            borrow_records = records.len(),
            "Catalog snapshot built"
        );

        Ok(Self {
            books,
            records,
            title_index,
            loaded_at: Utc::now(),
        })
    }

    /// Books in catalog order
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    /// Borrow records in load order
    pub fn records(&self) -> &[BorrowRecord] {
        &self.records
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn book_by_title(&self, title: &str) -> Option<&Book> {
        self.title_index.get(title).map(|&position| &self.books[position])
    }

    /// All borrow records of one employee, in load order
    pub fn borrowed_by(&self, employee_id: EmployeeId) -> Vec<&BorrowRecord> {
        self.records
            .iter()
            .filter(|record| record.employee_id == employee_id)
            .collect()
    }

    /// Distinct titles borrowed by one employee, in first-borrow order
    pub fn borrowed_titles(&self, employee_id: EmployeeId) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .filter(|record| record.employee_id == employee_id)
            .map(|record| record.title.as_str())
            .filter(|title| seen.insert(*title))
            .collect()
    }

    /// Features of each distinct book an employee borrowed
    ///
    /// Resolved against the catalog when the title is known there, otherwise
    /// taken from the borrow record itself.
    pub fn borrowed_features(&self, employee_id: EmployeeId) -> Vec<BookFeatures<'_>> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .filter(|record| record.employee_id == employee_id)
            .filter_map(|record| {
                if !seen.insert(record.title.as_str()) {
                    return None;
                }
                Some(match self.book_by_title(&record.title) {
                    Some(book) => BookFeatures::from(book),
                    None => BookFeatures::from(record),
                })
            })
            .collect()
    }

    /// Distinct employees, ordered by id
    pub fn employees(&self) -> Vec<Employee> {
        let mut employees: BTreeMap<EmployeeId, &str> = BTreeMap::new();
        for record in &self.records {
            employees
                .entry(record.employee_id)
                .or_insert(record.employee_name.as_str());
        }

        employees
            .into_iter()
            .map(|(id, name)| Employee {
                id,
                name: name.to_string(),
            })
            .collect()
    }

    /// Distinct catalog authors, sorted
    pub fn authors(&self) -> Vec<String> {
        self.books
            .iter()
            .map(|book| book.author.clone())
            .filter(|author| !author.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct normalized catalog tags, sorted
    pub fn categories(&self) -> Vec<String> {
        self.books
            .iter()
            .flat_map(|book| book.categories.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
