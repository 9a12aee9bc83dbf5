use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;

use crate::services::categories;

/// Identifier of an employee in the borrowing history
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(pub u64);

impl Display for EmployeeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A book in the library catalog
///
/// `title` is the join key against borrow records and is unique within a
/// snapshot. `categories` holds the normalized tags in source order, duplicates
/// included.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    pub categories: Vec<String>,
}

impl Book {
    pub fn new(id: impl Into<String>, title: impl Into<String>, author: impl Into<String>, category: &str) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author: author.into(),
            categories: categories::split_tags(Some(category)),
        }
    }
}

/// One historical fact that an employee borrowed a book
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BorrowRecord {
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub title: String,
    pub author: String,
    pub categories: Vec<String>,
}

impl BorrowRecord {
    pub fn new(
        employee_id: u64,
        employee_name: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
        category: &str,
    ) -> Self {
        Self {
            employee_id: EmployeeId(employee_id),
            employee_name: employee_name.into(),
            title: title.into(),
            author: author.into(),
            categories: categories::split_tags(Some(category)),
        }
    }
}

/// Borrowed view over the fields every scorer reads
///
/// Lets a scorer treat a catalog book and a borrow record the same way.
#[derive(Debug, Clone, Copy)]
pub struct BookFeatures<'a> {
    pub title: &'a str,
    pub author: &'a str,
    pub categories: &'a [String],
}

impl<'a> From<&'a Book> for BookFeatures<'a> {
    fn from(book: &'a Book) -> Self {
        Self {
            title: &book.title,
            author: &book.author,
            categories: &book.categories,
        }
    }
}

impl<'a> From<&'a BorrowRecord> for BookFeatures<'a> {
    fn from(record: &'a BorrowRecord) -> Self {
        Self {
            title: &record.title,
            author: &record.author,
            categories: &record.categories,
        }
    }
}

// ============================================================================
// Raw input rows
// ============================================================================

/// Catalog row as supplied by the data loader: `{ID, TITLE, AUTHOR, CATEGORY}`
#[derive(Debug, Clone, Deserialize)]
pub struct BookRow {
    #[serde(rename = "ID", deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "TITLE")]
    pub title: String,
    #[serde(rename = "AUTHOR")]
    pub author: String,
    #[serde(rename = "CATEGORY", default)]
    pub category: Option<String>,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Book {
            id: row.id,
            title: row.title.trim().to_string(),
            author: row.author.trim().to_string(),
            categories: categories::split_tags(row.category.as_deref()),
        }
    }
}

/// Borrow row as supplied by the data loader:
/// `{EMPLOYEE_ID, EMPLOYEE_NAME, TITLE, AUTHOR, CATEGORY}`
#[derive(Debug, Clone, Deserialize)]
pub struct BorrowRow {
    #[serde(rename = "EMPLOYEE_ID")]
    pub employee_id: u64,
    #[serde(rename = "EMPLOYEE_NAME")]
    pub employee_name: String,
    #[serde(rename = "TITLE")]
    pub title: String,
    #[serde(rename = "AUTHOR")]
    pub author: String,
    #[serde(rename = "CATEGORY", default)]
    pub category: Option<String>,
}

impl From<BorrowRow> for BorrowRecord {
    fn from(row: BorrowRow) -> Self {
        BorrowRecord {
            employee_id: EmployeeId(row.employee_id),
            employee_name: row.employee_name.trim().to_string(),
            title: row.title.trim().to_string(),
            author: row.author.trim().to_string(),
            categories: categories::split_tags(row.category.as_deref()),
        }
    }
}

/// Spreadsheet exports carry book IDs as either numbers or strings
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_employee_id_display() {
        assert_eq!(format!("{}", EmployeeId(42)), "42");
    }

    #[test]
    fn test_employee_id_serde_is_transparent() {
        let json = serde_json::to_string(&EmployeeId(7)).unwrap();
        assert_eq!(json, "7");
    }

    #[test]
    fn test_book_row_with_numeric_id() {
        let json = r#"{"ID": 12, "TITLE": " Dune ", "AUTHOR": "Frank Herbert", "CATEGORY": "Fiction, Sci-Fi,"}"#;
        let book: Book = serde_json::from_str::<BookRow>(json).unwrap().into();

        assert_eq!(book.id, "12");
        assert_eq!(book.title, "Dune");
        assert_eq!(book.categories, vec!["Fiction", "Sci-Fi"]);
    }

    #[test]
    fn test_book_row_with_missing_category() {
        let json = r#"{"ID": "B-1", "TITLE": "Untagged", "AUTHOR": "Anon"}"#;
        let book: Book = serde_json::from_str::<BookRow>(json).unwrap().into();

        assert_eq!(book.id, "B-1");
        assert!(book.categories.is_empty());
    }

    #[test]
    fn test_book_row_with_null_category() {
        let json = r#"{"ID": 3, "TITLE": "Nulls", "AUTHOR": "Anon", "CATEGORY": null}"#;
        let book: Book = serde_json::from_str::<BookRow>(json).unwrap().into();
        assert!(book.categories.is_empty());
    }

    #[test]
    fn test_borrow_row_conversion() {
        let json = r#"{"EMPLOYEE_ID": 1001, "EMPLOYEE_NAME": "Sari", "TITLE": "Dune", "AUTHOR": "Frank Herbert", "CATEGORY": "Fiction,Fiction"}"#;
        let record: BorrowRecord = serde_json::from_str::<BorrowRow>(json).unwrap().into();

        assert_eq!(record.employee_id, EmployeeId(1001));
        assert_eq!(record.employee_name, "Sari");
        // Duplicate tags are preserved for frequency-based scoring
        assert_eq!(record.categories, vec!["Fiction", "Fiction"]);
    }
}
