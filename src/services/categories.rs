//! Category tag normalization
//!
//! Category fields arrive as raw comma-separated strings. [`split_tags`] is the
//! single normalization step, applied once when a [`Book`] or [`BorrowRecord`]
//! is built. The set view used for overlap scoring and the exploded row view
//! used for frequency counting both read the normalized tags, so they can never
//! disagree.

use std::collections::HashSet;

use crate::models::{Book, BookFeatures, BorrowRecord, EmployeeId};

/// Splits a raw category field into trimmed, non-empty tags
///
/// Order and duplicates are preserved. An absent or blank field yields no tags.
pub fn split_tags(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Set view of normalized tags, used for overlap scoring
pub fn tag_set(tags: &[String]) -> HashSet<&str> {
    tags.iter().map(String::as_str).collect()
}

/// One (entity, tag) pair of the exploded view
#[derive(Debug, Clone, Copy)]
pub struct TagRow<'a> {
    /// Present when the row comes from the borrow table
    pub employee_id: Option<EmployeeId>,
    /// Present when the row comes from the catalog
    pub book_id: Option<&'a str>,
    pub features: BookFeatures<'a>,
    /// `None` for an entity without tags, which still gets one row
    pub tag: Option<&'a str>,
}

fn explode<'a>(
    employee_id: Option<EmployeeId>,
    book_id: Option<&'a str>,
    features: BookFeatures<'a>,
) -> impl Iterator<Item = TagRow<'a>> + 'a {
    let tags: Vec<Option<&'a str>> = if features.categories.is_empty() {
        vec![None]
    } else {
        features.categories.iter().map(|tag| Some(tag.as_str())).collect()
    };

    tags.into_iter().map(move |tag| TagRow {
        employee_id,
        book_id,
        features,
        tag,
    })
}

/// Exploded view of the catalog, one row per (book, tag)
pub fn explode_books(books: &[Book]) -> Vec<TagRow<'_>> {
    books
        .iter()
        .flat_map(|book| explode(None, Some(book.id.as_str()), BookFeatures::from(book)))
        .collect()
}

/// Exploded view of borrow records, one row per (record, tag)
pub fn explode_records(records: &[BorrowRecord]) -> Vec<TagRow<'_>> {
    records
        .iter()
        .flat_map(|record| explode(Some(record.employee_id), None, BookFeatures::from(record)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_tags_trims_and_drops_empty() {
        assert_eq!(
            split_tags(Some(" Fiction , Drama,")),
            vec!["Fiction".to_string(), "Drama".to_string()]
        );
    }

    #[test]
    fn test_split_tags_absent_or_blank() {
        assert!(split_tags(None).is_empty());
        assert!(split_tags(Some("")).is_empty());
        assert!(split_tags(Some(" , ,")).is_empty());
    }

    #[test]
    fn test_split_tags_keeps_duplicates() {
        assert_eq!(split_tags(Some("Drama,Drama")).len(), 2);
    }

    #[test]
    fn test_tag_set_deduplicates() {
        let tags = split_tags(Some("Drama, Drama, Fiction"));
        let set = tag_set(&tags);
        assert_eq!(set.len(), 2);
        assert!(set.contains("Drama"));
        assert!(set.contains("Fiction"));
    }

    #[test]
    fn test_explode_books_one_row_per_tag() {
        let books = vec![
            Book::new("1", "X", "Alice", "Fiction"),
            Book::new("2", "Y", "Bob", "Fiction,Drama"),
        ];
        let rows = explode_books(&books);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].features.title, "Y");
        assert_eq!(rows[1].tag, Some("Fiction"));
        assert_eq!(rows[2].tag, Some("Drama"));
        assert_eq!(rows[2].book_id, Some("2"));
        assert!(rows.iter().all(|row| row.employee_id.is_none()));
    }

    #[test]
    fn test_explode_keeps_untagged_entity() {
        let books = vec![Book::new("1", "Bare", "Alice", "")];
        let rows = explode_books(&books);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].tag, None);
    }

    #[test]
    fn test_explode_records_carries_employee() {
        let records = vec![BorrowRecord::new(7, "Sari", "X", "Alice", "Fiction, Drama")];
        let rows = explode_records(&records);

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.employee_id == Some(EmployeeId(7))));
        assert!(rows.iter().all(|row| row.book_id.is_none()));
    }
}
