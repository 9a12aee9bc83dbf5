//! Cosine similarity and interaction count matrices

use std::collections::BTreeMap;

/// Cosine similarity of two dense vectors of equal length
///
/// Zero vectors have similarity 0 with everything.
pub fn cosine(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());

    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Sparse vector as `(dimension, value)` pairs sorted by dimension
pub type SparseVector = Vec<(usize, f64)>;

/// Cosine similarity of two sparse vectors
pub fn sparse_cosine(a: &[(usize, f64)], b: &[(usize, f64)]) -> f64 {
    let norm_a = a.iter().map(|(_, x)| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|(_, x)| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let (mut i, mut j, mut dot) = (0, 0, 0.0);
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                dot += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    dot / (norm_a * norm_b)
}

/// Dense row-by-column occurrence count matrix
///
/// Rows and columns are kept in key order, matching a pivot table.
#[derive(Debug, Clone)]
pub struct CountMatrix<R, C> {
    rows: Vec<R>,
    columns: Vec<C>,
    counts: Vec<Vec<f64>>,
}

impl<R: Ord + Clone, C: Ord + Clone> CountMatrix<R, C> {
    /// Counts each `(row, column)` occurrence
    pub fn from_pairs(pairs: impl IntoIterator<Item = (R, C)>) -> Self {
        let mut cells: BTreeMap<R, BTreeMap<C, f64>> = BTreeMap::new();
        let mut columns: BTreeMap<C, usize> = BTreeMap::new();

        for (row, column) in pairs {
            columns.entry(column.clone()).or_default();
            *cells.entry(row).or_default().entry(column).or_default() += 1.0;
        }

        for (position, slot) in columns.values_mut().enumerate() {
            *slot = position;
        }

        let mut rows = Vec::with_capacity(cells.len());
        let mut counts = Vec::with_capacity(cells.len());
        for (row, row_cells) in cells {
            let mut dense = vec![0.0; columns.len()];
            for (column, count) in row_cells {
                dense[columns[&column]] = count;
            }
            rows.push(row);
            counts.push(dense);
        }

        Self {
            rows,
            columns: columns.into_keys().collect(),
            counts,
        }
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn columns(&self) -> &[C] {
        &self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, key: &R) -> Option<&[f64]> {
        self.rows
            .binary_search(key)
            .ok()
            .map(|position| self.counts[position].as_slice())
    }

    /// Cosine similarity of the `key` row against every row, itself included,
    /// in row order. `None` when `key` is not a row of the matrix.
    pub fn similarities_to(&self, key: &R) -> Option<Vec<(&R, f64)>> {
        let target = self.row(key)?;
        Some(
            self.rows
                .iter()
                .zip(&self.counts)
                .map(|(row, counts)| (row, cosine(target, counts)))
                .collect(),
        )
    }
}
