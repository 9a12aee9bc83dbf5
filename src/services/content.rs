//! Content-based scoring over TF-IDF vectors of "author + categories"

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::Deserialize;

use crate::{
    models::{BookFeatures, EmployeeId, RecommendationScore, Recommendations, Strategy},
    services::{
        catalog::CatalogSnapshot,
        ranking,
        similarity::{sparse_cosine, SparseVector},
    },
};

/// Stop-word list applied by the vectorizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopWords {
    /// Common English function words (pronouns, articles, auxiliaries and
    /// prepositions). Narrower than the larger academic lists, so content
    /// words such as "system" or "interest" are kept as terms.
    #[default]
    English,
    None,
}

const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few",
    "for", "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers",
    "herself", "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its",
    "itself", "me", "more", "most", "my", "myself", "no", "nor", "not", "of", "off", "on", "once",
    "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own", "same", "she",
    "should", "so", "some", "such", "than", "that", "the", "their", "theirs", "them",
    "themselves", "then", "there", "these", "they", "this", "those", "through", "to", "too",
    "under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "would", "you", "your", "yours", "yourself",
    "yourselves",
];

impl StopWords {
    fn contains(&self, token: &str) -> bool {
        match self {
            StopWords::English => ENGLISH_STOP_WORDS.contains(&token),
            StopWords::None => false,
        }
    }
}

/// Options for content-based scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentOptions {
    pub stop_words: StopWords,
    /// Drop titles the employee already borrowed from the ranked output
    pub exclude_borrowed: bool,
}

impl Default for ContentOptions {
    fn default() -> Self {
        Self {
            stop_words: StopWords::English,
            exclude_borrowed: true,
        }
    }
}

/// Text field a book is vectorized from
pub fn feature_text(features: &BookFeatures<'_>) -> String {
    let mut text = features.author.to_string();
    for tag in features.categories {
        text.push(' ');
        text.push_str(tag);
    }
    text
}

/// Lowercased word tokens of two or more characters
fn tokenize<'a>(text: &'a str, stop_words: StopWords) -> impl Iterator<Item = String> + 'a {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|word| word.chars().count() >= 2)
        .map(str::to_lowercase)
        .filter(move |word| !stop_words.contains(word))
}

/// TF-IDF vectorizer with smoothed IDF and L2-normalized rows
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    stop_words: StopWords,
}

impl TfidfVectorizer {
    /// Learns vocabulary and IDF weights from a corpus
    ///
    /// `idf(t) = ln((1 + n) / (1 + df(t))) + 1`; vocabulary indices follow
    /// alphabetical term order.
    pub fn fit<S: AsRef<str>>(documents: &[S], stop_words: StopWords) -> Self {
        let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();
        for document in documents {
            let terms: BTreeSet<String> = tokenize(document.as_ref(), stop_words).collect();
            for term in terms {
                *document_frequency.entry(term).or_default() += 1;
            }
        }

        let n = documents.len() as f64;
        let mut vocabulary = HashMap::with_capacity(document_frequency.len());
        let mut idf = Vec::with_capacity(document_frequency.len());
        for (index, (term, df)) in document_frequency.into_iter().enumerate() {
            idf.push(((1.0 + n) / (1.0 + df as f64)).ln() + 1.0);
            vocabulary.insert(term, index);
        }

        Self {
            vocabulary,
            idf,
            stop_words,
        }
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    /// Projects a document onto the fitted vocabulary; unseen terms are ignored
    pub fn transform(&self, document: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in tokenize(document, self.stop_words) {
            if let Some(&index) = self.vocabulary.get(&term) {
                *counts.entry(index).or_default() += 1.0;
            }
        }

        let mut vector: SparseVector = counts
            .into_iter()
            .map(|(index, tf)| (index, tf * self.idf[index]))
            .collect();

        let norm = vector.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, weight) in vector.iter_mut() {
                *weight /= norm;
            }
        }
        vector
    }
}

/// Recommends catalog books by mean cosine similarity to the borrowed books
///
/// The vectorizer is fitted on the whole catalog and reused, never refitted,
/// for the borrowed books.
pub fn recommend(
    snapshot: &CatalogSnapshot,
    employee_id: EmployeeId,
    top_n: usize,
    options: ContentOptions,
) -> Recommendations {
    let history = snapshot.borrowed_features(employee_id);
    if history.is_empty() {
        tracing::info!(employee_id = %employee_id, "No borrow history for content-based scoring");
        return Recommendations::no_history(Strategy::ContentBased);
    }

    let catalog_texts: Vec<String> = snapshot
        .books()
        .iter()
        .map(|book| feature_text(&BookFeatures::from(book)))
        .collect();
    let vectorizer = TfidfVectorizer::fit(&catalog_texts, options.stop_words);

    let catalog_vectors: Vec<SparseVector> = catalog_texts
        .iter()
        .map(|text| vectorizer.transform(text))
        .collect();
    let borrowed_vectors: Vec<SparseVector> = history
        .iter()
        .map(|features| vectorizer.transform(&feature_text(features)))
        .collect();

    tracing::debug!(
        employee_id = %employee_id,
        vocabulary = vectorizer.vocabulary_len(),
        borrowed = borrowed_vectors.len(),
        "Content vectors built"
    );

    let borrowed_titles: HashSet<&str> = history.iter().map(|features| features.title).collect();
    let n = borrowed_vectors.len() as f64;

    let candidates: Vec<RecommendationScore> = snapshot
        .books()
        .iter()
        .zip(&catalog_vectors)
        .filter(|(book, _)| !(options.exclude_borrowed && borrowed_titles.contains(book.title.as_str())))
        .map(|(book, vector)| {
            let mean = borrowed_vectors
                .iter()
                .map(|borrowed| sparse_cosine(borrowed, vector))
                .sum::<f64>()
                / n;
            RecommendationScore::for_book(book, mean)
        })
        .collect();

    Recommendations::ok(Strategy::ContentBased, ranking::top_n(candidates, top_n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Book, BorrowRecord, RecommendationStatus};
    use crate::services::catalog::fixtures::{library, scenario_catalog};

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_feature_text() {
        let book = Book::new("1", "Y", "Bob Smith", "Fiction, Drama");
        assert_eq!(feature_text(&BookFeatures::from(&book)), "Bob Smith Fiction Drama");
    }

    #[test]
    fn test_tokenize_lowercases_and_drops_short_and_stop_words() {
        let tokens: Vec<String> = tokenize("The Sci-Fi of A Tale", StopWords::English).collect();
        assert_eq!(tokens, vec!["sci", "fi", "tale"]);

        let tokens: Vec<String> = tokenize("The Tale", StopWords::None).collect();
        assert_eq!(tokens, vec!["the", "tale"]);
    }

    #[test]
    fn test_english_list_keeps_content_words() {
        let tokens: Vec<String> =
            tokenize("Systems of Interest for the Whole Family", StopWords::English).collect();
        assert_eq!(tokens, vec!["systems", "interest", "whole", "family"]);
    }

    #[test]
    fn test_fit_smoothed_idf() {
        let vectorizer = TfidfVectorizer::fit(&["alice fiction", "bob fiction"], StopWords::English);
        assert_eq!(vectorizer.vocabulary_len(), 3);

        // "fiction" appears everywhere: ln(3/3) + 1 = 1; "alice": ln(3/2) + 1
        let fiction = vectorizer.vocabulary["fiction"];
        let alice = vectorizer.vocabulary["alice"];
        assert!((vectorizer.idf[fiction] - 1.0).abs() < EPSILON);
        assert!((vectorizer.idf[alice] - ((1.5f64).ln() + 1.0)).abs() < EPSILON);
    }

    #[test]
    fn test_transform_is_unit_length_and_ignores_unknown_terms() {
        let vectorizer = TfidfVectorizer::fit(&["alice fiction", "bob drama"], StopWords::English);
        let vector = vectorizer.transform("alice fiction unknown");
        let norm: f64 = vector.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();

        assert_eq!(vector.len(), 2);
        assert!((norm - 1.0).abs() < EPSILON);
        assert!(vectorizer.transform("nothing known").is_empty());
    }

    #[test]
    fn test_prefers_same_author_and_categories() {
        let snapshot = library();
        // Sari borrowed Dune and Sapiens; Children of Dune matches Dune exactly
        let result = recommend(&snapshot, EmployeeId(1), 3, ContentOptions::default());

        assert_eq!(result.status, RecommendationStatus::Ok);
        assert_eq!(result.items[0].title, "Children of Dune");
    }

    #[test]
    fn test_excludes_borrowed_by_default() {
        let snapshot = library();
        let borrowed = snapshot.borrowed_titles(EmployeeId(1));
        let result = recommend(&snapshot, EmployeeId(1), 10, ContentOptions::default());

        assert!(result.items.iter().all(|item| !borrowed.contains(&item.title.as_str())));
    }

    #[test]
    fn test_can_keep_borrowed_titles() {
        let records = vec![BorrowRecord::new(1, "E1", "X", "Alice", "Fiction")];
        let snapshot = CatalogSnapshot::new(scenario_catalog(), records).unwrap();
        let options = ContentOptions {
            exclude_borrowed: false,
            ..ContentOptions::default()
        };

        let result = recommend(&snapshot, EmployeeId(1), 3, options);
        assert_eq!(result.items[0].title, "X");
        assert!((result.items[0].score - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_scores_are_mean_similarities() {
        let snapshot = library();
        let result = recommend(&snapshot, EmployeeId(3), 10, ContentOptions::default());
        assert!(result.items.iter().all(|item| (0.0..=1.0 + EPSILON).contains(&item.score)));
    }

    #[test]
    fn test_no_history() {
        let result = recommend(&library(), EmployeeId(404), 3, ContentOptions::default());
        assert_eq!(result.status, RecommendationStatus::NoHistory);
        assert!(result.items.is_empty());
    }

    #[test]
    fn test_respects_top_n() {
        let result = recommend(&library(), EmployeeId(2), 2, ContentOptions::default());
        assert_eq!(result.items.len(), 2);
    }
}
