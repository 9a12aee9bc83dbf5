pub mod catalog;
pub mod categories;
pub mod collaborative;
pub mod content;
pub mod knowledge;
pub mod ranking;
pub mod recommender;
pub mod similarity;
pub mod sources;
pub mod weighted;

pub use catalog::{CatalogError, CatalogSnapshot};
pub use recommender::{RecommendationSettings, Recommender};
