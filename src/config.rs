use serde::Deserialize;

use crate::{
    models::CriteriaWeights,
    services::{
        content::{ContentOptions, StopWords},
        recommender::RecommendationSettings,
    },
};

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Catalog JSON export
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,

    /// Borrow-record JSON export
    #[serde(default = "default_borrowers_path")]
    pub borrowers_path: String,

    /// Result size for employee strategies
    #[serde(default = "default_top_n")]
    pub default_top_n: usize,

    /// Result size for weighted-criteria requests
    #[serde(default = "default_criteria_top_n")]
    pub criteria_top_n: usize,

    #[serde(default = "default_author_weight")]
    pub author_weight: f64,

    #[serde(default = "default_category_weight")]
    pub category_weight: f64,

    /// `english` or `none`
    #[serde(default)]
    pub content_stop_words: StopWords,

    /// Keep already-borrowed titles out of content-based results
    #[serde(default = "default_content_exclude_borrowed")]
    pub content_exclude_borrowed: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_catalog_path() -> String {
    "data/books.json".to_string()
}

fn default_borrowers_path() -> String {
    "data/borrowers.json".to_string()
}

fn default_top_n() -> usize {
    3
}

fn default_criteria_top_n() -> usize {
    5
}

fn default_author_weight() -> f64 {
    0.4
}

fn default_category_weight() -> f64 {
    0.6
}

fn default_content_exclude_borrowed() -> bool {
    true
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.default_top_n == 0 || self.criteria_top_n == 0 {
            anyhow::bail!("Result sizes must be at least 1");
        }
        let invalid = |w: f64| !w.is_finite() || w < 0.0;
        if invalid(self.author_weight) || invalid(self.category_weight) {
            anyhow::bail!("Criteria weights must be finite and non-negative");
        }
        Ok(())
    }

    /// Recommendation tunables derived from this configuration
    pub fn recommendation_settings(&self) -> RecommendationSettings {
        RecommendationSettings {
            default_top_n: self.default_top_n,
            criteria_top_n: self.criteria_top_n,
            weights: CriteriaWeights {
                author: self.author_weight,
                category: self.category_weight,
            },
            content: ContentOptions {
                stop_words: self.content_stop_words,
                exclude_borrowed: self.content_exclude_borrowed,
            },
        }
    }
}
