//! Keyword-table query normalization.
//!
//! Matching and removal are plain substring operations on the lower-cased
//! query, with no word boundaries: a stem inside a longer word is found and
//! stripped too ("храмы" leaves "ы").

use geopoi_core::config::{CategoryStems, NormalizerSettings};
use geopoi_core::types::SearchFilters;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedQuery {
    /// In table order, each at most once.
    pub categories: Vec<String>,
    pub residual: String,
}

#[derive(Debug, Clone)]
pub struct QueryNormalizer {
    categories: Vec<CategoryStems>,
    stop_words: Vec<String>,
}

impl Default for QueryNormalizer {
    fn default() -> Self { Self::new(NormalizerSettings::default()) }
}

impl QueryNormalizer {
    pub fn new(settings: NormalizerSettings) -> Self {
        let categories = settings
            .categories
            .into_iter()
            .map(|c| CategoryStems {
                category: c.category,
                stems: c.stems.iter().map(|s| s.to_lowercase()).filter(|s| !s.is_empty()).collect(),
            })
            .collect();
        let stop_words =
            settings.stop_words.iter().map(|s| s.to_lowercase()).filter(|s| !s.is_empty()).collect();
        Self { categories, stop_words }
    }

    pub fn extract_categories(&self, query: &str) -> Vec<String> {
        let lowered = query.to_lowercase();
        self.categories
            .iter()
            .filter(|c| c.stems.iter().any(|stem| lowered.contains(stem.as_str())))
            .map(|c| c.category.clone())
            .collect()
    }

    /// Lower-case, strip stop-words then stems, collapse whitespace.
    pub fn residual(&self, query: &str) -> String {
        let mut text = query.to_lowercase();
        for word in &self.stop_words {
            text = text.replace(word.as_str(), "");
        }
        for stem in self.categories.iter().flat_map(|c| &c.stems) {
            text = text.replace(stem.as_str(), "");
        }
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    pub fn normalize(&self, query: &str) -> NormalizedQuery {
        NormalizedQuery { categories: self.extract_categories(query), residual: self.residual(query) }
    }

    /// Normalize and copy the extracted categories into `filters` unless the
    /// caller already chose some.
    pub fn apply(&self, query: &str, filters: &mut SearchFilters) -> NormalizedQuery {
        let normalized = self.normalize(query);
        if filters.categories.is_empty() && !normalized.categories.is_empty() {
            filters.categories = normalized.categories.clone();
        }
        normalized
    }
}
