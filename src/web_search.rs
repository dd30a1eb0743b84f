//! # Web Search Capability
//!
//! The aggregator consumes an external "fetch search results for a
//! query" capability. This module defines that boundary as a trait,
//! provides a DuckDuckGo Instant-Answer implementation, and ships a
//! mock provider for development and isolated testing (the aggregator
//! takes the provider by injection rather than reaching for a global).

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::nutrition_extractor::NutritionExtractor;
use crate::nutrition_model::NutritionFacts;

/// One raw result from an external search source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub snippet: String,
    pub url: String,
    /// Nutrition facts extracted from the snippet, if any
    pub nutrition: Option<NutritionFacts>,
}

/// External search capability consumed by the aggregator.
///
/// Implementations surface transport failures as errors; the aggregator
/// absorbs them per source so one bad provider call cannot fail the
/// whole query.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Search with a nutrition-flavored query.
    async fn search_nutrition(&self, query: &str) -> Result<Vec<SearchResult>>;

    /// Search with a brand-flavored query.
    async fn search_food_brand(&self, query: &str) -> Result<Vec<SearchResult>>;
}

#[async_trait]
impl<T: SearchProvider + ?Sized> SearchProvider for std::sync::Arc<T> {
    async fn search_nutrition(&self, query: &str) -> Result<Vec<SearchResult>> {
        (**self).search_nutrition(query).await
    }

    async fn search_food_brand(&self, query: &str) -> Result<Vec<SearchResult>> {
        (**self).search_food_brand(query).await
    }
}

/// DuckDuckGo Instant-Answer backend (free, no API key).
#[derive(Debug, Clone)]
pub struct DuckDuckGoSearch {
    client: reqwest::Client,
    extractor: NutritionExtractor,
}

impl DuckDuckGoSearch {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            extractor: NutritionExtractor::new(),
        }
    }

    async fn run_search(&self, search_query: &str, label: &str) -> Result<Vec<SearchResult>> {
        debug!("DuckDuckGo {} search: '{}'", label, search_query);

        let response = self
            .client
            .get("https://api.duckduckgo.com/")
            .query(&[
                ("q", search_query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await
            .context("DuckDuckGo request failed")?
            .error_for_status()
            .context("DuckDuckGo returned an error status")?;

        let data: Value = response
            .json()
            .await
            .context("DuckDuckGo response was not valid JSON")?;

        Ok(self.parse_results(&data, search_query))
    }

    /// Turn an Instant-Answer payload into search results: the abstract
    /// first, then up to three related topics. Malformed entries are
    /// skipped rather than failing the whole response.
    fn parse_results(&self, data: &Value, query: &str) -> Vec<SearchResult> {
        let mut results = Vec::new();

        if let Some(abstract_text) = data["Abstract"].as_str().filter(|s| !s.is_empty()) {
            results.push(self.build_result(
                data["AbstractSource"].as_str().unwrap_or(query),
                abstract_text,
                data["AbstractURL"].as_str().unwrap_or(""),
            ));
        }

        if let Some(topics) = data["RelatedTopics"].as_array() {
            for topic in topics.iter().take(3) {
                let Some(text) = topic["Text"].as_str().filter(|s| !s.is_empty()) else {
                    continue;
                };
                let title = text.split(" - ").next().unwrap_or(query);
                results.push(self.build_result(
                    title,
                    text,
                    topic["FirstURL"].as_str().unwrap_or(""),
                ));
            }
        }

        if results.is_empty() {
            warn!("DuckDuckGo returned no usable results for '{}'", query);
        }
        results
    }

    fn build_result(&self, title: &str, snippet: &str, url: &str) -> SearchResult {
        let facts = self.extractor.extract(snippet);
        SearchResult {
            title: title.to_string(),
            snippet: snippet.to_string(),
            url: url.to_string(),
            nutrition: if facts.is_empty() { None } else { Some(facts) },
        }
    }
}

impl Default for DuckDuckGoSearch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    async fn search_nutrition(&self, query: &str) -> Result<Vec<SearchResult>> {
        let search_query = format!("{} nutrition facts calories protein carbs fat", query);
        self.run_search(&search_query, "nutrition").await
    }

    async fn search_food_brand(&self, query: &str) -> Result<Vec<SearchResult>> {
        let search_query = format!("{} brand nutrition label ingredients", query);
        self.run_search(&search_query, "brand").await
    }
}

/// Canned-response provider for development and tests.
///
/// Counts calls per method so tests can assert caching behavior.
#[derive(Debug, Default)]
pub struct MockSearchProvider {
    nutrition_results: Vec<SearchResult>,
    brand_results: Vec<SearchResult>,
    fail_nutrition: bool,
    fail_brand: bool,
    nutrition_calls: std::sync::atomic::AtomicUsize,
    brand_calls: std::sync::atomic::AtomicUsize,
}

impl MockSearchProvider {
    pub fn new(nutrition_results: Vec<SearchResult>, brand_results: Vec<SearchResult>) -> Self {
        Self {
            nutrition_results,
            brand_results,
            ..Default::default()
        }
    }

    /// Make `search_nutrition` return an error instead of results.
    pub fn failing_nutrition(mut self) -> Self {
        self.fail_nutrition = true;
        self
    }

    /// Make `search_food_brand` return an error instead of results.
    pub fn failing_brand(mut self) -> Self {
        self.fail_brand = true;
        self
    }

    pub fn nutrition_calls(&self) -> usize {
        self.nutrition_calls.load(std::sync::atomic::Ordering::SeqCst)
    }

    pub fn brand_calls(&self) -> usize {
        self.brand_calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchProvider for MockSearchProvider {
    async fn search_nutrition(&self, _query: &str) -> Result<Vec<SearchResult>> {
        self.nutrition_calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if self.fail_nutrition {
            anyhow::bail!("mock nutrition search failure");
        }
        Ok(self.nutrition_results.clone())
    }

    async fn search_food_brand(&self, _query: &str) -> Result<Vec<SearchResult>> {
        self.brand_calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if self.fail_brand {
            anyhow::bail!("mock brand search failure");
        }
        Ok(self.brand_results.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_instant_answer_payload() {
        let search = DuckDuckGoSearch::new();
        let data = json!({
            "Abstract": "Greek yogurt has 59 calories and 10g protein per 100g.",
            "AbstractSource": "Wikipedia",
            "AbstractURL": "https://en.wikipedia.org/wiki/Greek_yogurt",
            "RelatedTopics": [
                { "Text": "Chobani - An American food company.", "FirstURL": "https://example.com/chobani" },
                { "Text": "Skyr - 63 calories per 100g.", "FirstURL": "https://example.com/skyr" },
                { "NoText": true },
                { "Text": "Fourth topic is dropped", "FirstURL": "https://example.com/4" }
            ]
        });

        let results = search.parse_results(&data, "greek yogurt");
        assert_eq!(results.len(), 3);

        assert_eq!(results[0].title, "Wikipedia");
        let facts = results[0].nutrition.as_ref().unwrap();
        assert_eq!(facts.calories, Some(59.0));
        assert_eq!(facts.protein, Some(10.0));

        assert_eq!(results[1].title, "Chobani");
        assert_eq!(results[1].nutrition, None);

        assert_eq!(results[2].nutrition.as_ref().unwrap().calories, Some(63.0));
    }

    #[test]
    fn test_parse_empty_payload() {
        let search = DuckDuckGoSearch::new();
        let results = search.parse_results(&json!({}), "anything");
        assert!(results.is_empty());
    }
}
