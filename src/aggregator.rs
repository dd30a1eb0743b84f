//! # Result Fusion / Source Aggregator
//!
//! Combines partial, possibly conflicting nutrition data from multiple
//! independent text sources into one best answer.
//!
//! ## Procedure
//!
//! 1. Issue the nutrition-flavored and brand-flavored searches
//!    concurrently; a failed search degrades to zero results from that
//!    source and never aborts the query.
//! 2. Deduplicate results by URL (or snippet/title prefix when the URL
//!    is missing); colliding results merge their facts field-wise with
//!    the first-seen value winning.
//! 3. Enrich incomplete results (fewer than three populated macro
//!    fields) by scraping their URL, fanned out concurrently with a
//!    bounded per-scrape timeout. Scrape failures are swallowed; the
//!    result being enriched is kept as-is.
//! 4. Score every result for data presence, completeness, and brevity;
//!    the highest score wins, ties going to the earliest result.
//!
//! A process-lifetime cache keyed by normalized query avoids repeat
//! network calls within a session.

use futures::future::join_all;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::timeout;

use crate::scrape::NutritionScraper;
use crate::web_search::{SearchProvider, SearchResult};

// Scoring weights: presence of any facts, per-field presence, and
// per-populated-macro completeness reinforcement.
const FACTS_PRESENT_SCORE: i64 = 20;
const CALORIES_SCORE: i64 = 6;
const PROTEIN_SCORE: i64 = 5;
const CARBS_SCORE: i64 = 4;
const FAT_SCORE: i64 = 4;
const PER_MACRO_SCORE: i64 = 3;
const MAX_BREVITY_BONUS: i64 = 10;

/// Tunable aggregation parameters.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Upper bound on each individual scrape call. Must be finite: a
    /// slow page must not stall the whole aggregation.
    pub scrape_timeout: Duration,
    /// Results with fewer populated macro fields than this are scraped
    /// for enrichment.
    pub enrichment_macro_threshold: usize,
    /// Characters of snippet/title used as the dedup key when a result
    /// has no URL.
    pub dedup_prefix_chars: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            scrape_timeout: Duration::from_secs(10),
            enrichment_macro_threshold: 3,
            dedup_prefix_chars: 200,
        }
    }
}

/// Multi-source nutrition aggregator over injected search and scrape
/// capabilities.
pub struct NutritionAggregator<S, C> {
    search: S,
    scraper: C,
    config: AggregatorConfig,
    cache: Mutex<HashMap<String, SearchResult>>,
}

impl<S: SearchProvider, C: NutritionScraper> NutritionAggregator<S, C> {
    pub fn new(search: S, scraper: C) -> Self {
        Self::with_config(search, scraper, AggregatorConfig::default())
    }

    pub fn with_config(search: S, scraper: C, config: AggregatorConfig) -> Self {
        Self {
            search,
            scraper,
            config,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Find the single best combined nutrition answer for a query.
    ///
    /// Returns `None` when both searches come back empty, so callers
    /// should present a "no information found" outcome rather than a
    /// zeroed-out nutrition card.
    pub async fn get_best_nutrition(&self, query: &str) -> Option<SearchResult> {
        let normalized = query.trim().to_lowercase();

        if let Some(cached) = self.cache.lock().unwrap().get(&normalized) {
            debug!("Cache hit for '{}'", normalized);
            return Some(cached.clone());
        }

        let (nutrition_results, brand_results) = tokio::join!(
            self.search.search_nutrition(query),
            self.search.search_food_brand(query)
        );

        let mut combined = Vec::new();
        combined.extend(absorb_search_outcome(nutrition_results, "nutrition"));
        combined.extend(absorb_search_outcome(brand_results, "brand"));

        if combined.is_empty() {
            info!("No search results at all for '{}'", normalized);
            return None;
        }

        let mut results = self.deduplicate(combined);
        self.enrich(&mut results).await;

        let best = pick_best(results)?;
        debug!(
            "Best source for '{}': '{}' ({})",
            normalized, best.title, best.url
        );

        self.cache
            .lock()
            .unwrap()
            .insert(normalized, best.clone());
        Some(best)
    }

    /// Collapse near-identical sources, keeping first-seen order and
    /// merging facts field-wise (first non-empty value wins).
    fn deduplicate(&self, combined: Vec<SearchResult>) -> Vec<SearchResult> {
        let mut kept: Vec<SearchResult> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for result in combined {
            let key = dedup_key(&result, self.config.dedup_prefix_chars);
            match index.get(&key) {
                Some(&pos) => {
                    kept[pos].nutrition = match (kept[pos].nutrition.take(), result.nutrition) {
                        (Some(first), Some(second)) => Some(first.merged_with(&second)),
                        (first, second) => first.or(second),
                    };
                }
                None => {
                    index.insert(key, kept.len());
                    kept.push(result);
                }
            }
        }

        debug!("Deduplicated to {} result(s)", kept.len());
        kept
    }

    /// Scrape URLs of incomplete results concurrently and fold any
    /// recovered facts in. Best-effort: timeouts and failures never
    /// drop the result they were enriching.
    async fn enrich(&self, results: &mut [SearchResult]) {
        let targets: Vec<(usize, String)> = results
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.url.is_empty() && self.needs_enrichment(r))
            .map(|(i, r)| (i, r.url.clone()))
            .collect();

        if targets.is_empty() {
            return;
        }

        let scrapes = targets.into_iter().map(|(i, url)| async move {
            let outcome = timeout(self.config.scrape_timeout, self.scraper.scrape(&url)).await;
            (i, url, outcome)
        });

        for (i, url, outcome) in join_all(scrapes).await {
            match outcome {
                Ok(Ok(Some(scraped))) => {
                    debug!("Enriched result {} from '{}'", i, url);
                    results[i].nutrition = Some(match results[i].nutrition.take() {
                        Some(existing) => existing.merged_with(&scraped),
                        None => scraped,
                    });
                }
                Ok(Ok(None)) => {}
                Ok(Err(err)) => warn!("Scrape of '{}' failed: {:#}", url, err),
                Err(_) => warn!(
                    "Scrape of '{}' timed out after {:?}",
                    url, self.config.scrape_timeout
                ),
            }
        }
    }

    fn needs_enrichment(&self, result: &SearchResult) -> bool {
        result
            .nutrition
            .as_ref()
            .map_or(true, |f| f.populated_macro_fields() < self.config.enrichment_macro_threshold)
    }
}

/// A failed search contributes zero results; it is logged and the query
/// continues on the other source.
fn absorb_search_outcome(
    outcome: anyhow::Result<Vec<SearchResult>>,
    label: &str,
) -> Vec<SearchResult> {
    match outcome {
        Ok(results) => results,
        Err(err) => {
            warn!("{} search failed: {:#}", label, err);
            Vec::new()
        }
    }
}

/// Dedup key: the URL when present, otherwise a prefix of the snippet
/// (or the title for snippet-less results).
fn dedup_key(result: &SearchResult, prefix_chars: usize) -> String {
    if !result.url.is_empty() {
        return result.url.clone();
    }
    let basis = if result.snippet.is_empty() {
        &result.title
    } else {
        &result.snippet
    };
    basis.chars().take(prefix_chars).collect()
}

/// Score one result for data presence, completeness, and brevity.
fn score(result: &SearchResult) -> i64 {
    let mut score = 0;

    if let Some(facts) = &result.nutrition {
        score += FACTS_PRESENT_SCORE;
        if facts.calories.is_some() {
            score += CALORIES_SCORE;
        }
        if facts.protein.is_some() {
            score += PROTEIN_SCORE;
        }
        if facts.carbs.is_some() {
            score += CARBS_SCORE;
        }
        if facts.fat.is_some() {
            score += FAT_SCORE;
        }
        score += PER_MACRO_SCORE * facts.populated_macro_fields() as i64;
    }

    score + brevity_bonus(&result.snippet)
}

/// Small saturating bonus favoring shorter snippets: denser sources
/// tend to be nutrition tables rather than prose.
fn brevity_bonus(snippet: &str) -> i64 {
    (1000 / (snippet.chars().count() as i64 + 50)).min(MAX_BREVITY_BONUS)
}

/// Highest score wins; only a strictly greater score replaces the
/// incumbent, so equal scores keep the earliest result.
fn pick_best(results: Vec<SearchResult>) -> Option<SearchResult> {
    let mut best: Option<(i64, SearchResult)> = None;

    for result in results {
        let result_score = score(&result);
        match &best {
            Some((incumbent, _)) if *incumbent >= result_score => {}
            _ => best = Some((result_score, result)),
        }
    }

    best.map(|(_, r)| r)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition_model::NutritionFacts;

    fn result(title: &str, snippet: &str, url: &str) -> SearchResult {
        SearchResult {
            title: title.to_string(),
            snippet: snippet.to_string(),
            url: url.to_string(),
            nutrition: None,
        }
    }

    #[test]
    fn test_dedup_key_prefers_url() {
        let r = result("t", "snippet text", "https://example.com/a");
        assert_eq!(dedup_key(&r, 200), "https://example.com/a");
    }

    #[test]
    fn test_dedup_key_falls_back_to_snippet_prefix() {
        let long_snippet = "x".repeat(500);
        let r = result("t", &long_snippet, "");
        assert_eq!(dedup_key(&r, 200).chars().count(), 200);

        let titled = result("just a title", "", "");
        assert_eq!(dedup_key(&titled, 200), "just a title");
    }

    #[test]
    fn test_score_rewards_completeness() {
        let bare = result("t", "some snippet", "");

        let mut partial = bare.clone();
        partial.nutrition = Some(NutritionFacts {
            calories: Some(100.0),
            ..Default::default()
        });

        let mut full = bare.clone();
        full.nutrition = Some(NutritionFacts {
            calories: Some(100.0),
            protein: Some(10.0),
            carbs: Some(20.0),
            fat: Some(5.0),
            ..Default::default()
        });

        assert!(score(&partial) > score(&bare));
        assert!(score(&full) > score(&partial));
        // 20 + 6+5+4+4 + 4*3 = 51 plus the brevity bonus.
        assert_eq!(score(&full) - brevity_bonus(&full.snippet), 51);
    }

    #[test]
    fn test_brevity_bonus_saturates() {
        assert_eq!(brevity_bonus(""), MAX_BREVITY_BONUS);
        assert!(brevity_bonus(&"y".repeat(2000)) >= 0);
        assert!(brevity_bonus("short") > brevity_bonus(&"y".repeat(400)));
    }

    #[test]
    fn test_pick_best_ties_go_to_earliest() {
        let first = result("first", "same length!", "");
        let second = result("second", "same length!", "");
        let best = pick_best(vec![first.clone(), second]).unwrap();
        assert_eq!(best.title, "first");
    }
}
