//! # Nutrition Page Scraper
//!
//! Best-effort recovery of nutrition facts from a product or menu page.
//! Structured data (JSON-LD `nutrition` blocks, the schema.org
//! `NutritionInformation` shape) is tried first; when a page carries
//! none, the body text is run through the nutrition extractor.
//!
//! Scraping is an enrichment step: failures are reported as errors so
//! the aggregator can swallow them per source, and a page without any
//! recoverable data is simply `None`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use lazy_static::lazy_static;
use log::{debug, trace};
use scraper::{Html, Selector};
use serde_json::Value;

use crate::nutrition_extractor::NutritionExtractor;
use crate::nutrition_model::NutritionFacts;

lazy_static! {
    static ref JSON_LD_SELECTOR: Selector =
        Selector::parse(r#"script[type="application/ld+json"]"#)
            .expect("JSON-LD selector should be valid");
    static ref NUMBER_REGEX: regex::Regex =
        regex::Regex::new(r"(\d+(?:\.\d+)?)").expect("Number pattern should be valid");
}

/// External page-scrape capability consumed by the aggregator.
#[async_trait]
pub trait NutritionScraper: Send + Sync {
    /// Fetch the URL and recover any nutrition facts present.
    ///
    /// `Ok(None)` means "page reachable but no data"; `Err` means the
    /// fetch itself failed.
    async fn scrape(&self, url: &str) -> Result<Option<NutritionFacts>>;
}

#[async_trait]
impl<T: NutritionScraper + ?Sized> NutritionScraper for std::sync::Arc<T> {
    async fn scrape(&self, url: &str) -> Result<Option<NutritionFacts>> {
        (**self).scrape(url).await
    }
}

/// HTTP scraper: JSON-LD first, body-text heuristics as fallback.
#[derive(Debug, Clone)]
pub struct HttpNutritionScraper {
    client: reqwest::Client,
    extractor: NutritionExtractor,
}

impl HttpNutritionScraper {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            extractor: NutritionExtractor::new(),
        }
    }

    /// Parse a fetched HTML document for nutrition facts.
    ///
    /// Synchronous on purpose: the parsed DOM never crosses an await
    /// point, so the surrounding future stays `Send`.
    pub fn parse_nutrition_html(&self, html: &str) -> Option<NutritionFacts> {
        let document = Html::parse_document(html);

        for script in document.select(&JSON_LD_SELECTOR) {
            let raw = script.text().collect::<String>();
            let Ok(parsed) = serde_json::from_str::<Value>(&raw) else {
                trace!("Skipping unparseable JSON-LD block");
                continue;
            };
            if let Some(facts) = nutrition_from_json_ld(&parsed) {
                debug!("Recovered nutrition facts from JSON-LD");
                return Some(facts);
            }
        }

        // Fallback: heuristic extraction over the visible text.
        let body_text = document
            .root_element()
            .text()
            .collect::<Vec<_>>()
            .join(" ");
        let facts = self.extractor.extract(&body_text);
        if facts.is_empty() {
            None
        } else {
            debug!("Recovered nutrition facts from page text");
            Some(facts)
        }
    }
}

impl Default for HttpNutritionScraper {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NutritionScraper for HttpNutritionScraper {
    async fn scrape(&self, url: &str) -> Result<Option<NutritionFacts>> {
        if url.is_empty() {
            return Ok(None);
        }

        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, "Mozilla/5.0")
            .send()
            .await
            .with_context(|| format!("Fetching '{}' failed", url))?;

        if !response.status().is_success() {
            debug!("Scrape of '{}' returned status {}", url, response.status());
            return Ok(None);
        }

        let html = response
            .text()
            .await
            .with_context(|| format!("Reading body of '{}' failed", url))?;

        Ok(self.parse_nutrition_html(&html))
    }
}

/// Pull a schema.org `nutrition` block out of a JSON-LD document. The
/// document may be a single object, an array, or carry an `@graph`.
fn nutrition_from_json_ld(value: &Value) -> Option<NutritionFacts> {
    match value {
        Value::Array(items) => items.iter().find_map(nutrition_from_json_ld),
        Value::Object(map) => {
            if let Some(nutrition) = map.get("nutrition") {
                let facts = NutritionFacts {
                    calories: json_ld_number(nutrition.get("calories")),
                    protein: json_ld_number(nutrition.get("proteinContent")),
                    carbs: json_ld_number(nutrition.get("carbohydrateContent")),
                    fat: json_ld_number(nutrition.get("fatContent")),
                    fiber: json_ld_number(nutrition.get("fiberContent")),
                    sugar: json_ld_number(nutrition.get("sugarContent")),
                    serving_size: nutrition
                        .get("servingSize")
                        .and_then(|v| v.as_str())
                        .map(|s| s.to_string()),
                };
                if !facts.is_empty() {
                    return Some(facts);
                }
            }
            map.get("@graph").and_then(nutrition_from_json_ld)
        }
        _ => None,
    }
}

/// JSON-LD nutrition values arrive as numbers or strings like "240
/// calories" / "10 g"; either way the leading numeric is the value.
fn json_ld_number(value: Option<&Value>) -> Option<f64> {
    let value = value?;
    if let Some(n) = value.as_f64() {
        return Some(n);
    }
    let text = value.as_str()?;
    NUMBER_REGEX
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Canned scraper for development and tests: maps URLs to facts, can be
/// told to fail for specific URLs, and can delay responses to exercise
/// timeout handling.
#[derive(Debug, Default)]
pub struct MockNutritionScraper {
    responses: std::collections::HashMap<String, NutritionFacts>,
    failing_urls: std::collections::HashSet<String>,
    delay: Option<std::time::Duration>,
    calls: std::sync::atomic::AtomicUsize,
}

impl MockNutritionScraper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, url: &str, facts: NutritionFacts) -> Self {
        self.responses.insert(url.to_string(), facts);
        self
    }

    pub fn failing_for(mut self, url: &str) -> Self {
        self.failing_urls.insert(url.to_string());
        self
    }

    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[async_trait]
impl NutritionScraper for MockNutritionScraper {
    async fn scrape(&self, url: &str) -> Result<Option<NutritionFacts>> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing_urls.contains(url) {
            anyhow::bail!("mock scrape failure for '{}'", url);
        }
        Ok(self.responses.get(url).cloned())
    }
}
