//! # nutriparse
//!
//! Free-text nutrition extraction and brand resolution for diet
//! tracking: given an unstructured query or AI-generated answer, find
//! the branded food product it mentions (tolerating misspellings) and
//! pull structured macro-nutrient values out of prose, merged and
//! scored across multiple noisy sources.
//!
//! The crate is a library with no wire protocol of its own. Network
//! capabilities (web search, page scraping) are injected behind the
//! [`web_search::SearchProvider`] and [`scrape::NutritionScraper`]
//! traits; everything else is pure, synchronous computation.

pub mod aggregator;
pub mod brand_registry;
pub mod brand_resolver;
pub mod diary;
pub mod food_catalog;
pub mod fuzzy;
pub mod nutrition_extractor;
pub mod nutrition_model;
pub mod scrape;
pub mod web_search;
