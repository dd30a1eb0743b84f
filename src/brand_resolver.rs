//! # Brand Resolver
//!
//! This module identifies which commercial brand, if any, a free-text
//! mention refers to, tolerating misspellings and phrasing variation.
//!
//! ## Matching tiers
//!
//! Tiers are tried in strict priority order; the first success wins and
//! determines the confidence score:
//!
//! 1. **Exact key match**: normalized query is a registry key (1.0)
//! 2. **Fuzzy match**: closest key or alias within the configured edit
//!    distance; ties go to the first entry in registry order (0.8)
//! 3. **Token extraction**: each whitespace token of length ≥ 3 is
//!    tried exact-then-fuzzy; first hit wins (0.7)
//! 4. **Substring containment**: query contains a key/alias, or a
//!    key/alias contains the query (0.6)
//!
//! If no tier succeeds the resolver returns `None`; it never guesses.
//!
//! ## Usage
//!
//! ```rust
//! use nutriparse::brand_registry::default_registry;
//! use nutriparse::brand_resolver::BrandResolver;
//!
//! let resolver = BrandResolver::new(default_registry());
//! let resolved = resolver.recognize_brand("chobni greek yogurt").unwrap();
//!
//! assert_eq!(resolved.brand, "Chobani");
//! assert_eq!(resolved.confidence, 0.8); // fuzzy tier
//! ```

use lazy_static::lazy_static;
use log::{debug, trace};
use regex::Regex;

use crate::brand_registry::{BrandEntry, BrandRegistry, NutritionProfile, ProfileHint};
use crate::fuzzy::levenshtein;

/// Filler words stripped from the residual product-name phrase.
const FILLER_WORDS: &str = r"(?i)\b(?:brand|product|food|item|the|a|an)\b";

lazy_static! {
    static ref FILLER_REGEX: Regex =
        Regex::new(FILLER_WORDS).expect("Filler word pattern should be valid");
}

/// Tunable thresholds for the matching tiers.
///
/// The confidence values and the edit-distance bound are configuration
/// points rather than constants baked into the matching logic.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Maximum accepted edit distance for fuzzy matches
    pub max_edit_distance: usize,
    /// Confidence assigned by the exact-key tier
    pub exact_confidence: f64,
    /// Confidence assigned by the fuzzy tier
    pub fuzzy_confidence: f64,
    /// Confidence assigned by the token-extraction tier
    pub token_confidence: f64,
    /// Confidence assigned by the substring-containment tier
    pub substring_confidence: f64,
    /// Minimum token length considered by the token tier
    pub min_token_length: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_edit_distance: 2,
            exact_confidence: 1.0,
            fuzzy_confidence: 0.8,
            token_confidence: 0.7,
            substring_confidence: 0.6,
            min_token_length: 3,
        }
    }
}

/// A scored brand resolution for one query.
///
/// Ephemeral: created per call and consumed immediately by callers.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBrand {
    /// Canonical brand name from the registry
    pub brand: String,
    /// Residual product-name phrase extracted from the query
    pub product_name: String,
    /// Brand and product name combined for display
    pub full_name: String,
    /// Confidence in [0, 1], determined by the matching tier
    pub confidence: f64,
    /// The brand's nutrition-profile tag
    pub profile: NutritionProfile,
    /// Descriptive hint derived from the profile
    pub hint: ProfileHint,
}

/// Brand recognizer over a [`BrandRegistry`].
#[derive(Debug, Clone)]
pub struct BrandResolver {
    registry: BrandRegistry,
    config: ResolverConfig,
}

impl BrandResolver {
    /// Create a resolver with default thresholds.
    pub fn new(registry: BrandRegistry) -> Self {
        Self::with_config(registry, ResolverConfig::default())
    }

    /// Create a resolver with custom thresholds.
    pub fn with_config(registry: BrandRegistry, config: ResolverConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &BrandRegistry {
        &self.registry
    }

    /// Recognize the best-matching brand in free text.
    ///
    /// Returns `None` when no tier produces a match.
    pub fn recognize_brand(&self, query: &str) -> Option<ResolvedBrand> {
        let normalized = BrandRegistry::normalize_key(query);
        if normalized.is_empty() {
            return None;
        }

        if let Some(entry) = self.registry.lookup_exact(&normalized) {
            debug!("Exact brand match for '{}': {}", normalized, entry.name);
            return Some(self.resolved(entry, query, self.config.exact_confidence));
        }

        if let Some(entry) = self.find_fuzzy_brand(&normalized) {
            debug!("Fuzzy brand match for '{}': {}", normalized, entry.name);
            return Some(self.resolved(entry, query, self.config.fuzzy_confidence));
        }

        if let Some(entry) = self.find_brand_in_tokens(&normalized) {
            debug!("Token brand match for '{}': {}", normalized, entry.name);
            return Some(self.resolved(entry, query, self.config.token_confidence));
        }

        if let Some(entry) = self.find_substring_brand(&normalized) {
            debug!("Substring brand match for '{}': {}", normalized, entry.name);
            return Some(self.resolved(entry, query, self.config.substring_confidence));
        }

        trace!("No brand match for '{}'", normalized);
        None
    }

    /// Closest key or alias by edit distance, bounded by the configured
    /// maximum. Strictly-smaller distance replaces the incumbent, so a
    /// tie keeps the first entry in registry order.
    fn find_fuzzy_brand(&self, query: &str) -> Option<&BrandEntry> {
        let mut best: Option<&BrandEntry> = None;
        let mut best_distance = usize::MAX;

        for (key, entry) in self.registry.entries() {
            let key_distance = levenshtein(query, key);
            if key_distance < best_distance && key_distance <= self.config.max_edit_distance {
                best_distance = key_distance;
                best = Some(entry);
            }

            for alias in &entry.aliases {
                let alias_distance = levenshtein(query, alias);
                if alias_distance < best_distance
                    && alias_distance <= self.config.max_edit_distance
                {
                    best_distance = alias_distance;
                    best = Some(entry);
                }
            }
        }

        best
    }

    /// Try each sufficiently long whitespace token exact-then-fuzzy.
    fn find_brand_in_tokens(&self, query: &str) -> Option<&BrandEntry> {
        for token in query.split_whitespace() {
            if token.chars().count() < self.config.min_token_length {
                continue;
            }
            if let Some(entry) = self.registry.lookup_exact(token) {
                return Some(entry);
            }
            if let Some(entry) = self.find_fuzzy_brand(token) {
                return Some(entry);
            }
        }
        None
    }

    /// Containment in either direction against keys and aliases.
    fn find_substring_brand(&self, query: &str) -> Option<&BrandEntry> {
        for (key, entry) in self.registry.entries() {
            if query.contains(key) || key.contains(query) {
                return Some(entry);
            }
            for alias in &entry.aliases {
                if query.contains(alias.as_str()) || alias.contains(query) {
                    return Some(entry);
                }
            }
        }
        None
    }

    fn resolved(&self, entry: &BrandEntry, query: &str, confidence: f64) -> ResolvedBrand {
        let product_name = self.extract_product_name(query, entry);
        let full_name = format!("{} {}", entry.name, product_name)
            .trim()
            .to_string();

        ResolvedBrand {
            brand: entry.name.clone(),
            product_name,
            full_name,
            confidence,
            profile: entry.profile,
            hint: entry.profile.hint(),
        }
    }

    /// Extract the residual product-name phrase from the query.
    ///
    /// Removes every alias of the matched brand case-insensitively,
    /// strips filler words, and collapses whitespace. An empty residue
    /// falls back to the literal "Product".
    fn extract_product_name(&self, query: &str, entry: &BrandEntry) -> String {
        let mut product = query.to_string();

        for alias in &entry.aliases {
            let pattern = Regex::new(&format!("(?i){}", regex::escape(alias)))
                .expect("Escaped alias pattern should be valid");
            product = pattern.replace_all(&product, "").to_string();
        }

        product = FILLER_REGEX.replace_all(&product, "").to_string();
        let product = product.split_whitespace().collect::<Vec<&str>>().join(" ");

        trace!("Extracted product name '{}' from '{}'", product, query);

        if product.is_empty() {
            "Product".to_string()
        } else {
            product
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brand_registry::default_registry;

    fn resolver() -> BrandResolver {
        BrandResolver::new(default_registry())
    }

    #[test]
    fn test_exact_match_for_every_registered_key() {
        let resolver = resolver();
        let keys: Vec<String> = resolver
            .registry()
            .entries()
            .map(|(k, _)| k.to_string())
            .collect();

        for key in keys {
            let resolved = resolver
                .recognize_brand(&key)
                .unwrap_or_else(|| panic!("key '{}' should resolve", key));
            assert_eq!(resolved.confidence, 1.0, "key '{}'", key);
            let expected = resolver.registry().lookup_exact(&key).unwrap().name.clone();
            assert_eq!(resolved.brand, expected);
        }
    }

    #[test]
    fn test_fuzzy_match_single_deletion_typo() {
        let resolved = resolver().recognize_brand("chobni greek yogurt").unwrap();
        assert_eq!(resolved.brand, "Chobani");
        assert_eq!(resolved.confidence, 0.8);
    }

    #[test]
    fn test_token_match_within_longer_phrase() {
        // Neither an exact key nor within edit distance 2 of any alias
        // as a whole phrase, but contains the literal token "quest";
        // token matching outranks substring containment.
        let resolved = resolver()
            .recognize_brand("one quest chocolate cookie thing")
            .unwrap();
        assert_eq!(resolved.brand, "Quest");
        assert_eq!(resolved.confidence, 0.7);
    }

    #[test]
    fn test_no_match_returns_none() {
        assert!(resolver()
            .recognize_brand("a food with no known brand at all")
            .is_none());
        assert!(resolver().recognize_brand("").is_none());
        assert!(resolver().recognize_brand("   ").is_none());
    }

    #[test]
    fn test_product_name_extraction() {
        let resolved = resolver().recognize_brand("chobani greek yogurt").unwrap();
        // The brand alias is removed first, leaving the product phrase.
        assert_eq!(resolved.product_name, "greek yogurt");
        assert_eq!(resolved.full_name, "Chobani greek yogurt");
    }

    #[test]
    fn test_product_name_falls_back_to_literal() {
        let resolved = resolver().recognize_brand("fage").unwrap();
        assert_eq!(resolved.product_name, "Product");
        assert_eq!(resolved.full_name, "FAGE Product");
    }

    #[test]
    fn test_filler_words_stripped() {
        let resolved = resolver()
            .recognize_brand("the quaker brand oatmeal product")
            .unwrap();
        assert_eq!(resolved.brand, "Quaker");
        assert_eq!(resolved.product_name, "oatmeal");
    }

    #[test]
    fn test_profile_hint_attached() {
        let resolved = resolver().recognize_brand("chobani").unwrap();
        assert_eq!(resolved.profile, NutritionProfile::HighProtein);
        assert_eq!(resolved.hint.protein, Some("High"));
    }

    #[test]
    fn test_custom_thresholds() {
        let config = ResolverConfig {
            max_edit_distance: 0,
            ..Default::default()
        };
        let strict = BrandResolver::with_config(default_registry(), config);
        // With no fuzz allowed, the typo falls through the fuzzy and
        // token tiers; no substring containment either.
        assert!(strict.recognize_brand("chobnee grik yogrt").is_none());
    }
}
