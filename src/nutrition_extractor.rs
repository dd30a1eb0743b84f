//! # Nutrition Extractor
//!
//! Pulls structured macro-nutrient values out of free prose: search
//! snippets, scraped page text, and AI-generated answers.
//!
//! ## Pattern banks
//!
//! Each macro field has an ordered bank of recognition patterns covering
//! the phrasings seen in the wild ("80 calories", "15g protein",
//! "protein: 20", "250 kcal", "...per serving"). Every pattern in a bank
//! is evaluated and every numeric match collected; the field keeps the
//! **maximum** value seen.
//!
//! The max-of-matches policy is a deliberate disambiguation heuristic:
//! prose tends to mention a partial or rounded-down number before the
//! complete one ("about 15g, actually 20g protein"), so the largest
//! match is taken as the full figure. It is not guaranteed correct on
//! adversarial text, but changing it to first-match or last-match would
//! change observable output on ambiguous input, so it stays.
//!
//! ## Usage
//!
//! ```rust
//! use nutriparse::nutrition_extractor::NutritionExtractor;
//!
//! let extractor = NutritionExtractor::new();
//! let facts = extractor.extract("80 calories, 15g protein, 6g carbs, 0g fat");
//!
//! assert_eq!(facts.calories, Some(80.0));
//! assert_eq!(facts.protein, Some(15.0));
//! assert_eq!(facts.carbs, Some(6.0));
//! assert_eq!(facts.fat, Some(0.0));
//! ```

use lazy_static::lazy_static;
use log::{debug, trace};
use regex::Regex;

use crate::nutrition_model::NutritionFacts;

// Pattern banks, in documented evaluation order. All case-insensitive,
// all accepting decimals. The capture group is always the numeric value.
const CALORIE_PATTERNS: &[&str] = &[
    r"(?i)(\d+(?:\.\d+)?)\s*calories?\s+per\s+serving",
    r"(?i)(\d+(?:\.\d+)?)\s*calories?",
    r"(?i)(\d+(?:\.\d+)?)\s*cal\b",
    r"(?i)(\d+(?:\.\d+)?)\s*kcal",
    r"(?i)calories?:?\s*(\d+(?:\.\d+)?)",
];

const PROTEIN_PATTERNS: &[&str] = &[
    r"(?i)(\d+(?:\.\d+)?)\s*g\s*(?:of\s+)?protein\s+per\s+serving",
    r"(?i)(\d+(?:\.\d+)?)\s*g\s*(?:of\s+)?protein",
    r"(?i)(\d+(?:\.\d+)?)\s*grams?\s+(?:of\s+)?protein",
    r"(?i)protein:?\s*(\d+(?:\.\d+)?)",
    r"(?i)(\d+(?:\.\d+)?)\s+protein",
];

const CARB_PATTERNS: &[&str] = &[
    r"(?i)(\d+(?:\.\d+)?)\s*g\s*(?:of\s+)?(?:carbs?|carbohydrates?)\s+per\s+serving",
    r"(?i)(\d+(?:\.\d+)?)\s*g\s*(?:of\s+)?(?:carbs?|carbohydrates?)",
    r"(?i)(\d+(?:\.\d+)?)\s*grams?\s+(?:of\s+)?(?:carbs?|carbohydrates?)",
    r"(?i)(?:carbs?|carbohydrates?):?\s*(\d+(?:\.\d+)?)",
    r"(?i)(\d+(?:\.\d+)?)\s+(?:carbs?|carbohydrates?)",
];

const FAT_PATTERNS: &[&str] = &[
    r"(?i)(\d+(?:\.\d+)?)\s*g\s*(?:of\s+)?fats?\s+per\s+serving",
    r"(?i)(\d+(?:\.\d+)?)\s*g\s*(?:of\s+)?fats?",
    r"(?i)(\d+(?:\.\d+)?)\s*grams?\s+(?:of\s+)?fats?",
    r"(?i)fats?:?\s*(\d+(?:\.\d+)?)",
    r"(?i)(\d+(?:\.\d+)?)\s+fats?",
];

const FIBER_PATTERN: &str = r"(?i)(\d+(?:\.\d+)?)\s*g\s*(?:of\s+)?fiber";
const SUGAR_PATTERN: &str = r"(?i)(\d+(?:\.\d+)?)\s*g\s*(?:of\s+)?sugars?";

// Best-effort serving-size token: a quantity followed by a unit word.
const SERVING_PATTERN: &str = r"(?i)\b(\d+(?:\.\d+)?)\s*(?:g|oz|ml|cups?|tbsp|tsp)\b";

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("Nutrition pattern should be valid"))
        .collect()
}

lazy_static! {
    static ref CALORIE_BANK: Vec<Regex> = compile(CALORIE_PATTERNS);
    static ref PROTEIN_BANK: Vec<Regex> = compile(PROTEIN_PATTERNS);
    static ref CARB_BANK: Vec<Regex> = compile(CARB_PATTERNS);
    static ref FAT_BANK: Vec<Regex> = compile(FAT_PATTERNS);
    static ref FIBER_REGEX: Regex =
        Regex::new(FIBER_PATTERN).expect("Fiber pattern should be valid");
    static ref SUGAR_REGEX: Regex =
        Regex::new(SUGAR_PATTERN).expect("Sugar pattern should be valid");
    static ref SERVING_REGEX: Regex =
        Regex::new(SERVING_PATTERN).expect("Serving pattern should be valid");
}

/// Extracts partial [`NutritionFacts`] from free text.
#[derive(Debug, Clone, Default)]
pub struct NutritionExtractor;

impl NutritionExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract a partial nutrition record from prose.
    ///
    /// Fields with no matching pattern are left absent. Absent means
    /// "unknown", never zero. Values are always non-negative since the
    /// patterns only capture unsigned numerics.
    pub fn extract(&self, text: &str) -> NutritionFacts {
        let facts = NutritionFacts {
            calories: max_across_bank(&CALORIE_BANK, text),
            protein: max_across_bank(&PROTEIN_BANK, text),
            carbs: max_across_bank(&CARB_BANK, text),
            fat: max_across_bank(&FAT_BANK, text),
            fiber: first_capture(&FIBER_REGEX, text),
            sugar: first_capture(&SUGAR_REGEX, text),
            serving_size: SERVING_REGEX
                .find(text)
                .map(|m| m.as_str().to_string()),
        };

        debug!(
            "Extracted {} macro field(s) from {} chars of text",
            facts.populated_macro_fields(),
            text.len()
        );
        facts
    }
}

/// Collect every numeric capture across every pattern in the bank and
/// keep the maximum (the adopted conflict-resolution policy).
fn max_across_bank(bank: &[Regex], text: &str) -> Option<f64> {
    let mut best: Option<f64> = None;

    for pattern in bank {
        for captures in pattern.captures_iter(text) {
            if let Some(value) = captures.get(1).and_then(|m| m.as_str().parse::<f64>().ok()) {
                trace!("Pattern '{}' matched value {}", pattern.as_str(), value);
                best = Some(match best {
                    Some(current) if current >= value => current,
                    _ => value,
                });
            }
        }
    }

    best
}

fn first_capture(pattern: &Regex, text: &str) -> Option<f64> {
    pattern
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}
