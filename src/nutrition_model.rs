//! # Nutrition Data Model
//!
//! This module defines the partial nutrition record passed between the
//! extraction, fusion, and formatting stages of the pipeline.
//!
//! ## Core Concepts
//!
//! - Every field is optional: a partial record is valid, and an absent
//!   field means "unknown", never zero. Zero is only substituted at the
//!   final diary-offer boundary for display purposes.
//! - Values are never negative; the extraction patterns only capture
//!   unsigned numerics.
//! - Merging is field-wise: the first non-empty value wins and is never
//!   silently overwritten once set.
//!
//! ## Usage
//!
//! ```rust
//! use nutriparse::nutrition_model::NutritionFacts;
//!
//! let a = NutritionFacts {
//!     calories: Some(80.0),
//!     ..Default::default()
//! };
//! let b = NutritionFacts {
//!     calories: Some(90.0),
//!     protein: Some(15.0),
//!     ..Default::default()
//! };
//!
//! let merged = a.merged_with(&b);
//! assert_eq!(merged.calories, Some(80.0)); // first value kept
//! assert_eq!(merged.protein, Some(15.0)); // gap filled
//! ```

use serde::{Deserialize, Serialize};

/// A partial nutrition record for one food or one text source.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NutritionFacts {
    /// Energy in kilocalories
    pub calories: Option<f64>,
    /// Protein in grams
    pub protein: Option<f64>,
    /// Carbohydrates in grams
    pub carbs: Option<f64>,
    /// Fat in grams
    pub fat: Option<f64>,
    /// Fiber in grams
    pub fiber: Option<f64>,
    /// Sugar in grams
    pub sugar: Option<f64>,
    /// Free-text serving descriptor (e.g. "170g", "1 cup")
    pub serving_size: Option<String>,
}

impl NutritionFacts {
    /// Merge two partial records field-wise.
    ///
    /// For every field, the first non-empty value wins: a field already
    /// set on `self` is kept even when `other` disagrees. This is the
    /// merge invariant the source aggregator relies on when collapsing
    /// duplicate search results and folding in scraped data.
    pub fn merged_with(&self, other: &NutritionFacts) -> NutritionFacts {
        NutritionFacts {
            calories: self.calories.or(other.calories),
            protein: self.protein.or(other.protein),
            carbs: self.carbs.or(other.carbs),
            fat: self.fat.or(other.fat),
            fiber: self.fiber.or(other.fiber),
            sugar: self.sugar.or(other.sugar),
            serving_size: self.serving_size.clone().or_else(|| other.serving_size.clone()),
        }
    }

    /// Count how many of the four macro fields (calories, protein,
    /// carbs, fat) are populated. Used by the aggregator both to decide
    /// whether a result is worth scraping for enrichment and to score
    /// completeness.
    pub fn populated_macro_fields(&self) -> usize {
        [self.calories, self.protein, self.carbs, self.fat]
            .iter()
            .filter(|f| f.is_some())
            .count()
    }

    /// True if no field at all is populated.
    pub fn is_empty(&self) -> bool {
        self.populated_macro_fields() == 0
            && self.fiber.is_none()
            && self.sugar.is_none()
            && self.serving_size.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_first_value_wins() {
        let a = NutritionFacts {
            calories: Some(80.0),
            ..Default::default()
        };
        let b = NutritionFacts {
            protein: Some(15.0),
            calories: Some(90.0),
            ..Default::default()
        };

        let merged = a.merged_with(&b);
        assert_eq!(merged.calories, Some(80.0));
        assert_eq!(merged.protein, Some(15.0));
        assert_eq!(merged.carbs, None);
    }

    #[test]
    fn test_merge_does_not_overwrite_serving_size() {
        let a = NutritionFacts {
            serving_size: Some("170g".to_string()),
            ..Default::default()
        };
        let b = NutritionFacts {
            serving_size: Some("100g".to_string()),
            fiber: Some(4.0),
            ..Default::default()
        };

        let merged = a.merged_with(&b);
        assert_eq!(merged.serving_size.as_deref(), Some("170g"));
        assert_eq!(merged.fiber, Some(4.0));
    }

    #[test]
    fn test_populated_macro_fields() {
        let empty = NutritionFacts::default();
        assert_eq!(empty.populated_macro_fields(), 0);
        assert!(empty.is_empty());

        let partial = NutritionFacts {
            calories: Some(150.0),
            fat: Some(5.0),
            sugar: Some(8.0),
            ..Default::default()
        };
        assert_eq!(partial.populated_macro_fields(), 2);
        assert!(!partial.is_empty());
    }

    #[test]
    fn test_zero_is_a_value_not_absence() {
        let facts = NutritionFacts {
            fat: Some(0.0),
            ..Default::default()
        };
        assert_eq!(facts.populated_macro_fields(), 1);

        let other = NutritionFacts {
            fat: Some(16.0),
            ..Default::default()
        };
        // An explicit zero was seen first, so it stays.
        assert_eq!(facts.merged_with(&other).fat, Some(0.0));
    }
}
