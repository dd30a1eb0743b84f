//! # Diary-Offer Formatter
//!
//! Turns a resolved (brand, product, nutrition) triple into a
//! human-readable confirmation prompt and a structured record ready for
//! persistence by the surrounding application.
//!
//! This is the one place in the pipeline where unknown macro values are
//! substituted with zero: upstream, an absent field always means
//! "unknown". Accepting an offer produces a timestamped [`DiaryRecord`];
//! declining is simply dropping the offer, with no side effect.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::brand_resolver::ResolvedBrand;
use crate::nutrition_model::NutritionFacts;

/// A pending add-to-diary confirmation.
#[derive(Debug, Clone, PartialEq)]
pub struct DiaryOffer {
    pub display_name: String,
    pub brand: Option<String>,
    /// Final facts with all four macros resolved to concrete numbers
    pub facts: NutritionFacts,
    /// Human-readable confirmation prompt
    pub message: String,
}

/// The record handed to the diary/persistence collaborator on
/// confirmation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaryRecord {
    pub name: String,
    pub brand: Option<String>,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub timestamp: DateTime<Utc>,
}

impl DiaryOffer {
    /// Build an offer from a display name, an optional brand
    /// resolution, and whatever facts the pipeline produced.
    pub fn build(
        display_name: &str,
        brand: Option<&ResolvedBrand>,
        facts: &NutritionFacts,
    ) -> DiaryOffer {
        let facts = zero_filled_macros(facts);
        let message = render_message(display_name, brand, &facts);

        DiaryOffer {
            display_name: display_name.to_string(),
            brand: brand.map(|b| b.brand.clone()),
            facts,
            message,
        }
    }

    /// The user confirmed: produce the record to persist, stamped now.
    pub fn accept(self) -> DiaryRecord {
        DiaryRecord {
            name: self.display_name,
            brand: self.brand,
            calories: self.facts.calories.unwrap_or(0.0),
            protein: self.facts.protein.unwrap_or(0.0),
            carbs: self.facts.carbs.unwrap_or(0.0),
            fats: self.facts.fat.unwrap_or(0.0),
            timestamp: Utc::now(),
        }
    }
}

/// Default the four macros to zero for display; leave fiber/sugar and
/// serving size as-is (they are shown only when known).
fn zero_filled_macros(facts: &NutritionFacts) -> NutritionFacts {
    NutritionFacts {
        calories: Some(facts.calories.unwrap_or(0.0)),
        protein: Some(facts.protein.unwrap_or(0.0)),
        carbs: Some(facts.carbs.unwrap_or(0.0)),
        fat: Some(facts.fat.unwrap_or(0.0)),
        fiber: facts.fiber,
        sugar: facts.sugar,
        serving_size: facts.serving_size.clone(),
    }
}

fn render_message(
    display_name: &str,
    brand: Option<&ResolvedBrand>,
    facts: &NutritionFacts,
) -> String {
    let mut message = format!("🍎 **{}**", display_name);

    if let Some(resolved) = brand {
        message.push_str(&format!(" ({})", resolved.brand));
        if resolved.confidence >= 0.8 {
            message.push_str(" - High Confidence Match");
        }
    }

    if let Some(serving) = &facts.serving_size {
        message.push_str(&format!(" - {}", serving));
    }

    message.push_str(&format!(
        "\n\n📊 **Nutrition Facts:**\n\
         • Calories: {}\n\
         • Protein: {}g\n\
         • Carbs: {}g\n\
         • Fat: {}g",
        format_value(facts.calories.unwrap_or(0.0)),
        format_value(facts.protein.unwrap_or(0.0)),
        format_value(facts.carbs.unwrap_or(0.0)),
        format_value(facts.fat.unwrap_or(0.0)),
    ));

    if let Some(fiber) = facts.fiber {
        message.push_str(&format!("\n• Fiber: {}g", format_value(fiber)));
    }
    if let Some(sugar) = facts.sugar {
        message.push_str(&format!("\n• Sugar: {}g", format_value(sugar)));
    }

    if let Some(resolved) = brand {
        let hint = resolved.hint;
        if hint.protein == Some("High") {
            message.push_str(
                "\n\n💪 **High Protein Product** - Great for muscle building and recovery!",
            );
        } else if hint.attributes.contains(&"organic") {
            message.push_str("\n\n🌱 **Organic Product** - Made with natural ingredients!");
        } else if hint.attributes.contains(&"vegan") {
            message.push_str("\n\n🌿 **Vegan Product** - Plant-based nutrition!");
        }
    }

    message.push_str(
        "\n\nWould you like me to add this to your diary? \
         I can help you track your daily nutrition intake! 📝",
    );
    message
}

/// Whole numbers print without a trailing ".0"; everything else keeps
/// one decimal place.
fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.1}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brand_registry::default_registry;
    use crate::brand_resolver::BrandResolver;

    fn chobani() -> ResolvedBrand {
        BrandResolver::new(default_registry())
            .recognize_brand("chobani greek yogurt")
            .unwrap()
    }

    #[test]
    fn test_macros_default_to_zero_only_here() {
        let partial = NutritionFacts {
            calories: Some(80.0),
            protein: Some(15.0),
            ..Default::default()
        };
        let offer = DiaryOffer::build("Greek Yogurt", None, &partial);

        assert_eq!(offer.facts.calories, Some(80.0));
        assert_eq!(offer.facts.carbs, Some(0.0));
        assert_eq!(offer.facts.fat, Some(0.0));
    }

    #[test]
    fn test_message_embeds_name_brand_and_macros() {
        let facts = NutritionFacts {
            calories: Some(80.0),
            protein: Some(15.0),
            carbs: Some(6.0),
            fat: Some(0.0),
            sugar: Some(4.0),
            serving_size: Some("170g".to_string()),
            ..Default::default()
        };
        let brand = chobani();
        let offer = DiaryOffer::build("Greek Yogurt", Some(&brand), &facts);

        assert!(offer.message.contains("**Greek Yogurt**"));
        assert!(offer.message.contains("(Chobani)"));
        assert!(offer.message.contains("High Confidence Match"));
        assert!(offer.message.contains("Calories: 80"));
        assert!(offer.message.contains("Protein: 15g"));
        assert!(offer.message.contains("Sugar: 4g"));
        assert!(offer.message.contains("170g"));
        assert!(offer.message.contains("High Protein Product"));
    }

    #[test]
    fn test_message_without_brand() {
        let facts = NutritionFacts {
            calories: Some(165.0),
            ..Default::default()
        };
        let offer = DiaryOffer::build("Chicken Breast", None, &facts);
        assert!(!offer.message.contains('('));
        assert!(offer.message.contains("Calories: 165"));
        assert!(offer.message.contains("Protein: 0g"));
    }

    #[test]
    fn test_accept_produces_record() {
        let facts = NutritionFacts {
            calories: Some(80.0),
            protein: Some(15.5),
            carbs: Some(6.0),
            ..Default::default()
        };
        let brand = chobani();
        let record = DiaryOffer::build("Greek Yogurt", Some(&brand), &facts).accept();

        assert_eq!(record.name, "Greek Yogurt");
        assert_eq!(record.brand.as_deref(), Some("Chobani"));
        assert_eq!(record.calories, 80.0);
        assert_eq!(record.protein, 15.5);
        assert_eq!(record.fats, 0.0);
        assert!(record.timestamp <= Utc::now());
    }

    #[test]
    fn test_fractional_values_keep_one_decimal() {
        assert_eq!(format_value(3.6), "3.6");
        assert_eq!(format_value(12.0), "12");
    }
}
