//! # Food Catalog
//!
//! Static table of generic and branded foods with fixed per-serving
//! nutrition. Supports brand-aware substring search and serving-size
//! rescaling.
//!
//! ## Search ordering
//!
//! Results are stable-sorted: exact name/brand matches first, then
//! branded entries over generic ones, then entries matching the brand
//! resolved from the query; ties keep the catalog scan order. This
//! ordering is an observable contract: `get_nutrition_info` picks the
//! first search hit when the exact-key lookup misses.

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::brand_resolver::{BrandResolver, ResolvedBrand};
use crate::nutrition_model::NutritionFacts;

lazy_static! {
    static ref LEADING_NUMBER: Regex =
        Regex::new(r"(\d+(?:\.\d+)?)").expect("Leading number pattern should be valid");
}

/// Broad food category for a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoodCategory {
    Protein,
    Carbs,
    Fats,
    Vegetables,
    Fruits,
    Dairy,
    Grains,
    Snacks,
}

/// One catalog row: a food with its base-serving nutrition.
#[derive(Debug, Clone, PartialEq)]
pub struct FoodCatalogEntry {
    /// Display name (e.g. "Greek Yogurt")
    pub name: String,
    /// Calories at the base serving
    pub calories: f64,
    /// Protein in grams at the base serving
    pub protein: f64,
    /// Carbs in grams at the base serving
    pub carbs: f64,
    /// Fat in grams at the base serving
    pub fat: f64,
    pub fiber: Option<f64>,
    pub sugar: Option<f64>,
    /// Base serving descriptor (e.g. "100g (3.5 oz)")
    pub serving_size: String,
    pub category: FoodCategory,
    /// Brand name for branded products
    pub brand: Option<String>,
}

impl FoodCatalogEntry {
    /// The entry's base nutrition as a partial record, for merging into
    /// the wider pipeline.
    pub fn base_facts(&self) -> NutritionFacts {
        NutritionFacts {
            calories: Some(self.calories),
            protein: Some(self.protein),
            carbs: Some(self.carbs),
            fat: Some(self.fat),
            fiber: self.fiber,
            sugar: self.sugar,
            serving_size: Some(self.serving_size.clone()),
        }
    }
}

/// Macro values rescaled to the suggested serving.
#[derive(Debug, Clone, PartialEq)]
pub struct MacroBreakdown {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

/// A catalog lookup result with serving-adjusted values.
#[derive(Debug, Clone, PartialEq)]
pub struct NutritionInfo {
    pub food: FoodCatalogEntry,
    pub suggested_serving: String,
    /// Calories scaled to the suggested serving, rounded to an integer
    pub calories: f64,
    /// Macros scaled to the suggested serving, rounded to one decimal
    pub macros: MacroBreakdown,
    /// Brand resolution for branded entries
    pub brand_info: Option<ResolvedBrand>,
}

/// Static food table with brand-aware lookup.
#[derive(Debug, Clone)]
pub struct FoodCatalog {
    entries: Vec<(String, FoodCatalogEntry)>,
    resolver: BrandResolver,
}

impl FoodCatalog {
    /// Build a catalog from `(key, entry)` rows. Keys are normalized
    /// lower-case; row order is the scan order `search` ties preserve.
    pub fn new(entries: Vec<(String, FoodCatalogEntry)>, resolver: BrandResolver) -> Self {
        let entries = entries
            .into_iter()
            .map(|(k, e)| (k.trim().to_lowercase(), e))
            .collect();
        Self { entries, resolver }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Search the catalog for entries matching the query.
    ///
    /// Runs brand resolution on the query first, then linear-scans the
    /// table: an entry is included when its name, key, or brand contains
    /// the query case-insensitively, or when its brand equals the
    /// resolved brand.
    pub fn search(&self, query: &str) -> Vec<&FoodCatalogEntry> {
        let term = query.trim().to_lowercase();
        let brand_result = self.resolver.recognize_brand(query);

        let mut results: Vec<&FoodCatalogEntry> = Vec::new();
        for (key, food) in &self.entries {
            let matches_name = food.name.to_lowercase().contains(&term);
            let matches_key = key.contains(&term);
            let matches_brand = food
                .brand
                .as_ref()
                .is_some_and(|b| b.to_lowercase().contains(&term));
            let matches_resolved = matches_resolved_brand(food, brand_result.as_ref());

            if matches_name || matches_key || matches_brand || matches_resolved {
                results.push(food);
            }
        }

        // Stable sort; ties keep scan order.
        results.sort_by(|a, b| {
            let a_exact = is_exact_match(a, &term);
            let b_exact = is_exact_match(b, &term);
            b_exact
                .cmp(&a_exact)
                .then_with(|| b.brand.is_some().cmp(&a.brand.is_some()))
                .then_with(|| {
                    let a_resolved = matches_resolved_brand(a, brand_result.as_ref());
                    let b_resolved = matches_resolved_brand(b, brand_result.as_ref());
                    b_resolved.cmp(&a_resolved)
                })
        });

        debug!("Catalog search '{}' matched {} entries", term, results.len());
        results
    }

    /// Look up a food and rescale its nutrition to a requested serving.
    ///
    /// Exact-key lookup first, falling back to the first `search` result.
    /// The serving multiplier divides the leading numeric quantity of
    /// the requested serving by that of the base serving; if either side
    /// fails to parse, the multiplier defaults to 1.
    pub fn get_nutrition_info(
        &self,
        name: &str,
        serving_override: Option<&str>,
    ) -> Option<NutritionInfo> {
        let key = name.trim().to_lowercase();
        let food = self
            .entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, e)| e)
            .or_else(|| self.search(name).into_iter().next())?
            .clone();

        let serving = serving_override.unwrap_or(&food.serving_size).to_string();
        let multiplier = serving_multiplier(&serving, &food.serving_size);

        let brand_info = if food.brand.is_some() {
            self.resolver.recognize_brand(name)
        } else {
            None
        };

        Some(NutritionInfo {
            calories: (food.calories * multiplier).round(),
            macros: MacroBreakdown {
                protein: round_one_decimal(food.protein * multiplier),
                carbs: round_one_decimal(food.carbs * multiplier),
                fat: round_one_decimal(food.fat * multiplier),
            },
            suggested_serving: serving,
            brand_info,
            food,
        })
    }
}

fn is_exact_match(food: &FoodCatalogEntry, term: &str) -> bool {
    food.name.to_lowercase() == term
        || food.brand.as_ref().is_some_and(|b| b.to_lowercase() == term)
}

fn matches_resolved_brand(food: &FoodCatalogEntry, resolved: Option<&ResolvedBrand>) -> bool {
    match (resolved, food.brand.as_ref()) {
        (Some(r), Some(b)) => b.to_lowercase() == r.brand.to_lowercase(),
        _ => false,
    }
}

/// Ratio between the leading numeric quantities of two serving strings.
fn serving_multiplier(requested: &str, base: &str) -> f64 {
    let requested_value = leading_number(requested);
    let base_value = leading_number(base);
    match (requested_value, base_value) {
        (Some(r), Some(b)) if b > 0.0 => r / b,
        _ => 1.0,
    }
}

fn leading_number(text: &str) -> Option<f64> {
    LEADING_NUMBER
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Build the built-in food table: common whole foods plus branded
/// examples, in a fixed scan order.
pub fn default_catalog(resolver: BrandResolver) -> FoodCatalog {
    use FoodCategory::*;

    fn entry(
        name: &str,
        calories: f64,
        protein: f64,
        carbs: f64,
        fat: f64,
        serving_size: &str,
        category: FoodCategory,
    ) -> FoodCatalogEntry {
        FoodCatalogEntry {
            name: name.to_string(),
            calories,
            protein,
            carbs,
            fat,
            fiber: None,
            sugar: None,
            serving_size: serving_size.to_string(),
            category,
            brand: None,
        }
    }

    fn with_fiber(mut e: FoodCatalogEntry, fiber: f64) -> FoodCatalogEntry {
        e.fiber = Some(fiber);
        e
    }

    fn with_sugar(mut e: FoodCatalogEntry, sugar: f64) -> FoodCatalogEntry {
        e.sugar = Some(sugar);
        e
    }

    fn branded(mut e: FoodCatalogEntry, brand: &str) -> FoodCatalogEntry {
        e.brand = Some(brand.to_string());
        e
    }

    let rows: Vec<(&str, FoodCatalogEntry)> = vec![
        // Proteins
        (
            "chicken breast",
            entry("Chicken Breast", 165.0, 31.0, 0.0, 3.6, "100g (3.5 oz)", Protein),
        ),
        ("salmon", entry("Salmon", 208.0, 25.0, 0.0, 12.0, "100g (3.5 oz)", Protein)),
        ("eggs", entry("Eggs", 155.0, 13.0, 1.1, 11.0, "2 large eggs", Protein)),
        ("tofu", entry("Tofu", 76.0, 8.0, 1.9, 4.8, "100g (3.5 oz)", Protein)),
        // Carbohydrates
        (
            "brown rice",
            with_fiber(entry("Brown Rice", 111.0, 2.6, 23.0, 0.9, "100g cooked", Grains), 1.8),
        ),
        (
            "quinoa",
            with_fiber(entry("Quinoa", 120.0, 4.4, 22.0, 1.9, "100g cooked", Grains), 2.8),
        ),
        (
            "sweet potato",
            with_fiber(entry("Sweet Potato", 86.0, 1.6, 20.0, 0.1, "100g", Carbs), 3.0),
        ),
        (
            "banana",
            with_sugar(
                with_fiber(entry("Banana", 89.0, 1.1, 23.0, 0.3, "1 medium (118g)", Fruits), 2.6),
                12.0,
            ),
        ),
        // Fats
        (
            "avocado",
            with_fiber(entry("Avocado", 160.0, 2.0, 9.0, 15.0, "100g", Fats), 7.0),
        ),
        (
            "almonds",
            with_fiber(entry("Almonds", 164.0, 6.0, 6.0, 14.0, "28g (1 oz)", Fats), 3.5),
        ),
        ("olive oil", entry("Olive Oil", 119.0, 0.0, 0.0, 14.0, "1 tbsp (15ml)", Fats)),
        // Vegetables
        (
            "broccoli",
            with_fiber(entry("Broccoli", 34.0, 2.8, 7.0, 0.4, "100g", Vegetables), 2.6),
        ),
        (
            "spinach",
            with_fiber(entry("Spinach", 23.0, 2.9, 3.6, 0.4, "100g", Vegetables), 2.2),
        ),
        // Dairy
        (
            "greek yogurt",
            with_sugar(entry("Greek Yogurt", 59.0, 10.0, 3.6, 0.4, "100g", Dairy), 3.2),
        ),
        (
            "cottage cheese",
            entry("Cottage Cheese", 98.0, 11.0, 3.4, 4.3, "100g", Dairy),
        ),
        // Branded products
        (
            "chobani greek yogurt",
            branded(
                with_sugar(entry("Greek Yogurt", 80.0, 15.0, 6.0, 0.0, "170g (6 oz)", Dairy), 4.0),
                "Chobani",
            ),
        ),
        (
            "quaker oats",
            branded(
                with_fiber(
                    entry("Old Fashioned Oats", 150.0, 5.0, 27.0, 3.0, "40g (1/2 cup)", Grains),
                    4.0,
                ),
                "Quaker",
            ),
        ),
        (
            "kind bars",
            branded(
                with_sugar(
                    with_fiber(
                        entry(
                            "Dark Chocolate Nuts & Sea Salt",
                            200.0,
                            6.0,
                            16.0,
                            16.0,
                            "40g (1 bar)",
                            Snacks,
                        ),
                        7.0,
                    ),
                    5.0,
                ),
                "KIND",
            ),
        ),
        (
            "clif bars",
            branded(
                with_sugar(
                    with_fiber(
                        entry(
                            "Chocolate Chip Energy Bar",
                            250.0,
                            9.0,
                            45.0,
                            5.0,
                            "68g (1 bar)",
                            Snacks,
                        ),
                        4.0,
                    ),
                    21.0,
                ),
                "CLIF",
            ),
        ),
        (
            "protein powder",
            branded(
                with_sugar(
                    entry("Whey Protein Powder", 120.0, 24.0, 3.0, 1.5, "30g (1 scoop)", Protein),
                    1.0,
                ),
                "Generic",
            ),
        ),
        (
            "oatmeal",
            branded(
                with_sugar(
                    with_fiber(
                        entry("Instant Oatmeal", 150.0, 5.0, 27.0, 3.0, "40g (1 packet)", Grains),
                        4.0,
                    ),
                    1.0,
                ),
                "Generic",
            ),
        ),
        (
            "granola",
            branded(
                with_sugar(
                    with_fiber(
                        entry("Honey Almond Granola", 140.0, 4.0, 22.0, 5.0, "30g (1/4 cup)", Grains),
                        3.0,
                    ),
                    8.0,
                ),
                "Generic",
            ),
        ),
        (
            "almond milk",
            branded(
                entry("Unsweetened Almond Milk", 30.0, 1.0, 1.0, 2.5, "240ml (1 cup)", Dairy),
                "Generic",
            ),
        ),
        (
            "protein shake",
            branded(
                with_sugar(
                    entry(
                        "Ready-to-Drink Protein Shake",
                        160.0,
                        30.0,
                        4.0,
                        2.0,
                        "330ml (1 bottle)",
                        Protein,
                    ),
                    1.0,
                ),
                "Generic",
            ),
        ),
    ];

    FoodCatalog::new(
        rows.into_iter().map(|(k, e)| (k.to_string(), e)).collect(),
        resolver,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brand_registry::default_registry;

    fn catalog() -> FoodCatalog {
        default_catalog(BrandResolver::new(default_registry()))
    }

    #[test]
    fn test_exact_key_lookup() {
        let info = catalog().get_nutrition_info("chicken breast", None).unwrap();
        assert_eq!(info.food.name, "Chicken Breast");
        assert_eq!(info.calories, 165.0);
        assert_eq!(info.macros.protein, 31.0);
    }

    #[test]
    fn test_branded_lookup_attaches_brand_info() {
        let info = catalog()
            .get_nutrition_info("chobani greek yogurt", None)
            .unwrap();
        assert_eq!(info.food.brand.as_deref(), Some("Chobani"));
        let brand = info.brand_info.unwrap();
        assert_eq!(brand.brand, "Chobani");

        // No serving override: multiplier 1, scaled values equal base.
        assert_eq!(info.calories, 80.0);
        assert_eq!(info.macros.protein, 15.0);
        assert_eq!(info.macros.carbs, 6.0);
        assert_eq!(info.macros.fat, 0.0);
    }

    #[test]
    fn test_serving_override_rescales() {
        // Base serving "100g", requested "200g" -> multiplier 2.
        let info = catalog()
            .get_nutrition_info("greek yogurt", Some("200g"))
            .unwrap();
        assert_eq!(info.calories, 118.0);
        assert_eq!(info.macros.protein, 20.0);
        assert_eq!(info.suggested_serving, "200g");
    }

    #[test]
    fn test_unparseable_serving_defaults_to_base_values() {
        let info = catalog()
            .get_nutrition_info("greek yogurt", Some("a big bowl"))
            .unwrap();
        assert_eq!(info.calories, 59.0);
        assert_eq!(info.macros.protein, 10.0);
    }

    #[test]
    fn test_macros_rounded_to_one_decimal() {
        // Chicken breast at 150g: fat 3.6 * 1.5 = 5.4000000000000004
        let info = catalog()
            .get_nutrition_info("chicken breast", Some("150g"))
            .unwrap();
        assert_eq!(info.macros.fat, 5.4);
        assert_eq!(info.calories, 248.0); // 247.5 rounds up
    }

    #[test]
    fn test_search_exact_match_first() {
        let catalog = catalog();
        let results = catalog.search("greek yogurt");
        assert!(!results.is_empty());
        // "Greek Yogurt" is an exact name match for both the generic and
        // the Chobani entry; branded ranks above generic.
        assert_eq!(results[0].brand.as_deref(), Some("Chobani"));
        assert_eq!(results[1].brand, None);
    }

    #[test]
    fn test_search_includes_resolved_brand_entries() {
        let catalog = catalog();
        // Typo still resolves to Quaker through the fuzzy tier, pulling
        // in the branded oats entry even though the text differs.
        let results = catalog.search("quakr oatmeal");
        assert!(results.iter().any(|e| e.brand.as_deref() == Some("Quaker")));
    }

    #[test]
    fn test_search_no_match_is_empty() {
        assert!(catalog().search("plutonium sandwich").is_empty());
    }

    #[test]
    fn test_lookup_miss_returns_none() {
        assert!(catalog().get_nutrition_info("plutonium sandwich", None).is_none());
    }
}
