//! # Brand Registry
//!
//! Catalog of known food brands with aliases, categories, and coarse
//! nutrition-profile tags. The registry is loaded once at startup and is
//! read-mostly afterwards: `add_or_replace` is a configuration-time
//! operation, not a request-time one.
//!
//! ## Ordering and duplicates
//!
//! - Iteration order is insertion order. The brand resolver's fuzzy tier
//!   breaks ties by first-encountered entry, so deterministic iteration
//!   is part of the registry's contract.
//! - Duplicate keys overwrite the stored entry (last write wins). This
//!   is a deliberate policy: brand catalogs accumulate overlapping rows
//!   and the most recently loaded definition is taken as authoritative.

use log::{debug, warn};
use std::collections::HashMap;

/// Coarse product category for a brand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrandCategory {
    Dairy,
    Snacks,
    Beverages,
    Protein,
    Grains,
    Frozen,
    Canned,
    Condiments,
}

/// Coarse nutrition-profile tag attached to a brand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NutritionProfile {
    HighProtein,
    LowCarb,
    Organic,
    Vegan,
    GlutenFree,
    KetoFriendly,
    Standard,
}

/// Descriptive (non-numeric) hint derived from a nutrition profile.
///
/// Purely a display aid: "High" protein is a characterization of the
/// brand's product line, not a measured value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileHint {
    pub protein: Option<&'static str>,
    pub carbs: Option<&'static str>,
    pub fat: Option<&'static str>,
    pub attributes: &'static [&'static str],
}

impl NutritionProfile {
    /// Static mapping from profile tag to its descriptive hint.
    pub fn hint(&self) -> ProfileHint {
        match self {
            NutritionProfile::HighProtein => ProfileHint {
                protein: Some("High"),
                carbs: Some("Low-Moderate"),
                fat: Some("Low-Moderate"),
                attributes: &[],
            },
            NutritionProfile::LowCarb => ProfileHint {
                protein: Some("Moderate-High"),
                carbs: Some("Very Low"),
                fat: Some("Moderate-High"),
                attributes: &[],
            },
            NutritionProfile::Organic => ProfileHint {
                protein: None,
                carbs: None,
                fat: None,
                attributes: &["organic", "natural"],
            },
            NutritionProfile::Vegan => ProfileHint {
                protein: None,
                carbs: None,
                fat: None,
                attributes: &["vegan", "plant-based"],
            },
            NutritionProfile::GlutenFree => ProfileHint {
                protein: None,
                carbs: None,
                fat: None,
                attributes: &["gluten-free"],
            },
            NutritionProfile::KetoFriendly => ProfileHint {
                protein: None,
                carbs: None,
                fat: None,
                attributes: &["keto", "low-carb", "high-fat"],
            },
            NutritionProfile::Standard => ProfileHint {
                protein: None,
                carbs: None,
                fat: None,
                attributes: &["standard"],
            },
        }
    }
}

/// A single brand definition.
#[derive(Debug, Clone, PartialEq)]
pub struct BrandEntry {
    /// Canonical display name (e.g. "Chobani", "KIND")
    pub name: String,
    /// Lower-cased, deduplicated alias strings, including common misspellings
    pub aliases: Vec<String>,
    /// Product category
    pub category: BrandCategory,
    /// Product-name fragments commonly associated with the brand
    pub common_products: Vec<String>,
    /// Coarse nutrition-profile tag
    pub profile: NutritionProfile,
}

impl BrandEntry {
    pub fn new(
        name: &str,
        aliases: &[&str],
        category: BrandCategory,
        common_products: &[&str],
        profile: NutritionProfile,
    ) -> Self {
        // Aliases are stored lower-cased and deduplicated.
        let mut seen = Vec::new();
        for alias in aliases {
            let alias = alias.to_lowercase();
            if !alias.is_empty() && !seen.contains(&alias) {
                seen.push(alias);
            }
        }
        Self {
            name: name.to_string(),
            aliases: seen,
            category,
            common_products: common_products.iter().map(|p| p.to_string()).collect(),
            profile,
        }
    }
}

/// Insertion-ordered mapping from normalized brand key to [`BrandEntry`].
#[derive(Debug, Clone, Default)]
pub struct BrandRegistry {
    entries: Vec<(String, BrandEntry)>,
    index: HashMap<String, usize>,
}

impl BrandRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize a key or query the same way the registry stores keys.
    pub fn normalize_key(key: &str) -> String {
        key.trim().to_lowercase()
    }

    /// Insert or overwrite an entry under the normalized key.
    ///
    /// A duplicate key replaces the stored entry in place (last write
    /// wins) while keeping its original position in iteration order.
    /// Entries with an empty name or key are rejected.
    pub fn add_or_replace(&mut self, key: &str, entry: BrandEntry) {
        let key = Self::normalize_key(key);
        if key.is_empty() || entry.name.trim().is_empty() {
            warn!("Ignoring brand entry with empty key or name");
            return;
        }

        match self.index.get(&key) {
            Some(&pos) => {
                debug!("Replacing brand entry for key '{}'", key);
                self.entries[pos].1 = entry;
            }
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, entry));
            }
        }
    }

    /// Exact lookup by normalized key.
    pub fn lookup_exact(&self, key: &str) -> Option<&BrandEntry> {
        self.index
            .get(&Self::normalize_key(key))
            .map(|&pos| &self.entries[pos].1)
    }

    /// All `(key, entry)` pairs in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &BrandEntry)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All brands in the given category, in insertion order.
    pub fn brands_by_category(&self, category: BrandCategory) -> Vec<&BrandEntry> {
        self.entries
            .iter()
            .map(|(_, e)| e)
            .filter(|e| e.category == category)
            .collect()
    }

    /// All brands carrying the given nutrition profile, in insertion order.
    pub fn brands_by_profile(&self, profile: NutritionProfile) -> Vec<&BrandEntry> {
        self.entries
            .iter()
            .map(|(_, e)| e)
            .filter(|e| e.profile == profile)
            .collect()
    }

    /// Canonical-name suggestions for a partial input, matched by prefix
    /// against keys, names, and aliases. At most five unique names.
    pub fn suggestions(&self, partial: &str) -> Vec<String> {
        let input = Self::normalize_key(partial);
        if input.is_empty() {
            return Vec::new();
        }

        let mut names: Vec<String> = Vec::new();
        for (key, entry) in &self.entries {
            let hit = key.starts_with(&input)
                || entry.name.to_lowercase().starts_with(&input)
                || entry.aliases.iter().any(|a| a.starts_with(&input));
            if hit && !names.contains(&entry.name) {
                names.push(entry.name.clone());
            }
        }
        names.truncate(5);
        names
    }
}

/// Build the built-in brand catalog.
///
/// The source data carried overlapping rows for some brands; under the
/// last-write-wins policy the final definition is the one kept.
pub fn default_registry() -> BrandRegistry {
    use BrandCategory::*;
    use NutritionProfile::*;

    let mut registry = BrandRegistry::new();
    let mut add = |key: &str, entry: BrandEntry| registry.add_or_replace(key, entry);

    add(
        "chobani",
        BrandEntry::new(
            "Chobani",
            &[
                "chobani",
                "chobani greek",
                "chobani yogurt",
                "chobani greek yogurt",
            ],
            Dairy,
            &["greek yogurt", "yogurt", "oat milk", "almond milk"],
            HighProtein,
        ),
    );
    add(
        "quaker",
        BrandEntry::new(
            "Quaker",
            &["quaker", "quaker oats", "quaker oatmeal", "quaker instant"],
            Grains,
            &["oats", "oatmeal", "instant oats", "steel cut oats"],
            Standard,
        ),
    );
    add(
        "kind",
        BrandEntry::new(
            "KIND",
            &["kind", "kind bar", "kind bars", "kind snack", "kind healthy"],
            Snacks,
            &["granola bars", "nuts", "dried fruit", "protein bars"],
            Organic,
        ),
    );
    add(
        "clif",
        BrandEntry::new(
            "CLIF",
            &["clif", "clif bar", "clif bars", "clif energy", "clif protein"],
            Snacks,
            &["energy bars", "protein bars", "granola bars"],
            Organic,
        ),
    );
    add(
        "quest",
        BrandEntry::new(
            "Quest",
            &["quest", "quest bar", "quest bars", "quest protein", "quest nutrition"],
            Protein,
            &["protein bars", "protein chips", "protein cookies"],
            HighProtein,
        ),
    );
    add(
        "protein",
        BrandEntry::new(
            "Protein",
            &["protein", "protein powder", "protein shake", "protein bar"],
            Protein,
            &["whey protein", "casein protein", "plant protein"],
            HighProtein,
        ),
    );
    add(
        "atkins",
        BrandEntry::new(
            "Atkins",
            &["atkins", "atkins bar", "atkins bars", "atkins diet"],
            Snacks,
            &["protein bars", "shakes", "snacks"],
            LowCarb,
        ),
    );
    add(
        "thinkthin",
        BrandEntry::new(
            "ThinkThin",
            &["thinkthin", "think thin", "think thin bar"],
            Snacks,
            &["protein bars", "snack bars"],
            HighProtein,
        ),
    );
    add(
        "rxbar",
        BrandEntry::new(
            "RXBAR",
            &["rxbar", "rx bar", "rx bars", "rx protein"],
            Snacks,
            &["protein bars", "energy bars"],
            Organic,
        ),
    );
    add(
        "larabar",
        BrandEntry::new(
            "LÄRABAR",
            &["larabar", "lara bar", "lara bars", "lara"],
            Snacks,
            &["fruit bars", "energy bars"],
            Organic,
        ),
    );
    add(
        "siggi",
        BrandEntry::new(
            "Siggi's",
            &["siggi", "siggis", "siggi yogurt", "siggi skyr"],
            Dairy,
            &["skyr yogurt", "icelandic yogurt"],
            HighProtein,
        ),
    );
    add(
        "fage",
        BrandEntry::new(
            "FAGE",
            &["fage", "fage yogurt", "fage greek"],
            Dairy,
            &["greek yogurt", "total yogurt"],
            HighProtein,
        ),
    );
    add(
        "dannon",
        BrandEntry::new(
            "Dannon",
            &["dannon", "danone", "dannon yogurt", "dannon greek"],
            Dairy,
            &["yogurt", "greek yogurt", "drinkable yogurt"],
            Standard,
        ),
    );
    add(
        "yoplait",
        BrandEntry::new(
            "Yoplait",
            &["yoplait", "yoplait yogurt", "yoplait greek"],
            Dairy,
            &["yogurt", "greek yogurt", "drinkable yogurt"],
            Standard,
        ),
    );
    add(
        "stonyfield",
        BrandEntry::new(
            "Stonyfield",
            &["stonyfield", "stony field", "stonyfield organic"],
            Dairy,
            &["organic yogurt", "milk", "smoothies"],
            Organic,
        ),
    );

    registry
}
