//! Crop layer catalog.
//!
//! Each crop maps the five recommendation categories onto opaque upstream
//! layer identifiers. Query dates come from configuration: one shared date,
//! optionally overridden per category.

use std::collections::BTreeMap;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Crops the advisory service has layers for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Crop {
    Wheat,
    Maize,
}

impl Crop {
    pub const ALL: [Crop; 2] = [Crop::Wheat, Crop::Maize];

    pub fn as_str(&self) -> &'static str {
        match self {
            Crop::Wheat => "wheat",
            Crop::Maize => "maize",
        }
    }

    /// Upstream layer identifier for this crop and category.
    pub fn layer_id(&self, category: Category) -> &'static str {
        match (*self, category) {
            (Crop::Wheat, Category::Compost) => "wheat_compost",
            (Crop::Wheat, Category::Nps) => "wheat_nps",
            (Crop::Wheat, Category::Urea) => "wheat_urea",
            (Crop::Wheat, Category::Vermicompost) => "wheat_vcompost",
            (Crop::Wheat, Category::Yield) => "wheat_optimal_yield",
            (Crop::Maize, Category::Compost) => "maize_compost",
            (Crop::Maize, Category::Nps) => "maize_nps",
            (Crop::Maize, Category::Urea) => "maize_urea",
            (Crop::Maize, Category::Vermicompost) => "maize_vcompost",
            (Crop::Maize, Category::Yield) => "maize_optimal_yield",
        }
    }
}

impl fmt::Display for Crop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Semantic category of an upstream layer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Compost,
    Nps,
    Urea,
    Vermicompost,
    Yield,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Compost,
        Category::Nps,
        Category::Urea,
        Category::Vermicompost,
        Category::Yield,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Compost => "compost",
            Category::Nps => "nps",
            Category::Urea => "urea",
            Category::Vermicompost => "vermicompost",
            Category::Yield => "yield",
        }
    }

    /// Unit the upstream value is expressed in.
    pub fn unit(&self) -> &'static str {
        match self {
            Category::Compost | Category::Vermicompost => ORGANIC_UNIT,
            Category::Nps | Category::Urea => INORGANIC_UNIT,
            Category::Yield => YIELD_UNIT,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Organic fertilizer rates are in tons per hectare.
pub const ORGANIC_UNIT: &str = "tons/ha";

/// Inorganic fertilizer rates are in kilograms per hectare.
pub const INORGANIC_UNIT: &str = "kg/ha";

/// Expected yield is in kilograms per hectare.
pub const YIELD_UNIT: &str = "kg/ha";

/// One upstream lookup: which layer, for which category, on which date.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LayerSpec {
    pub category: Category,
    pub layer_id: String,
    pub date: String,
    pub unit: String,
}

/// Resolves crops to their five layer specs.
#[derive(Debug, Clone)]
pub struct LayerCatalog {
    query_date: String,
    date_overrides: BTreeMap<Category, String>,
}

impl LayerCatalog {
    /// Catalog where every layer is queried on `query_date`.
    pub fn new(query_date: impl Into<String>) -> Self {
        Self {
            query_date: query_date.into(),
            date_overrides: BTreeMap::new(),
        }
    }

    /// Use a different query date for one category.
    pub fn with_date_override(mut self, category: Category, date: impl Into<String>) -> Self {
        self.date_overrides.insert(category, date.into());
        self
    }

    /// The query date used for `category`.
    pub fn date_for(&self, category: Category) -> &str {
        self.date_overrides
            .get(&category)
            .map(String::as_str)
            .unwrap_or(&self.query_date)
    }

    /// All five layer specs for `crop`, in category order.
    pub fn specs(&self, crop: Crop) -> Vec<LayerSpec> {
        Category::ALL
            .into_iter()
            .map(|category| LayerSpec {
                category,
                layer_id: crop.layer_id(category).to_string(),
                date: self.date_for(category).to_string(),
                unit: category.unit().to_string(),
            })
            .collect()
    }
}
