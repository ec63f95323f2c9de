use super::LifeStage;
use crate::error::{Result, VineGuardError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Qualitative efficacy rating as printed on extension-service label sheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EfficacyRating {
    Excellent,
    GoodToExcellent,
    Good,
    Fair,
    Poor,
}

impl EfficacyRating {
    pub fn as_str(&self) -> &'static str {
        match self {
            EfficacyRating::Excellent => "Excellent",
            EfficacyRating::GoodToExcellent => "Good to Excellent",
            EfficacyRating::Good => "Good",
            EfficacyRating::Fair => "Fair",
            EfficacyRating::Poor => "Poor",
        }
    }

    /// Numeric efficacy used by the scheduler's gate.
    pub fn score(&self) -> f64 {
        match self {
            EfficacyRating::Excellent => 0.95,
            EfficacyRating::GoodToExcellent => 0.80,
            EfficacyRating::Good => 0.70,
            EfficacyRating::Fair => 0.50,
            EfficacyRating::Poor => 0.25,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace(['-', '_'], " ").as_str() {
            "excellent" => Some(EfficacyRating::Excellent),
            "good to excellent" => Some(EfficacyRating::GoodToExcellent),
            "good" => Some(EfficacyRating::Good),
            "fair" => Some(EfficacyRating::Fair),
            "poor" => Some(EfficacyRating::Poor),
            _ => None,
        }
    }
}

impl std::fmt::Display for EfficacyRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reference data for one control product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: String,
    /// Active-ingredient family (IRAC group); rotation is enforced per class.
    pub class: String,
    pub efficacy_on_immature: f64,
    pub efficacy_on_mature: f64,
    /// Pre-harvest interval (days)
    pub pre_harvest_interval: u32,
    /// Restricted-entry interval (days)
    #[serde(default)]
    pub re_entry_interval: u32,
    pub seasonal_max_volume: f64,
    pub max_applications_per_season: u32,
}

impl ProductRecord {
    pub fn efficacy(&self, stage: LifeStage) -> f64 {
        match stage {
            LifeStage::Immature => self.efficacy_on_immature,
            LifeStage::Mature => self.efficacy_on_mature,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let malformed = |msg: String| {
            Err(VineGuardError::MalformedInput(format!(
                "product '{}': {}",
                self.id, msg
            )))
        };

        if self.id.trim().is_empty() {
            return Err(VineGuardError::MalformedInput(
                "product id must not be empty".into(),
            ));
        }
        if self.class.trim().is_empty() {
            return malformed("class must not be empty".into());
        }
        for (label, value) in [
            ("efficacy_on_immature", self.efficacy_on_immature),
            ("efficacy_on_mature", self.efficacy_on_mature),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return malformed(format!("{} must be within [0, 1], got {}", label, value));
            }
        }
        if !self.seasonal_max_volume.is_finite() || self.seasonal_max_volume <= 0.0 {
            return malformed(format!(
                "seasonal_max_volume must be positive, got {}",
                self.seasonal_max_volume
            ));
        }
        if self.max_applications_per_season == 0 {
            return malformed("max_applications_per_season must be at least 1".into());
        }
        Ok(())
    }
}

/// Ordered product reference table. Order is the tie-break priority for selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductTable {
    products: Vec<ProductRecord>,
}

impl ProductTable {
    pub fn new(products: Vec<ProductRecord>) -> Result<Self> {
        if products.is_empty() {
            return Err(VineGuardError::MalformedInput(
                "product table is empty".into(),
            ));
        }

        let mut seen = HashSet::new();
        for product in &products {
            product.validate()?;
            if !seen.insert(product.id.as_str()) {
                return Err(VineGuardError::MalformedInput(format!(
                    "duplicate product id '{}'",
                    product.id
                )));
            }
        }

        Ok(Self { products })
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProductRecord> {
        self.products.iter()
    }

    pub fn get(&self, id: &str) -> Option<&ProductRecord> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn max_pre_harvest_interval(&self) -> u32 {
        self.products
            .iter()
            .map(|p| p.pre_harvest_interval)
            .max()
            .unwrap_or(0)
    }
}
