use crate::models::ProductRecord;
use serde::Serialize;
use std::collections::BTreeMap;

/// Run-scoped usage record. Updated once per application, never rolled back.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UsageLedger {
    cumulative_volume_by_product: BTreeMap<String, f64>,
    application_count_by_product: BTreeMap<String, u32>,
    last_application_day_by_class: BTreeMap<String, u32>,
}

impl UsageLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cumulative_volume(&self, product_id: &str) -> f64 {
        self.cumulative_volume_by_product
            .get(product_id)
            .copied()
            .unwrap_or(0.0)
    }

    pub fn application_count(&self, product_id: &str) -> u32 {
        self.application_count_by_product
            .get(product_id)
            .copied()
            .unwrap_or(0)
    }

    /// `None` means the class has never been applied (−∞).
    pub fn last_application_day(&self, class: &str) -> Option<u32> {
        self.last_application_day_by_class.get(class).copied()
    }

    /// Days elapsed since the class was last applied, `None` if never.
    pub fn days_since_class_use(&self, class: &str, day: u32) -> Option<u32> {
        self.last_application_day(class)
            .map(|last| day.saturating_sub(last))
    }

    pub fn total_applications(&self) -> u32 {
        self.application_count_by_product.values().sum()
    }

    /// Record one application. Volume, count and class last-use change together.
    ///
    /// Returns the product's new cumulative volume.
    pub fn record(&mut self, product: &ProductRecord, day: u32, dose: f64) -> f64 {
        let volume = self
            .cumulative_volume_by_product
            .entry(product.id.clone())
            .or_insert(0.0);
        *volume += dose;
        let cumulative = *volume;

        *self
            .application_count_by_product
            .entry(product.id.clone())
            .or_insert(0) += 1;

        self.last_application_day_by_class
            .insert(product.class.clone(), day);

        cumulative
    }
}
