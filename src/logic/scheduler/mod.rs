pub mod constraints;
pub mod engine;
pub mod ledger;
pub mod strategies;

pub use constraints::Rejection;
pub use engine::Scheduler;
pub use ledger::UsageLedger;

use crate::models::{LifeStage, ProductRecord};

/// Trait for picking one product among those that passed every constraint
pub trait SelectionStrategy: Send + Sync {
    /// Unique identifier for this strategy
    fn id(&self) -> &'static str;

    /// Human-readable name
    fn name(&self) -> &'static str;

    /// Choose from `compliant`, which is given in reference-table order
    fn select<'a>(
        &self,
        compliant: &[&'a ProductRecord],
        stage: LifeStage,
    ) -> Option<&'a ProductRecord>;
}
