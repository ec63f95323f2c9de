use super::UsageLedger;
use crate::config::CapPolicy;
use crate::models::{LifeStage, ProductRecord};
use serde::Serialize;

/// Usage constraints checked for every candidate product, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Constraint {
    Efficacy,
    /// The product's PHI doubles as the minimum gap between same-class applications
    RotationInterval,
    SeasonalVolume,
    ApplicationCount,
    PreHarvestInterval,
}

impl Constraint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Constraint::Efficacy => "efficacy below gate",
            Constraint::RotationInterval => "class rotation interval active",
            Constraint::SeasonalVolume => "seasonal volume exhausted",
            Constraint::ApplicationCount => "application count exhausted",
            Constraint::PreHarvestInterval => "too close to harvest",
        }
    }
}

impl std::fmt::Display for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a product could not be applied on a given day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    pub product: String,
    pub constraint: Constraint,
    pub detail: String,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} ({})", self.product, self.constraint, self.detail)
    }
}

/// Everything a constraint check needs to know about the day being scheduled.
pub struct DayContext<'a> {
    pub day: u32,
    pub harvest_day: u32,
    pub stage: LifeStage,
    pub min_efficacy: f64,
    pub base_rate: f64,
    pub cap_policy: CapPolicy,
    pub ledger: &'a UsageLedger,
}

impl DayContext<'_> {
    pub fn dose_for(&self, product: &ProductRecord) -> f64 {
        self.base_rate * product.efficacy(self.stage)
    }
}

/// Check every constraint for `product`, reporting the first one that fails.
pub fn check(product: &ProductRecord, ctx: &DayContext<'_>) -> Result<(), Rejection> {
    let reject = |constraint: Constraint, detail: String| Rejection {
        product: product.id.clone(),
        constraint,
        detail,
    };

    let efficacy = product.efficacy(ctx.stage);
    if efficacy < ctx.min_efficacy {
        return Err(reject(
            Constraint::Efficacy,
            format!(
                "{} efficacy {:.2} < {:.2}",
                ctx.stage, efficacy, ctx.min_efficacy
            ),
        ));
    }

    if let Some(elapsed) = ctx.ledger.days_since_class_use(&product.class, ctx.day) {
        if elapsed <= product.pre_harvest_interval {
            return Err(reject(
                Constraint::RotationInterval,
                format!(
                    "class {} applied {} day(s) ago, needs more than {}",
                    product.class, elapsed, product.pre_harvest_interval
                ),
            ));
        }
    }

    let used = ctx.ledger.cumulative_volume(&product.id);
    let dose = ctx.dose_for(product);
    let volume_ok = match ctx.cap_policy {
        CapPolicy::PostCommit => used < product.seasonal_max_volume,
        CapPolicy::PreCommit => used + dose <= product.seasonal_max_volume,
    };
    if !volume_ok {
        return Err(reject(
            Constraint::SeasonalVolume,
            format!(
                "used {:.3} + dose {:.3} of {:.3}",
                used, dose, product.seasonal_max_volume
            ),
        ));
    }

    let count = ctx.ledger.application_count(&product.id);
    if count >= product.max_applications_per_season {
        return Err(reject(
            Constraint::ApplicationCount,
            format!(
                "{} of {} applications used",
                count, product.max_applications_per_season
            ),
        ));
    }

    let last_legal_day = i64::from(ctx.harvest_day) - i64::from(product.pre_harvest_interval);
    if i64::from(ctx.day) > last_legal_day {
        return Err(reject(
            Constraint::PreHarvestInterval,
            format!(
                "PHI {} days, harvest on day {}",
                product.pre_harvest_interval, ctx.harvest_day
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> ProductRecord {
        ProductRecord {
            id: "Imidan 70WP".to_string(),
            class: "1B".to_string(),
            efficacy_on_immature: 0.25,
            efficacy_on_mature: 0.95,
            pre_harvest_interval: 7,
            re_entry_interval: 14,
            seasonal_max_volume: 2.0,
            max_applications_per_season: 2,
        }
    }

    fn ctx(day: u32, stage: LifeStage, ledger: &UsageLedger) -> DayContext<'_> {
        DayContext {
            day,
            harvest_day: 100,
            stage,
            min_efficacy: 0.75,
            base_rate: 1.0,
            cap_policy: CapPolicy::PostCommit,
            ledger,
        }
    }

    fn rejected_by(result: Result<(), Rejection>) -> Option<Constraint> {
        result.err().map(|r| r.constraint)
    }

    #[test]
    fn compliant_product_passes() {
        let ledger = UsageLedger::new();
        assert!(check(&product(), &ctx(10, LifeStage::Mature, &ledger)).is_ok());
    }

    #[test]
    fn low_efficacy_stage_rejected() {
        let ledger = UsageLedger::new();
        let result = check(&product(), &ctx(10, LifeStage::Immature, &ledger));
        assert_eq!(rejected_by(result), Some(Constraint::Efficacy));
    }

    #[test]
    fn rotation_interval_uses_phi() {
        let p = product();
        let mut ledger = UsageLedger::new();
        ledger.record(&p, 10, 0.5);

        // 7 days elapsed is not strictly greater than PHI 7
        let result = check(&p, &ctx(17, LifeStage::Mature, &ledger));
        assert_eq!(rejected_by(result), Some(Constraint::RotationInterval));
        assert!(check(&p, &ctx(18, LifeStage::Mature, &ledger)).is_ok());
    }

    #[test]
    fn volume_gate_depends_on_policy() {
        let p = product();
        let mut ledger = UsageLedger::new();
        ledger.record(&p, 1, 1.5);

        let post = ctx(30, LifeStage::Mature, &ledger);
        assert!(check(&p, &post).is_ok());

        let pre = DayContext {
            cap_policy: CapPolicy::PreCommit,
            ..ctx(30, LifeStage::Mature, &ledger)
        };
        assert_eq!(rejected_by(check(&p, &pre)), Some(Constraint::SeasonalVolume));
    }

    #[test]
    fn exhausted_volume_rejected_under_post_commit() {
        let p = product();
        let mut ledger = UsageLedger::new();
        ledger.record(&p, 1, 2.0);
        let result = check(&p, &ctx(30, LifeStage::Mature, &ledger));
        assert_eq!(rejected_by(result), Some(Constraint::SeasonalVolume));
    }

    #[test]
    fn application_count_enforced() {
        let mut p = product();
        p.seasonal_max_volume = 100.0;
        let mut ledger = UsageLedger::new();
        ledger.record(&p, 1, 0.95);
        ledger.record(&p, 10, 0.95);
        let result = check(&p, &ctx(30, LifeStage::Mature, &ledger));
        assert_eq!(rejected_by(result), Some(Constraint::ApplicationCount));
    }

    #[test]
    fn pre_harvest_interval_enforced() {
        let ledger = UsageLedger::new();
        assert!(check(&product(), &ctx(93, LifeStage::Mature, &ledger)).is_ok());
        let result = check(&product(), &ctx(94, LifeStage::Mature, &ledger));
        assert_eq!(rejected_by(result), Some(Constraint::PreHarvestInterval));
    }

    #[test]
    fn phi_longer_than_harvest_never_legal() {
        let mut p = product();
        p.pre_harvest_interval = 150;
        let ledger = UsageLedger::new();
        let result = check(&p, &ctx(1, LifeStage::Mature, &ledger));
        assert_eq!(rejected_by(result), Some(Constraint::PreHarvestInterval));
    }

    #[test]
    fn rejection_display_names_product_and_constraint() {
        let ledger = UsageLedger::new();
        let rejection = check(&product(), &ctx(99, LifeStage::Mature, &ledger)).unwrap_err();
        let text = rejection.to_string();
        assert!(text.contains("Imidan 70WP"));
        assert!(text.contains("too close to harvest"));
    }
}
