use super::{DailyEnvironment, LifeStage, PopulationState};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeasonPhase {
    Summer,
    Autumn,
}

impl SeasonPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeasonPhase::Summer => "Summer",
            SeasonPhase::Autumn => "Autumn",
        }
    }

    /// Life stage whose pressure drives treatment in this phase.
    pub fn target_stage(&self) -> LifeStage {
        match self {
            SeasonPhase::Summer => LifeStage::Immature,
            SeasonPhase::Autumn => LifeStage::Mature,
        }
    }
}

impl std::fmt::Display for SeasonPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The scheduler's verdict for one day. Created once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationDecision {
    pub day: u32,
    pub product_id: Option<String>,
    pub dose_rate: f64,
}

impl ApplicationDecision {
    pub fn no_treatment(day: u32) -> Self {
        Self {
            day,
            product_id: None,
            dose_rate: 0.0,
        }
    }

    pub fn applied(day: u32, product_id: &str, dose_rate: f64) -> Self {
        Self {
            day,
            product_id: Some(product_id.to_string()),
            dose_rate,
        }
    }

    pub fn is_application(&self) -> bool {
        self.product_id.is_some()
    }
}

/// One line of the exported schedule: the decision joined with that day's inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub day: u32,
    pub date: NaiveDate,
    pub temperature: f64,
    pub precipitation: f64,
    pub immature_count: f64,
    pub mature_count: f64,
    pub product_id: Option<String>,
    pub product_class: Option<String>,
    pub dose_rate: f64,
}

impl ScheduleRow {
    pub fn new(
        date: NaiveDate,
        env: &DailyEnvironment,
        population: &PopulationState,
        decision: &ApplicationDecision,
    ) -> Self {
        Self {
            day: decision.day,
            date,
            temperature: env.temperature,
            precipitation: env.precipitation,
            immature_count: population.immature_count,
            mature_count: population.mature_count,
            product_id: decision.product_id.clone(),
            product_class: None,
            dose_rate: decision.dose_rate,
        }
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.product_class = Some(class.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_targets_stage() {
        assert_eq!(SeasonPhase::Summer.target_stage(), LifeStage::Immature);
        assert_eq!(SeasonPhase::Autumn.target_stage(), LifeStage::Mature);
    }

    #[test]
    fn decision_constructors() {
        let none = ApplicationDecision::no_treatment(3);
        assert!(!none.is_application());
        assert_eq!(none.dose_rate, 0.0);

        let applied = ApplicationDecision::applied(4, "Actara", 0.95);
        assert!(applied.is_application());
        assert_eq!(applied.product_id.as_deref(), Some("Actara"));
    }

    #[test]
    fn row_joins_inputs() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let env = DailyEnvironment::new(7, 22.5, 4.0);
        let pop = PopulationState::new(7, 1050.0, 0.0);
        let decision = ApplicationDecision::applied(7, "Danitol 2.4 EC", 0.95);

        let row = ScheduleRow::new(date, &env, &pop, &decision).with_class("3A");

        assert_eq!(row.day, 7);
        assert_eq!(row.temperature, 22.5);
        assert_eq!(row.immature_count, 1050.0);
        assert_eq!(row.product_class.as_deref(), Some("3A"));
        assert_eq!(row.dose_rate, 0.95);
    }
}
