use super::calculations::development_factor;
use crate::config::PopulationConfig;
use crate::models::{DailyEnvironment, EnvironmentSeries, PopulationState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DevelopmentPhase {
    Hatch,
    /// Immature population grows, nothing matures yet
    Early,
    /// A daily cohort migrates from immature to mature
    Transition,
    /// Every remaining immature individual matures
    Late,
}

/// Deterministic first-order population recurrence driven by daily weather.
#[derive(Debug, Clone)]
pub struct PopulationModel {
    params: PopulationConfig,
}

impl PopulationModel {
    pub fn new(params: PopulationConfig) -> Self {
        Self { params }
    }

    fn phase(&self, day: u32) -> DevelopmentPhase {
        if day <= 1 {
            DevelopmentPhase::Hatch
        } else if day < self.params.transition_start_day {
            DevelopmentPhase::Early
        } else if day < self.params.late_start_day {
            DevelopmentPhase::Transition
        } else {
            DevelopmentPhase::Late
        }
    }

    /// Produce one state per day of the series, in day order.
    pub fn simulate(&self, env: &EnvironmentSeries) -> Vec<PopulationState> {
        let mut states: Vec<PopulationState> = Vec::with_capacity(env.len());

        for today in env.days() {
            let state = self.step(states.last(), today);
            states.push(state);
        }

        if let (Some(first), Some(last)) = (states.first(), states.last()) {
            tracing::info!(
                "Simulated {} days: {:.0} eggs hatched, {:.0} mature at day {}",
                states.len(),
                first.immature_count,
                last.mature_count,
                last.day
            );
        }

        states
    }

    /// Advance from `prev`, which is `None` only for the hatch day.
    fn step(&self, prev: Option<&PopulationState>, today: &DailyEnvironment) -> PopulationState {
        let (prev_immature, prev_mature) =
            prev.map_or((0.0, 0.0), |p| (p.immature_count, p.mature_count));
        let cohort = (prev_immature
            * self.params.base_growth_rate
            * development_factor(today.temperature, today.precipitation))
        .round();

        let (immature, mature) = match self.phase(today.day) {
            DevelopmentPhase::Hatch => (self.params.initial_eggs, 0.0),
            DevelopmentPhase::Early => (prev_immature + cohort, prev_mature),
            DevelopmentPhase::Transition => {
                let migrating = cohort.min(prev_immature);
                (prev_immature - migrating, prev_mature + migrating)
            }
            DevelopmentPhase::Late => (0.0, prev_mature + prev_immature),
        };

        tracing::trace!(
            day = today.day,
            immature,
            mature,
            "population step"
        );

        PopulationState::new(today.day, immature, mature)
    }
}
