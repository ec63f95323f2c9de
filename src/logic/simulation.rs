use super::outcome::{OutcomeEvaluator, OutcomeReport};
use super::population::PopulationModel;
use super::scheduler::{Scheduler, UsageLedger};
use crate::config::Config;
use crate::error::Result;
use crate::models::{EnvironmentSeries, PopulationState, ProductTable, ScheduleRow};
use serde::Serialize;

/// Headline numbers of a season, written as the run summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub days: u32,
    pub harvest_day: u32,
    pub actionable_end: u32,
    pub strategy: String,
    pub applications: usize,
    /// Applications scheduled after the actionable window, left out of the outcome
    pub dropped_applications: usize,
    pub ledger: UsageLedger,
    pub outcome: OutcomeReport,
}

#[derive(Debug, Clone)]
pub struct SimulationRun {
    pub population: Vec<PopulationState>,
    /// Schedule rows for the actionable window only
    pub rows: Vec<ScheduleRow>,
    pub summary: RunSummary,
}

/// Runs population, scheduler and outcome evaluation end to end.
pub struct Simulation<'a> {
    config: &'a Config,
}

impl<'a> Simulation<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    pub fn run(&self, env: &EnvironmentSeries, products: &ProductTable) -> Result<SimulationRun> {
        let season = &self.config.season;
        env.ensure_len(season.days)?;

        tracing::info!(
            "Starting season: {} days, harvest on day {}, {} product(s)",
            season.days,
            season.harvest_day,
            products.len()
        );

        let population = PopulationModel::new(self.config.population.clone()).simulate(env);

        let scheduler = Scheduler::new(self.config.scheduler.clone(), season.harvest_day);
        let schedule = scheduler.run(&population, products)?;

        let evaluator = OutcomeEvaluator::new(
            self.config.economics.clone(),
            self.config.vineyard.clone(),
            season.harvest_day,
        );
        let outcome = evaluator.evaluate(schedule.actionable(), &population);

        let rows = schedule
            .actionable()
            .iter()
            .zip(env.days())
            .zip(&population)
            .map(|((decision, day_env), state)| {
                let row = ScheduleRow::new(season.date_of(decision.day), day_env, state, decision);
                match decision
                    .product_id
                    .as_deref()
                    .and_then(|id| products.get(id))
                {
                    Some(product) => row.with_class(&product.class),
                    None => row,
                }
            })
            .collect();

        let dropped_applications = schedule.decisions()[schedule.actionable().len()..]
            .iter()
            .filter(|d| d.is_application())
            .count();
        if dropped_applications > 0 {
            tracing::info!(
                "{} application(s) after day {} fall inside the pre-harvest window and were dropped",
                dropped_applications,
                schedule.actionable_end()
            );
        }

        let summary = RunSummary {
            days: season.days,
            harvest_day: season.harvest_day,
            actionable_end: schedule.actionable_end(),
            strategy: scheduler.strategy().id().to_string(),
            applications: schedule.application_count(),
            dropped_applications,
            ledger: schedule.ledger().clone(),
            outcome,
        };

        tracing::info!(
            "Season complete: {} application(s) through day {}, profit {:.2}",
            summary.applications,
            summary.actionable_end,
            summary.outcome.profit
        );

        Ok(SimulationRun {
            population,
            rows,
            summary,
        })
    }
}
