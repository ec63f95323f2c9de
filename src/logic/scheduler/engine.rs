use super::constraints::{self, DayContext};
use super::{SelectionStrategy, UsageLedger};
use crate::config::SchedulerConfig;
use crate::error::{Result, VineGuardError};
use crate::logic::calculations::pressure_density;
use crate::models::{ApplicationDecision, PopulationState, ProductTable, SeasonPhase};
use serde::Serialize;

/// Result of a completed scheduling pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schedule {
    decisions: Vec<ApplicationDecision>,
    ledger: UsageLedger,
    actionable_end: u32,
}

impl Schedule {
    /// Every decision, including the non-actionable tail.
    pub fn decisions(&self) -> &[ApplicationDecision] {
        &self.decisions
    }

    /// Decisions for days `1..=actionable_end`.
    pub fn actionable(&self) -> &[ApplicationDecision] {
        let end = (self.actionable_end as usize).min(self.decisions.len());
        &self.decisions[..end]
    }

    pub fn actionable_end(&self) -> u32 {
        self.actionable_end
    }

    pub fn ledger(&self) -> &UsageLedger {
        &self.ledger
    }

    pub fn application_count(&self) -> usize {
        self.actionable()
            .iter()
            .filter(|d| d.is_application())
            .count()
    }
}

/// Greedy day-by-day treatment scheduler.
///
/// Days are processed strictly in order; each day's choice depends on the ledger
/// state left by the previous day, so there is no backtracking.
pub struct Scheduler {
    params: SchedulerConfig,
    harvest_day: u32,
    strategy: Box<dyn SelectionStrategy>,
}

impl Scheduler {
    pub fn new(params: SchedulerConfig, harvest_day: u32) -> Self {
        let strategy = params.strategy.build();
        Self {
            params,
            harvest_day,
            strategy,
        }
    }

    pub fn strategy(&self) -> &dyn SelectionStrategy {
        self.strategy.as_ref()
    }

    pub fn phase(&self, day: u32) -> SeasonPhase {
        if day <= self.params.summer_end_day {
            SeasonPhase::Summer
        } else {
            SeasonPhase::Autumn
        }
    }

    fn threshold(&self, phase: SeasonPhase) -> f64 {
        match phase {
            SeasonPhase::Summer => self.params.immature_threshold,
            SeasonPhase::Autumn => self.params.mature_threshold,
        }
    }

    /// Schedule the whole season with a fresh ledger.
    pub fn run(&self, population: &[PopulationState], products: &ProductTable) -> Result<Schedule> {
        for product in products.iter() {
            if product.efficacy_on_immature < self.params.min_efficacy
                && product.efficacy_on_mature < self.params.min_efficacy
            {
                tracing::warn!(
                    "Product '{}' is below the {:.2} efficacy gate for both stages and will never be selected",
                    product.id,
                    self.params.min_efficacy
                );
            }
        }

        let mut ledger = UsageLedger::new();
        let decisions = self.run_with_ledger(population, products, &mut ledger)?;

        let actionable_end = self
            .harvest_day
            .saturating_sub(products.max_pre_harvest_interval())
            .min(decisions.len() as u32);

        tracing::info!(
            "Scheduled {} days using {}: {} application(s), actionable through day {}",
            decisions.len(),
            self.strategy.name(),
            ledger.total_applications(),
            actionable_end
        );

        Ok(Schedule {
            decisions,
            ledger,
            actionable_end,
        })
    }

    /// Schedule the season against a caller-owned ledger.
    ///
    /// On a fatal error the ledger keeps every update committed so far, including
    /// the application that overshot a seasonal cap.
    pub fn run_with_ledger(
        &self,
        population: &[PopulationState],
        products: &ProductTable,
        ledger: &mut UsageLedger,
    ) -> Result<Vec<ApplicationDecision>> {
        let mut decisions = Vec::with_capacity(population.len());

        for (idx, state) in population.iter().enumerate() {
            let expected = idx as u32 + 1;
            if state.day != expected {
                return Err(VineGuardError::MalformedInput(format!(
                    "population series is not contiguous: expected day {}, found day {}",
                    expected, state.day
                )));
            }

            decisions.push(self.decide(state, products, ledger)?);
        }

        Ok(decisions)
    }

    fn decide(
        &self,
        state: &PopulationState,
        products: &ProductTable,
        ledger: &mut UsageLedger,
    ) -> Result<ApplicationDecision> {
        let day = state.day;
        let phase = self.phase(day);
        let stage = phase.target_stage();
        let density = pressure_density(state.count(stage), self.params.pressure_area);
        let threshold = self.threshold(phase);

        tracing::trace!(day, %phase, density, threshold, "evaluating pressure");

        if density < threshold {
            return Ok(ApplicationDecision::no_treatment(day));
        }

        let ctx = DayContext {
            day,
            harvest_day: self.harvest_day,
            stage,
            min_efficacy: self.params.min_efficacy,
            base_rate: self.params.base_rate,
            cap_policy: self.params.cap_policy,
            ledger: &*ledger,
        };

        let mut compliant = Vec::new();
        let mut rejections = Vec::new();
        for product in products.iter() {
            match constraints::check(product, &ctx) {
                Ok(()) => compliant.push(product),
                Err(rejection) => rejections.push(rejection),
            }
        }

        let Some(product) = self.strategy.select(&compliant, stage) else {
            return Err(VineGuardError::UnmetTreatmentConstraint {
                day,
                stage,
                rejections,
            });
        };
        let dose = ctx.dose_for(product);

        let cumulative = ledger.record(product, day, dose);
        tracing::debug!(
            "Day {}: applied '{}' (class {}) at {:.3} against {} pressure {:.2}",
            day,
            product.id,
            product.class,
            dose,
            stage,
            density
        );

        if cumulative > product.seasonal_max_volume {
            return Err(VineGuardError::SeasonalCapExceeded {
                day,
                product: product.id.clone(),
                cumulative,
                cap: product.seasonal_max_volume,
            });
        }

        Ok(ApplicationDecision::applied(day, &product.id, dose))
    }
}
