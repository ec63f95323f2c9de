use super::calculations::treated_area;
use crate::config::{EconomicsConfig, VineyardConfig};
use crate::models::{ApplicationDecision, PopulationState};
use serde::Serialize;

/// Every term of the season's profit calculation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeReport {
    pub applications: usize,
    pub treated_area: f64,
    pub mold_impact: f64,
    pub harvest_penalty: f64,
    pub effective_yield: f64,
    pub revenue: f64,
    pub pesticide_cost: f64,
    pub profit: f64,
}

pub struct OutcomeEvaluator {
    economics: EconomicsConfig,
    vineyard: VineyardConfig,
    harvest_day: u32,
}

impl OutcomeEvaluator {
    pub fn new(economics: EconomicsConfig, vineyard: VineyardConfig, harvest_day: u32) -> Self {
        Self {
            economics,
            vineyard,
            harvest_day,
        }
    }

    pub fn evaluate(
        &self,
        decisions: &[ApplicationDecision],
        population: &[PopulationState],
    ) -> OutcomeReport {
        let econ = &self.economics;

        let mold_impact: f64 = population
            .iter()
            .map(|s| econ.mold_growth_rate * s.total())
            .sum();

        let applied: Vec<&ApplicationDecision> =
            decisions.iter().filter(|d| d.is_application()).collect();

        let harvest_penalty: f64 = applied
            .iter()
            .filter(|d| d.day > self.harvest_day)
            .map(|d| econ.harvest_penalty_rate * f64::from(d.day - self.harvest_day))
            .sum();

        let area = treated_area(self.vineyard.side_length, self.vineyard.application_depth);
        let pesticide_cost: f64 = applied
            .iter()
            .map(|_| econ.pesticide_cost_per_area * area)
            .sum();

        let effective_yield = (econ.base_yield - mold_impact - harvest_penalty).max(0.0);
        let revenue = effective_yield * econ.price_per_unit;
        let profit = revenue - pesticide_cost;

        tracing::info!(
            "Outcome: {} application(s), yield {:.3} of {:.3}, profit {:.2}",
            applied.len(),
            effective_yield,
            econ.base_yield,
            profit
        );

        OutcomeReport {
            applications: applied.len(),
            treated_area: area,
            mold_impact,
            harvest_penalty,
            effective_yield,
            revenue,
            pesticide_cost,
            profit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zero_rates(base_yield: f64, price: f64) -> EconomicsConfig {
        EconomicsConfig {
            base_yield,
            price_per_unit: price,
            mold_growth_rate: 0.0,
            harvest_penalty_rate: 0.0,
            pesticide_cost_per_area: 0.0,
        }
    }

    fn decisions(applied_days: &[u32], n_days: u32) -> Vec<ApplicationDecision> {
        (1..=n_days)
            .map(|day| {
                if applied_days.contains(&day) {
                    ApplicationDecision::applied(day, "Actara", 0.95)
                } else {
                    ApplicationDecision::no_treatment(day)
                }
            })
            .collect()
    }

    fn population(n_days: u32, immature: f64, mature: f64) -> Vec<PopulationState> {
        (1..=n_days)
            .map(|day| PopulationState::new(day, immature, mature))
            .collect()
    }

    #[test]
    fn zero_rates_return_base_revenue_exactly() {
        let evaluator =
            OutcomeEvaluator::new(zero_rates(7.3, 1850.0), VineyardConfig::default(), 170);
        let report = evaluator.evaluate(&decisions(&[3, 40, 90], 140), &population(183, 1200.0, 40.0));

        assert_eq!(report.profit, 7.3 * 1850.0);
        assert_eq!(report.applications, 3);
    }

    #[test]
    fn mold_impact_sums_both_stages() {
        let econ = EconomicsConfig {
            mold_growth_rate: 0.001,
            ..zero_rates(10.0, 100.0)
        };
        let evaluator = OutcomeEvaluator::new(econ, VineyardConfig::default(), 170);
        let report = evaluator.evaluate(&decisions(&[], 10), &population(10, 100.0, 50.0));

        // 10 days x 150 individuals x 0.001
        assert!((report.mold_impact - 1.5).abs() < 1e-9);
        assert!((report.effective_yield - 8.5).abs() < 1e-9);
        assert!((report.profit - 850.0).abs() < 1e-6);
    }

    #[test]
    fn pesticide_cost_per_application() {
        let econ = EconomicsConfig {
            pesticide_cost_per_area: 0.5,
            ..zero_rates(10.0, 100.0)
        };
        let vineyard = VineyardConfig {
            side_length: 100.0,
            application_depth: 5.0,
        };
        let evaluator = OutcomeEvaluator::new(econ, vineyard, 170);
        let report = evaluator.evaluate(&decisions(&[1, 2], 10), &population(10, 0.0, 0.0));

        assert!((report.treated_area - 1900.0).abs() < 1e-9);
        assert!((report.pesticide_cost - 1900.0).abs() < 1e-9);
        assert!((report.profit - (1000.0 - 1900.0)).abs() < 1e-6);
    }

    #[test]
    fn harvest_penalty_only_after_harvest() {
        let econ = EconomicsConfig {
            harvest_penalty_rate: 0.5,
            ..zero_rates(10.0, 1.0)
        };
        let evaluator = OutcomeEvaluator::new(econ, VineyardConfig::default(), 5);
        let report = evaluator.evaluate(&decisions(&[4, 5, 7, 9], 10), &population(10, 0.0, 0.0));

        // (7 - 5) + (9 - 5) = 6 days late
        assert!((report.harvest_penalty - 3.0).abs() < 1e-12);
        assert!((report.profit - 7.0).abs() < 1e-12);
    }

    #[test]
    fn yield_never_negative() {
        let econ = EconomicsConfig {
            mold_growth_rate: 1.0,
            pesticide_cost_per_area: 0.01,
            ..zero_rates(10.0, 100.0)
        };
        let evaluator = OutcomeEvaluator::new(econ, VineyardConfig::default(), 170);
        let report = evaluator.evaluate(&decisions(&[1], 10), &population(10, 1000.0, 0.0));

        assert_eq!(report.effective_yield, 0.0);
        assert_eq!(report.revenue, 0.0);
        assert!((report.profit + 19.0).abs() < 1e-9);
    }
}
