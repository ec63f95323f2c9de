use super::SelectionStrategy;
use crate::config::SelectionKind;
use crate::models::{LifeStage, ProductRecord};

/// First compliant product in reference-table order
pub struct TableOrder;

impl SelectionStrategy for TableOrder {
    fn id(&self) -> &'static str {
        "table_order"
    }

    fn name(&self) -> &'static str {
        "Reference Table Order"
    }

    fn select<'a>(
        &self,
        compliant: &[&'a ProductRecord],
        _stage: LifeStage,
    ) -> Option<&'a ProductRecord> {
        compliant.first().copied()
    }
}

/// Compliant product with the shortest pre-harvest interval, keeping late-season options open
pub struct ShortestPhi;

impl SelectionStrategy for ShortestPhi {
    fn id(&self) -> &'static str {
        "shortest_phi"
    }

    fn name(&self) -> &'static str {
        "Shortest Pre-Harvest Interval"
    }

    fn select<'a>(
        &self,
        compliant: &[&'a ProductRecord],
        _stage: LifeStage,
    ) -> Option<&'a ProductRecord> {
        // min_by_key keeps the first of equal keys, so table order breaks ties
        compliant
            .iter()
            .copied()
            .min_by_key(|p| p.pre_harvest_interval)
    }
}

/// Compliant product with the highest efficacy on the targeted stage
pub struct HighestEfficacy;

impl SelectionStrategy for HighestEfficacy {
    fn id(&self) -> &'static str {
        "highest_efficacy"
    }

    fn name(&self) -> &'static str {
        "Highest Efficacy"
    }

    fn select<'a>(
        &self,
        compliant: &[&'a ProductRecord],
        stage: LifeStage,
    ) -> Option<&'a ProductRecord> {
        compliant.iter().copied().fold(None, |best, p| match best {
            Some(b) if b.efficacy(stage) >= p.efficacy(stage) => Some(b),
            _ => Some(p),
        })
    }
}

impl SelectionKind {
    pub fn build(&self) -> Box<dyn SelectionStrategy> {
        match self {
            SelectionKind::TableOrder => Box::new(TableOrder),
            SelectionKind::ShortestPhi => Box::new(ShortestPhi),
            SelectionKind::HighestEfficacy => Box::new(HighestEfficacy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, phi: u32, immature: f64) -> ProductRecord {
        ProductRecord {
            id: id.to_string(),
            class: "3A".to_string(),
            efficacy_on_immature: immature,
            efficacy_on_mature: 0.8,
            pre_harvest_interval: phi,
            re_entry_interval: 1,
            seasonal_max_volume: 10.0,
            max_applications_per_season: 3,
        }
    }

    fn ids(selected: Option<&ProductRecord>) -> Option<&str> {
        selected.map(|p| p.id.as_str())
    }

    #[test]
    fn table_order_takes_first() {
        let a = product("Brigade WSB", 30, 0.8);
        let b = product("Mustang MAXX", 1, 0.95);
        let compliant = vec![&a, &b];
        assert_eq!(
            ids(TableOrder.select(&compliant, LifeStage::Immature)),
            Some("Brigade WSB")
        );
        assert_eq!(ids(TableOrder.select(&[], LifeStage::Immature)), None);
    }

    #[test]
    fn shortest_phi_ties_broken_by_table_order() {
        let a = product("Brigade WSB", 30, 0.8);
        let b = product("Aza-Direct", 0, 0.8);
        let c = product("M-Pede", 0, 0.8);
        let compliant = vec![&a, &b, &c];
        assert_eq!(
            ids(ShortestPhi.select(&compliant, LifeStage::Immature)),
            Some("Aza-Direct")
        );
    }

    #[test]
    fn highest_efficacy_uses_stage_and_table_order() {
        let a = product("Brigade WSB", 30, 0.8);
        let b = product("Actara", 5, 0.95);
        let c = product("Danitol 2.4 EC", 21, 0.95);
        let compliant = vec![&a, &b, &c];
        assert_eq!(
            ids(HighestEfficacy.select(&compliant, LifeStage::Immature)),
            Some("Actara")
        );
        // All equal on mature: first in table wins
        assert_eq!(
            ids(HighestEfficacy.select(&compliant, LifeStage::Mature)),
            Some("Brigade WSB")
        );
    }

    #[test]
    fn kinds_build_matching_strategies() {
        assert_eq!(SelectionKind::TableOrder.build().id(), "table_order");
        assert_eq!(SelectionKind::ShortestPhi.build().id(), "shortest_phi");
        assert_eq!(
            SelectionKind::HighestEfficacy.build().id(),
            "highest_efficacy"
        );
    }
}
