use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifeStage {
    Immature,
    Mature,
}

impl LifeStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifeStage::Immature => "immature",
            LifeStage::Mature => "mature",
        }
    }
}

impl std::fmt::Display for LifeStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pest counts at the end of a simulated day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PopulationState {
    pub day: u32,
    pub immature_count: f64,
    pub mature_count: f64,
}

impl PopulationState {
    pub fn new(day: u32, immature_count: f64, mature_count: f64) -> Self {
        Self {
            day,
            immature_count,
            mature_count,
        }
    }

    pub fn count(&self, stage: LifeStage) -> f64 {
        match stage {
            LifeStage::Immature => self.immature_count,
            LifeStage::Mature => self.mature_count,
        }
    }

    pub fn total(&self) -> f64 {
        self.immature_count + self.mature_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_by_stage() {
        let state = PopulationState::new(4, 120.0, 30.0);
        assert_eq!(state.count(LifeStage::Immature), 120.0);
        assert_eq!(state.count(LifeStage::Mature), 30.0);
        assert_eq!(state.total(), 150.0);
    }

    #[test]
    fn life_stage_display() {
        assert_eq!(LifeStage::Immature.to_string(), "immature");
        assert_eq!(LifeStage::Mature.to_string(), "mature");
    }
}
