use crate::logic::scheduler::Rejection;
use crate::models::LifeStage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VineGuardError {
    #[error(
        "Unmet treatment constraint on day {day}: {stage} pressure requires treatment but no product qualifies ({})",
        describe_rejections(.rejections)
    )]
    UnmetTreatmentConstraint {
        day: u32,
        stage: LifeStage,
        rejections: Vec<Rejection>,
    },

    #[error(
        "Seasonal cap exceeded on day {day}: product '{product}' reached {cumulative:.3} (max {cap:.3})"
    )]
    SeasonalCapExceeded {
        day: u32,
        product: String,
        cumulative: f64,
        cap: f64,
    },

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

fn describe_rejections(rejections: &[Rejection]) -> String {
    if rejections.is_empty() {
        return "no product was selected".to_string();
    }
    rejections
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, VineGuardError>;
