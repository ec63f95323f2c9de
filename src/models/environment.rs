use crate::error::{Result, VineGuardError};
use serde::{Deserialize, Serialize};

/// Weather for a single simulated day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyEnvironment {
    pub day: u32,
    /// Mean air temperature (°C)
    pub temperature: f64,
    /// Daily precipitation (mm)
    pub precipitation: f64,
}

impl DailyEnvironment {
    pub fn new(day: u32, temperature: f64, precipitation: f64) -> Self {
        Self {
            day,
            temperature,
            precipitation,
        }
    }
}

/// Validated environment series: contiguous days starting at day 1.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnvironmentSeries {
    days: Vec<DailyEnvironment>,
}

impl EnvironmentSeries {
    pub fn new(days: Vec<DailyEnvironment>) -> Result<Self> {
        if days.is_empty() {
            return Err(VineGuardError::MalformedInput(
                "environment series is empty".into(),
            ));
        }

        for (idx, env) in days.iter().enumerate() {
            let expected = idx as u32 + 1;
            if env.day != expected {
                return Err(VineGuardError::MalformedInput(format!(
                    "environment series is not contiguous: expected day {}, found day {}",
                    expected, env.day
                )));
            }
            if !env.temperature.is_finite() {
                return Err(VineGuardError::MalformedInput(format!(
                    "day {}: temperature is not a finite number",
                    env.day
                )));
            }
            if !env.precipitation.is_finite() || env.precipitation < 0.0 {
                return Err(VineGuardError::MalformedInput(format!(
                    "day {}: precipitation must be a non-negative number, got {}",
                    env.day, env.precipitation
                )));
            }
        }

        Ok(Self { days })
    }

    /// Same weather every day of the season.
    pub fn constant(n_days: u32, temperature: f64, precipitation: f64) -> Result<Self> {
        let days = (1..=n_days)
            .map(|day| DailyEnvironment::new(day, temperature, precipitation))
            .collect();
        Self::new(days)
    }

    pub fn days(&self) -> &[DailyEnvironment] {
        &self.days
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Ensure the series spans exactly the configured season.
    pub fn ensure_len(&self, n_days: u32) -> Result<()> {
        if self.days.len() != n_days as usize {
            return Err(VineGuardError::MalformedInput(format!(
                "environment series has {} days but the season is {} days long",
                self.days.len(),
                n_days
            )));
        }
        Ok(())
    }
}
