use crate::config::WeatherSource;
use crate::error::{Result, VineGuardError};
use crate::models::{DailyEnvironment, EnvironmentSeries};
use std::io::Read;

/// Parse a `day,temperature,precipitation` CSV into a validated series.
pub fn parse_weather_csv<R: Read>(reader: R) -> Result<EnvironmentSeries> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut days = Vec::new();
    for (line, result) in reader.deserialize::<DailyEnvironment>().enumerate() {
        let day = result.map_err(|e| {
            VineGuardError::MalformedInput(format!("weather row {}: {}", line + 1, e))
        })?;
        days.push(day);
    }

    EnvironmentSeries::new(days)
}

/// Load the season's weather from the configured source.
pub fn load_weather(source: &WeatherSource, n_days: u32) -> Result<EnvironmentSeries> {
    let series = match source {
        WeatherSource::Csv { path } => {
            let file = std::fs::File::open(path).map_err(|e| {
                VineGuardError::MalformedInput(format!(
                    "cannot open weather file {}: {}",
                    path.display(),
                    e
                ))
            })?;
            let series = parse_weather_csv(file)?;
            tracing::info!(
                "Loaded {} days of weather from {}",
                series.len(),
                path.display()
            );
            series
        }
        WeatherSource::Constant {
            temperature,
            precipitation,
        } => {
            tracing::info!(
                "Using constant weather: {:.1}°C, {:.1}mm for {} days",
                temperature,
                precipitation,
                n_days
            );
            EnvironmentSeries::constant(n_days, *temperature, *precipitation)?
        }
    };

    series.ensure_len(n_days)?;
    Ok(series)
}
