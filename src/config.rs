use crate::error::{Result, VineGuardError};
use chrono::NaiveDate;
use dialoguer::Input;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::ops::RangeBounds;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub season: SeasonConfig,
    pub population: PopulationConfig,
    pub scheduler: SchedulerConfig,
    pub vineyard: VineyardConfig,
    pub economics: EconomicsConfig,
    pub inputs: InputsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SeasonConfig {
    /// Number of simulated days
    pub days: u32,
    pub harvest_day: u32,
    /// Calendar date of day 1
    pub start_date: NaiveDate,
}

impl Default for SeasonConfig {
    fn default() -> Self {
        Self {
            days: 183,
            harvest_day: 170,
            start_date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap_or_default(),
        }
    }
}

impl SeasonConfig {
    pub fn date_of(&self, day: u32) -> NaiveDate {
        self.start_date + chrono::Days::new(u64::from(day.saturating_sub(1)))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PopulationConfig {
    pub initial_eggs: f64,
    pub base_growth_rate: f64,
    /// First day on which immature individuals start maturing
    pub transition_start_day: u32,
    /// First day on which every remaining immature individual matures
    pub late_start_day: u32,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            initial_eggs: 1000.0,
            base_growth_rate: 0.01,
            transition_start_day: 60,
            late_start_day: 120,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionKind {
    #[default]
    TableOrder,
    ShortestPhi,
    HighestEfficacy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CapPolicy {
    /// Commit the dose while headroom remains; overshoot aborts the run.
    #[default]
    PostCommit,
    /// Treat a product whose dose would overshoot as non-compliant.
    PreCommit,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Last day judged by immature pressure; later days use mature pressure
    pub summer_end_day: u32,
    pub immature_threshold: f64,
    pub mature_threshold: f64,
    /// Modeled area the thresholds are expressed per
    pub pressure_area: f64,
    pub min_efficacy: f64,
    pub base_rate: f64,
    pub strategy: SelectionKind,
    pub cap_policy: CapPolicy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            summer_end_day: 92,
            immature_threshold: 0.9,
            mature_threshold: 0.3,
            pressure_area: 1.0,
            min_efficacy: 0.75,
            base_rate: 1.0,
            strategy: SelectionKind::TableOrder,
            cap_policy: CapPolicy::PostCommit,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VineyardConfig {
    pub side_length: f64,
    /// Width of the sprayed band measured inward from the perimeter
    pub application_depth: f64,
}

impl Default for VineyardConfig {
    fn default() -> Self {
        Self {
            side_length: 100.0,
            application_depth: 5.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EconomicsConfig {
    pub base_yield: f64,
    pub price_per_unit: f64,
    pub mold_growth_rate: f64,
    pub harvest_penalty_rate: f64,
    pub pesticide_cost_per_area: f64,
}

impl Default for EconomicsConfig {
    fn default() -> Self {
        Self {
            base_yield: 10.0,
            price_per_unit: 2000.0,
            mold_growth_rate: 0.00001,
            harvest_penalty_rate: 0.1,
            pesticide_cost_per_area: 0.05,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct InputsConfig {
    pub weather: WeatherSource,
    pub products: ProductSource,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum WeatherSource {
    Csv { path: PathBuf },
    Constant { temperature: f64, precipitation: f64 },
}

impl Default for WeatherSource {
    fn default() -> Self {
        WeatherSource::Constant {
            temperature: 25.0,
            precipitation: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductTableFormat {
    #[default]
    Native,
    Label,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProductSource {
    pub path: PathBuf,
    #[serde(default)]
    pub format: ProductTableFormat,
    #[serde(default)]
    pub label_defaults: LabelDefaults,
}

impl Default for ProductSource {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/products.csv"),
            format: ProductTableFormat::Native,
            label_defaults: LabelDefaults::default(),
        }
    }
}

/// Limits applied to label-sheet products, which do not carry them.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LabelDefaults {
    pub max_applications_per_season: u32,
    /// Falls back to `Rate/A × max_applications_per_season` when unset
    pub seasonal_max_volume: Option<f64>,
}

impl Default for LabelDefaults {
    fn default() -> Self {
        Self {
            max_applications_per_season: 2,
            seasonal_max_volume: None,
        }
    }
}

impl Config {
    pub fn load(config_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) => p,
            None => Self::find_config_path()?,
        };

        if !config_path.exists() {
            return Err(VineGuardError::Config(format!(
                "Config file not found at {:?}. Run `vineguard init` to set up.",
                config_path
            )));
        }

        let config_str = std::fs::read_to_string(&config_path)
            .map_err(|e| VineGuardError::Config(format!("Failed to read config: {}", e)))?;

        let mut config = Self::from_yaml_str(&config_str)?;

        if let Some(base) = config_path.parent() {
            config.resolve_paths(base);
        }

        tracing::info!("Loaded configuration from {}", config_path.display());
        Ok(config)
    }

    /// Parse and validate a YAML document after `${VAR}` substitution.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let content = Self::substitute_env_vars(content)?;

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| VineGuardError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Search for config.yaml in standard locations.
    /// Returns the path of the first found config, or the XDG default path if none found.
    fn find_config_path() -> Result<PathBuf> {
        let local_config = PathBuf::from("config/config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("vineguard").join("config.yaml");
            if xdg_config.exists() {
                return Ok(xdg_config);
            }
        }

        Self::default_config_path()
    }

    /// Default path for writing new config files (~/.config/vineguard/config.yaml).
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| VineGuardError::Config("Cannot determine config directory".into()))?
            .join("vineguard");
        Ok(config_dir.join("config.yaml"))
    }

    /// Relative input paths are interpreted against the directory holding the config file.
    fn resolve_paths(&mut self, base: &Path) {
        if let WeatherSource::Csv { path } = &mut self.inputs.weather {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        if self.inputs.products.path.is_relative() {
            self.inputs.products.path = base.join(&self.inputs.products.path);
        }
    }

    pub fn validate(&self) -> Result<()> {
        let season = &self.season;
        check_num("season.days", season.days, 1..=3660)?;
        check_num("season.harvest_day", season.harvest_day, 1..)?;

        let pop = &self.population;
        check_num("population.initial_eggs", pop.initial_eggs, 0.0..f64::INFINITY)?;
        check_num(
            "population.base_growth_rate",
            pop.base_growth_rate,
            0.0..f64::INFINITY,
        )?;
        check_num(
            "population.transition_start_day",
            pop.transition_start_day,
            2..,
        )?;
        check_num(
            "population.late_start_day",
            pop.late_start_day,
            pop.transition_start_day..,
        )?;

        let sched = &self.scheduler;
        check_num(
            "scheduler.immature_threshold",
            sched.immature_threshold,
            0.0..f64::INFINITY,
        )?;
        check_num(
            "scheduler.mature_threshold",
            sched.mature_threshold,
            0.0..f64::INFINITY,
        )?;
        if !(sched.pressure_area.is_finite() && sched.pressure_area > 0.0) {
            return Err(VineGuardError::Config(format!(
                "scheduler.pressure_area must be positive, but is {}",
                sched.pressure_area
            )));
        }
        check_num("scheduler.min_efficacy", sched.min_efficacy, 0.0..=1.0)?;
        if !(sched.base_rate.is_finite() && sched.base_rate > 0.0) {
            return Err(VineGuardError::Config(format!(
                "scheduler.base_rate must be positive, but is {}",
                sched.base_rate
            )));
        }

        if !(self.vineyard.side_length.is_finite() && self.vineyard.side_length > 0.0) {
            return Err(VineGuardError::Config(format!(
                "vineyard.side_length must be positive, but is {}",
                self.vineyard.side_length
            )));
        }
        check_num(
            "vineyard.application_depth",
            self.vineyard.application_depth,
            0.0..f64::INFINITY,
        )?;

        let econ = &self.economics;
        for (label, value) in [
            ("economics.base_yield", econ.base_yield),
            ("economics.price_per_unit", econ.price_per_unit),
            ("economics.mold_growth_rate", econ.mold_growth_rate),
            ("economics.harvest_penalty_rate", econ.harvest_penalty_rate),
            (
                "economics.pesticide_cost_per_area",
                econ.pesticide_cost_per_area,
            ),
        ] {
            check_num(label, value, 0.0..f64::INFINITY)?;
        }

        if let WeatherSource::Constant {
            temperature,
            precipitation,
        } = self.inputs.weather
        {
            check_num(
                "inputs.weather.temperature",
                temperature,
                f64::NEG_INFINITY..f64::INFINITY,
            )?;
            check_num(
                "inputs.weather.precipitation",
                precipitation,
                0.0..f64::INFINITY,
            )?;
        }

        let label = &self.inputs.products.label_defaults;
        check_num(
            "inputs.products.label_defaults.max_applications_per_season",
            label.max_applications_per_season,
            1..,
        )?;
        if let Some(max) = label.seasonal_max_volume {
            if !(max.is_finite() && max > 0.0) {
                return Err(VineGuardError::Config(format!(
                    "inputs.products.label_defaults.seasonal_max_volume must be positive, but is {}",
                    max
                )));
            }
        }

        Ok(())
    }

    /// Run interactive setup prompts and write config to disk.
    /// Returns the Config and the path it was written to.
    pub fn setup_interactive(target: Option<PathBuf>) -> Result<(Self, PathBuf)> {
        println!();
        println!("Let's set up VineGuard!");
        println!();

        let mut config = Config::default();

        println!("Season");
        config.season.days = prompt("  Season length (days)", config.season.days)?;
        config.season.harvest_day = prompt("  Harvest day", config.season.harvest_day)?;
        let start: String = prompt(
            "  Start date (YYYY-MM-DD)",
            config.season.start_date.to_string(),
        )?;
        config.season.start_date = NaiveDate::parse_from_str(&start, "%Y-%m-%d")
            .map_err(|e| VineGuardError::Config(format!("Invalid start date: {}", e)))?;
        config.population.initial_eggs =
            prompt("  Initial egg count", config.population.initial_eggs)?;

        println!();

        println!("Inputs (leave weather CSV blank to use constant weather)");
        let weather_path: String = prompt("  Weather CSV", String::new())?;
        config.inputs.weather = if weather_path.is_empty() {
            WeatherSource::Constant {
                temperature: prompt("  Constant temperature (°C)", 25.0)?,
                precipitation: prompt("  Constant precipitation (mm)", 5.0)?,
            }
        } else {
            WeatherSource::Csv {
                path: PathBuf::from(weather_path),
            }
        };
        let products_path: String = prompt(
            "  Product table",
            config.inputs.products.path.display().to_string(),
        )?;
        config.inputs.products.path = PathBuf::from(products_path);
        let label_sheet: String = prompt("  Is it a label sheet? (y/n)", "n".to_string())?;
        if label_sheet.trim().eq_ignore_ascii_case("y") {
            config.inputs.products.format = ProductTableFormat::Label;
        }

        println!();

        println!("Vineyard & economics");
        config.vineyard.side_length = prompt("  Side length", config.vineyard.side_length)?;
        config.vineyard.application_depth =
            prompt("  Application depth", config.vineyard.application_depth)?;
        config.economics.base_yield = prompt("  Base yield", config.economics.base_yield)?;
        config.economics.price_per_unit =
            prompt("  Price per unit yield", config.economics.price_per_unit)?;
        config.economics.pesticide_cost_per_area = prompt(
            "  Pesticide cost per area",
            config.economics.pesticide_cost_per_area,
        )?;

        println!();

        config.validate()?;

        let config_path = match target {
            Some(p) => p,
            None => Self::default_config_path()?,
        };
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(&config)
            .map_err(|e| VineGuardError::Config(format!("Failed to serialize config: {}", e)))?;

        let content = format!(
            "# VineGuard Configuration\n# Generated by `vineguard init`\n# Environment variable substitution (${{VAR}}) is supported.\n\n{}",
            yaml
        );
        std::fs::write(&config_path, content)?;

        println!("Configuration saved to {}", config_path.display());
        println!();

        Ok((config, config_path))
    }

    fn substitute_env_vars(content: &str) -> Result<String> {
        let mut result = content.to_string();

        let re = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
            .map_err(|e| VineGuardError::Config(format!("Invalid substitution pattern: {}", e)))?;

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];
            if let Ok(value) = std::env::var(var_name) {
                result = result.replace(placeholder, &value);
            }
        }

        Ok(result)
    }
}

fn prompt<T>(label: &str, default: T) -> Result<T>
where
    T: Clone + ToString + FromStr,
    <T as FromStr>::Err: ToString,
{
    Input::new()
        .with_prompt(label)
        .default(default)
        .allow_empty(true)
        .interact_text()
        .map_err(|e| VineGuardError::Config(format!("Input error: {}", e)))
}

fn check_num<T, R>(label: &str, num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        return Err(VineGuardError::Config(format!(
            "{} must be in the range {:?}, but is {:?}",
            label, range, num
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.season.days, 183);
        assert_eq!(config.population.transition_start_day, 60);
        assert_eq!(config.population.late_start_day, 120);
        assert_eq!(config.scheduler.summer_end_day, 92);
        assert_eq!(config.scheduler.strategy, SelectionKind::TableOrder);
        assert_eq!(config.scheduler.cap_policy, CapPolicy::PostCommit);
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let yaml = r#"
season:
  harvest_day: 150
scheduler:
  strategy: shortest_phi
  cap_policy: pre_commit
inputs:
  weather:
    source: csv
    path: weather.csv
  products:
    path: labels.csv
    format: label
"#;
        let config = Config::from_yaml_str(yaml).unwrap();
        assert_eq!(config.season.harvest_day, 150);
        assert_eq!(config.season.days, 183);
        assert_eq!(config.scheduler.strategy, SelectionKind::ShortestPhi);
        assert_eq!(config.scheduler.cap_policy, CapPolicy::PreCommit);
        assert_eq!(config.scheduler.immature_threshold, 0.9);
        assert!(matches!(config.inputs.weather, WeatherSource::Csv { .. }));
        assert_eq!(config.inputs.products.format, ProductTableFormat::Label);
        assert_eq!(
            config.inputs.products.label_defaults.max_applications_per_season,
            2
        );
    }

    #[test]
    fn constant_weather_parses() {
        let yaml = r#"
inputs:
  weather:
    source: constant
    temperature: 18.5
    precipitation: 2.0
"#;
        let config = Config::from_yaml_str(yaml).unwrap();
        match config.inputs.weather {
            WeatherSource::Constant {
                temperature,
                precipitation,
            } => {
                assert_eq!(temperature, 18.5);
                assert_eq!(precipitation, 2.0);
            }
            other => panic!("unexpected weather source {:?}", other),
        }
    }

    #[test]
    fn out_of_range_values_rejected() {
        let cases = [
            "season:\n  days: 0\n",
            "scheduler:\n  min_efficacy: 1.5\n",
            "scheduler:\n  pressure_area: 0.0\n",
            "population:\n  transition_start_day: 130\n  late_start_day: 120\n",
            "economics:\n  price_per_unit: -1.0\n",
            "vineyard:\n  side_length: 0.0\n",
        ];
        for yaml in cases {
            let result = Config::from_yaml_str(yaml);
            assert!(
                matches!(result, Err(VineGuardError::Config(_))),
                "expected rejection for {:?}",
                yaml
            );
        }
    }

    #[test]
    fn env_vars_substituted() {
        std::env::set_var("VINEGUARD_TEST_HARVEST_DAY", "140");
        let config = Config::from_yaml_str("season:\n  harvest_day: ${VINEGUARD_TEST_HARVEST_DAY}\n")
            .unwrap();
        assert_eq!(config.season.harvest_day, 140);
    }

    #[test]
    fn relative_paths_resolved_against_config_dir() {
        let mut config = Config::from_yaml_str(
            "inputs:\n  weather:\n    source: csv\n    path: weather.csv\n  products:\n    path: /abs/products.csv\n",
        )
        .unwrap();
        config.resolve_paths(Path::new("/srv/vineyard"));

        match &config.inputs.weather {
            WeatherSource::Csv { path } => {
                assert_eq!(path, &PathBuf::from("/srv/vineyard/weather.csv"))
            }
            other => panic!("unexpected weather source {:?}", other),
        }
        assert_eq!(
            config.inputs.products.path,
            PathBuf::from("/abs/products.csv")
        );
    }

    #[test]
    fn day_to_calendar_date() {
        let season = SeasonConfig::default();
        assert_eq!(season.date_of(1), season.start_date);
        assert_eq!(
            season.date_of(31),
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
        );
    }
}
