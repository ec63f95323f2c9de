use crate::config::{LabelDefaults, ProductSource, ProductTableFormat};
use crate::error::{Result, VineGuardError};
use crate::models::{EfficacyRating, ProductRecord, ProductTable};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

/// PHI entries on label sheets that mean "no waiting period".
const ZERO_PHI_PHRASES: &[&str] = &["until spray has dried", "up to day of harvest"];

/// One row of an extension-service label sheet. Other columns are ignored.
#[derive(Debug, Deserialize)]
struct LabelRow {
    #[serde(rename = "Product")]
    product: String,
    #[serde(rename = "IRAC Group")]
    irac_group: String,
    #[serde(rename = "Rate/A")]
    rate_per_acre: f64,
    #[serde(rename = "REI (hours)")]
    rei_hours: f64,
    #[serde(rename = "PHI (days)")]
    phi: String,
    #[serde(rename = "Effect on Adults")]
    effect_on_adults: String,
    #[serde(rename = "Effect on Nymphs")]
    effect_on_nymphs: String,
}

impl LabelRow {
    fn into_record(self, defaults: &LabelDefaults) -> Result<ProductRecord> {
        let malformed = |msg: String| {
            VineGuardError::MalformedInput(format!("label '{}': {}", self.product, msg))
        };

        let class = self
            .irac_group
            .split(',')
            .map(str::trim)
            .find(|g| !g.is_empty())
            .ok_or_else(|| malformed("missing IRAC group".into()))?
            .to_string();

        let rating = |text: &str| {
            EfficacyRating::from_str(text)
                .map(|r| r.score())
                .ok_or_else(|| malformed(format!("unrecognised efficacy rating '{}'", text)))
        };
        let efficacy_on_immature = rating(&self.effect_on_nymphs)?;
        let efficacy_on_mature = rating(&self.effect_on_adults)?;

        let pre_harvest_interval = parse_phi(&self.phi)
            .ok_or_else(|| malformed(format!("unrecognised PHI '{}'", self.phi)))?;

        if !(self.rei_hours.is_finite() && self.rei_hours >= 0.0) {
            return Err(malformed(format!("invalid REI {}", self.rei_hours)));
        }
        let re_entry_interval = (self.rei_hours / 24.0).ceil() as u32;

        let max_applications_per_season = defaults.max_applications_per_season;
        let seasonal_max_volume = defaults
            .seasonal_max_volume
            .unwrap_or(self.rate_per_acre * f64::from(max_applications_per_season));

        Ok(ProductRecord {
            id: self.product.trim().to_string(),
            class,
            efficacy_on_immature,
            efficacy_on_mature,
            pre_harvest_interval,
            re_entry_interval,
            seasonal_max_volume,
            max_applications_per_season,
        })
    }
}

fn parse_phi(text: &str) -> Option<u32> {
    let text = text.trim();
    if let Ok(days) = text.parse::<u32>() {
        return Some(days);
    }
    if let Ok(days) = text.parse::<f64>() {
        if days >= 0.0 && days.fract() == 0.0 {
            return Some(days as u32);
        }
        return None;
    }
    let lower = text.to_lowercase();
    ZERO_PHI_PHRASES
        .iter()
        .any(|phrase| lower == *phrase)
        .then_some(0)
}

/// Native table: CSV with `ProductRecord` column names.
pub fn parse_native_csv<R: Read>(reader: R) -> Result<ProductTable> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut products = Vec::new();
    for (line, result) in reader.deserialize::<ProductRecord>().enumerate() {
        let product = result.map_err(|e| {
            VineGuardError::MalformedInput(format!("product row {}: {}", line + 1, e))
        })?;
        products.push(product);
    }

    ProductTable::new(products)
}

/// Native table: YAML list of `ProductRecord`s.
pub fn parse_native_yaml(content: &str) -> Result<ProductTable> {
    let products: Vec<ProductRecord> = serde_yaml::from_str(content)
        .map_err(|e| VineGuardError::MalformedInput(format!("product table: {}", e)))?;
    ProductTable::new(products)
}

/// Label sheet in the extension-service column layout.
pub fn parse_label_csv<R: Read>(reader: R, defaults: &LabelDefaults) -> Result<ProductTable> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut products = Vec::new();
    for (line, result) in reader.deserialize::<LabelRow>().enumerate() {
        let row = result.map_err(|e| {
            VineGuardError::MalformedInput(format!("label row {}: {}", line + 1, e))
        })?;
        products.push(row.into_record(defaults)?);
    }

    ProductTable::new(products)
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Load the product reference table from the configured source.
pub fn load_products(source: &ProductSource) -> Result<ProductTable> {
    let path = &source.path;
    let open = || {
        std::fs::File::open(path).map_err(|e| {
            VineGuardError::MalformedInput(format!(
                "cannot open product table {}: {}",
                path.display(),
                e
            ))
        })
    };

    let table = match source.format {
        ProductTableFormat::Label => parse_label_csv(open()?, &source.label_defaults)?,
        ProductTableFormat::Native if is_yaml(path) => {
            let mut content = String::new();
            open()?.read_to_string(&mut content)?;
            parse_native_yaml(&content)?
        }
        ProductTableFormat::Native => parse_native_csv(open()?)?,
    };

    tracing::info!(
        "Loaded {} product(s) from {}",
        table.len(),
        path.display()
    );
    Ok(table)
}
