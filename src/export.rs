use crate::error::Result;
use crate::logic::RunSummary;
use crate::models::ScheduleRow;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleFormat {
    Csv,
    Json,
}

impl ScheduleFormat {
    /// `.json` selects JSON; anything else is written as CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ScheduleFormat::Json,
            _ => ScheduleFormat::Csv,
        }
    }
}

pub fn write_schedule_csv<W: Write>(writer: W, rows: &[ScheduleRow]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_schedule_json<W: Write>(writer: W, rows: &[ScheduleRow]) -> Result<()> {
    serde_json::to_writer_pretty(writer, rows)?;
    Ok(())
}

pub fn write_schedule(path: &Path, rows: &[ScheduleRow]) -> Result<()> {
    let file = std::fs::File::create(path)?;
    match ScheduleFormat::from_path(path) {
        ScheduleFormat::Csv => write_schedule_csv(file, rows)?,
        ScheduleFormat::Json => write_schedule_json(file, rows)?,
    }
    tracing::info!("Wrote {} schedule row(s) to {}", rows.len(), path.display());
    Ok(())
}

pub fn write_summary(path: &Path, summary: &RunSummary) -> Result<()> {
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, summary)?;
    tracing::info!("Wrote run summary to {}", path.display());
    Ok(())
}
