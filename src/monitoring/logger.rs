use anyhow::{Context, Result};
use chrono::Utc;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use crate::batch::runner::{BatchReport, FailedBlock};
use crate::signals::types::{join_levels, Signal};

const HEADER: &str = "timestamp,source,status,symbol,direction,entry,targets,stop,reason";

/// Appends parse outcomes to a CSV audit file.
pub struct CsvLogger {
    log_path: PathBuf,
}

impl CsvLogger {
    pub fn new(log_path: impl Into<PathBuf>) -> Result<Self> {
        let log_path = log_path.into();

        // Create CSV file with headers if it doesn't exist
        if !log_path.exists() {
            let mut file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&log_path)
                .with_context(|| format!("Failed to create CSV log: {}", log_path.display()))?;

            writeln!(file, "{}", HEADER)?;
        }

        Ok(Self { log_path })
    }

    /// Log an accepted signal
    pub fn log_signal(&self, signal: &Signal, source: &str) -> Result<()> {
        let mut file = self.open()?;

        writeln!(
            file,
            "{},{},accepted,{},{},{},{},{},",
            Utc::now().to_rfc3339(),
            escape(source),
            escape(&signal.symbol),
            signal.direction,
            escape(&signal.entry.to_string()),
            escape(&join_levels(&signal.targets)),
            escape(&join_levels(&signal.stop)),
        )?;

        Ok(())
    }

    /// Log a failed block; the reason column carries why it failed.
    pub fn log_failure(&self, failed: &FailedBlock, source: &str) -> Result<()> {
        let mut file = self.open()?;

        writeln!(
            file,
            "{},{},failed,,,,,,{}",
            Utc::now().to_rfc3339(),
            escape(source),
            escape(&failed.kind.to_string()),
        )?;

        Ok(())
    }

    pub fn log_report(&self, report: &BatchReport, source: &str) -> Result<()> {
        for signal in &report.signals {
            self.log_signal(signal, source)?;
        }
        for failed in &report.failed {
            self.log_failure(failed, source)?;
        }
        Ok(())
    }

    fn open(&self) -> Result<std::fs::File> {
        OpenOptions::new()
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("Failed to open CSV log: {}", self.log_path.display()))
    }
}

/// Quote a CSV field when it contains a separator, quote or newline.
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
