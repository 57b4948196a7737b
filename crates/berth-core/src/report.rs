//! Report writers: console, JSON, YAML and CSV output.

use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};
use crate::result::{CheckResult, CheckStatus};

/// A finished audit report: an ordered result sequence plus an output path.
#[derive(Debug, Clone, Default)]
pub struct Report {
    /// Destination file for the serialized formats.
    pub filename: PathBuf,
    /// Results in checklist order.
    pub results: Vec<CheckResult>,
}

impl Report {
    /// Create a report writing to `filename` (resolved against the current
    /// directory when relative).
    pub fn new(filename: impl AsRef<Path>) -> Self {
        let path = filename.as_ref();
        let filename = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|d| d.join(path))
                .unwrap_or_else(|_| path.to_path_buf())
        };
        Self {
            filename,
            results: Vec::new(),
        }
    }

    /// Serialize the results to pretty-printed JSON text.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.results)?)
    }

    /// Write the results to the report file as JSON.
    pub fn write_json(&self) -> Result<()> {
        std::fs::write(&self.filename, self.to_json()?)?;
        Ok(())
    }

    /// Write the results to the report file as YAML.
    pub fn write_yaml(&self) -> Result<()> {
        let out = serde_yaml::to_string(&self.results)
            .map_err(|e| CoreError::Report(e.to_string()))?;
        std::fs::write(&self.filename, out)?;
        Ok(())
    }

    /// Write the results to the report file as CSV.
    pub fn write_csv(&self) -> Result<()> {
        let mut wtr = csv::Writer::from_path(&self.filename)
            .map_err(|e| CoreError::Report(e.to_string()))?;
        for res in &self.results {
            wtr.serialize(res)
                .map_err(|e| CoreError::Report(e.to_string()))?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Print a single result to the console with a colored status tag.
pub fn console_print(res: &CheckResult) {
    let status = match res.status {
        CheckStatus::Pass => "[PASS]".green(),
        CheckStatus::Warn => "[WARN]".red(),
        CheckStatus::Skip => "[SKIP]".yellow(),
        CheckStatus::Info => "[INFO]".cyan(),
    };

    println!("{status} - {}", res.name.bold());
    if !res.output.is_empty() {
        println!("\t {}\n", res.output);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_results() -> Vec<CheckResult> {
        vec![
            CheckResult::pass("1.1 Create a separate partition for containers"),
            CheckResult::fail("2.5 Do not use the aufs storage driver", "aufs in use"),
        ]
    }

    #[test]
    fn test_json_round_trip() {
        let mut report = Report::new("unused.json");
        report.results = sample_results();

        let json = report.to_json().unwrap();
        let parsed: Vec<CheckResult> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report.results);
    }

    #[test]
    fn test_write_json_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let mut report = Report::new(&path);
        report.results = sample_results();

        report.write_json().unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"Status\": \"WARN\""));
    }

    #[test]
    fn test_write_csv_has_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        let mut report = Report::new(&path);
        report.results = sample_results();

        report.write_csv().unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next().unwrap(), "Name,Status,Output");
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn test_relative_filename_resolved() {
        let report = Report::new("out.json");
        assert!(report.filename.is_absolute());
    }
}
