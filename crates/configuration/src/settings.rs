use crate::error::ConfigError;
use chrono::NaiveDate;
use core_types::{CoreError, ProgramWindow};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub program: ProgramSettings,
    pub report: ReportConfig,
    pub logging: Logging,
}

/// The incentive program being evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramSettings {
    /// First day of the program (midnight UTC, inclusive).
    pub start_date: NaiveDate,
    /// Last boundary of the program (midnight UTC, inclusive).
    pub end_date: NaiveDate,
}

/// Cutoffs for the report tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Number of source chains in the top-chains table.
    pub top_chains: usize,
    /// Number of tokens in the top-tokens table.
    pub top_tokens: usize,
    /// Bucket count of the holding-period distribution.
    pub holding_period_bins: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    /// Default filter directive when `RUST_LOG` is unset (e.g. "info", "analytics=debug").
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
}

/// How the CLI prints a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl ProgramSettings {
    pub fn window(&self) -> Result<ProgramWindow, CoreError> {
        ProgramWindow::from_dates(self.start_date, self.end_date)
    }
}

impl Config {
    /// Rejects settings the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.program.start_date > self.program.end_date {
            return Err(ConfigError::ValidationError(format!(
                "program.start_date ({}) is after program.end_date ({})",
                self.program.start_date, self.program.end_date
            )));
        }
        if self.report.top_chains == 0 || self.report.top_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "report.top_chains and report.top_tokens must be at least 1".to_string(),
            ));
        }
        if self.report.holding_period_bins == 0 {
            return Err(ConfigError::ValidationError(
                "report.holding_period_bins must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The contents written by `init-config`.
    pub fn default_toml() -> String {
        r#"# Bridge program report configuration.
# Every value can be overridden with BRIDGE__<SECTION>__<KEY>, e.g. BRIDGE__REPORT__TOP_TOKENS=10.

[program]
# Both boundaries are midnight UTC and belong to the program window.
start_date = "2024-06-24"
end_date = "2024-07-14"

[report]
top_chains = 3
top_tokens = 5
holding_period_bins = 30

[logging]
level = "info"
# directory = "logs"
"#
        .to_string()
    }
}

// --- Default Implementations ---
// These allow a user to omit any section from their toml and still have it work.

impl Default for Config {
    fn default() -> Self {
        Self {
            program: ProgramSettings::default(),
            report: ReportConfig::default(),
            logging: Logging::default(),
        }
    }
}

impl Default for ProgramSettings {
    fn default() -> Self {
        Self {
            start_date: NaiveDate::from_ymd_opt(2024, 6, 24).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2024, 7, 14).unwrap_or_default(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_chains: 3,
            top_tokens: 5,
            holding_period_bins: 30,
        }
    }
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}
