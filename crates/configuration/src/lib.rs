use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use error::ConfigError;
pub use settings::{Config, Logging, OutputFormat, ProgramSettings, ReportConfig};

/// Prefix of environment variables that override file settings.
pub const ENV_PREFIX: &str = "BRIDGE";

/// Loads the application configuration.
///
/// Values come from, in increasing priority: built-in defaults, the TOML file at
/// `path` (skipped if it does not exist), and `BRIDGE__<SECTION>__<KEY>`
/// environment variables. The result is validated before it is returned.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(?config, "Configuration loaded.");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();

        let config = load_config(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_overrides_only_given_keys() {
        let file = write_config(
            "[program]\nstart_date = \"2024-01-01\"\nend_date = \"2024-02-01\"\n\n[report]\ntop_tokens = 10\n",
        );

        let config = load_config(file.path()).unwrap();

        assert_eq!(config.program.start_date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(config.report.top_tokens, 10);
        assert_eq!(config.report.top_chains, 3);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_inverted_program_dates_fail_validation() {
        let file = write_config("[program]\nstart_date = \"2024-07-14\"\nend_date = \"2024-06-24\"\n");

        let err = load_config(file.path()).unwrap_err();

        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_zero_cutoffs_fail_validation() {
        let mut config = Config::default();
        config.report.top_chains = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.report.holding_period_bins = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_toml_round_trips_to_defaults() {
        let file = write_config(&Config::default_toml());

        let config = load_config(file.path()).unwrap();

        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_program_window_starts_at_midnight() {
        let window = Config::default().program.window().unwrap();
        assert_eq!(window.start().to_rfc3339(), "2024-06-24T00:00:00+00:00");
        assert_eq!(window.end().to_rfc3339(), "2024-07-14T00:00:00+00:00");
    }
}
