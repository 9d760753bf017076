use core_types::Phase;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsError {
    #[error("No events in the {0} phase; its weekly rate is undefined")]
    EmptyPhase(Phase),

    #[error("Not enough data to perform calculation: {0} has no events")]
    EmptyPartition(String),

    #[error("Calculation error: Division by zero encountered in metric '{0}'")]
    DivisionByZero(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl AnalyticsError {
    /// Data-shape problems that cost a single metric, not the whole report.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AnalyticsError::EmptyPhase(_)
                | AnalyticsError::EmptyPartition(_)
                | AnalyticsError::DivisionByZero(_)
        )
    }
}
