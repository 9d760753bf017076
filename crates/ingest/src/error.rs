use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Schema error: required column(s) missing: {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("Malformed timestamp on line {line}: '{value}'")]
    MalformedTimestamp { line: u64, value: String },

    #[error("Malformed value in column '{column}' on line {line}: '{value}'")]
    MalformedField {
        line: u64,
        column: String,
        value: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
