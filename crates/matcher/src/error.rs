use thiserror::Error;

/// Systemic failures that abort a run.
///
/// Per-record problems never surface here; they become
/// [`Diagnostic`](crate::model::Diagnostic) entries on the result.
#[derive(Debug, Error)]
pub enum MatchError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (no suppliers, duplicate source tag, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    /// A configured supplier source has no table in the input.
    #[error("supplier '{0}': no input table provided")]
    UnknownSource(String),
    /// Missing required column in an input table.
    #[error("table '{table}': missing column '{column}'")]
    MissingColumn { table: String, column: String },
    /// An input dataset has no data rows at all.
    #[error("table '{0}': no data rows")]
    EmptyDataset(String),
    /// Repeated buyer id under the `error` duplicate policy.
    #[error("duplicate buyer id '{buyer_id}' (rows {first_row} and {row})")]
    DuplicateBuyer {
        buyer_id: String,
        first_row: usize,
        row: usize,
    },
    /// Unreadable tabular input.
    #[error("IO error: {0}")]
    Io(String),
}
