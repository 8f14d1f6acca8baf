use thiserror::Error;

#[derive(Error, Debug)]
pub enum StabForgeError {
    #[error("Invalid Parameter '{field}': expected {expected}, found {found}")]
    InvalidParameter {
        field: String,
        expected: String,
        found: String,
    },

    #[error("No Feasible Code: sampler gave up on [[{n},{k}]] after {attempts} attempts")]
    NoFeasibleCode { n: usize, k: usize, attempts: usize },

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),
}

impl StabForgeError {
    pub fn invalid(
        field: impl Into<String>,
        expected: impl Into<String>,
        found: impl ToString,
    ) -> Self {
        Self::InvalidParameter {
            field: field.into(),
            expected: expected.into(),
            found: found.to_string(),
        }
    }

    /// Name of the offending input field, if this is a validation failure.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidParameter { field, .. } => Some(field),
            _ => None,
        }
    }
}

pub type SfResult<T> = Result<T, StabForgeError>;
