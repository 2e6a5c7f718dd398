use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum SeriesError {
    /// No populated entry at `index`. Negative indices come from coordinates
    /// that fall before `base`.
    OutOfRange { index: i64, len: usize },
    InvalidArgument(String),
    TooFewPoints { got: usize, min: usize },
    InvalidData(String),
}

impl fmt::Display for SeriesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesError::OutOfRange { index, len } => {
                write!(f, "index {index} out of range for series of length {len}")
            }
            SeriesError::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            SeriesError::TooFewPoints { got, min } => {
                write!(f, "too few points: got {got}, need at least {min}")
            }
            SeriesError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
        }
    }
}

impl std::error::Error for SeriesError {}

impl From<serde_json::Error> for SeriesError {
    fn from(e: serde_json::Error) -> Self {
        SeriesError::InvalidData(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SeriesError>;
