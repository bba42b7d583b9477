use crate::status::CashFlowStatus;

#[derive(thiserror::Error, Debug)]
pub enum ProgressError {
    #[error("Cash flow {id} not found")]
    NotFound { id: String },
    #[error("Cash flow {id} was modified concurrently: expected version {expected}, found {actual}")]
    VersionConflict {
        id: String,
        expected: u64,
        actual: u64,
    },
    #[error("Cash flow {id} is at the last representable version")]
    VersionExhausted { id: String },
    #[error("Cash flow {id} already exists")]
    AlreadyExists { id: String },
    #[error("Unknown cash flow status code '{0}'")]
    UnknownStatus(String),
    #[error("Progress percentage {0} is outside 0..=100")]
    InvalidPercentage(u8),
    #[error("Stored record could not be encoded or decoded: {0}")]
    Encoding(String),
    #[error("Store failure: {0}")]
    Storage(#[from] sled::Error),
}

impl From<minicbor::decode::Error> for ProgressError {
    fn from(value: minicbor::decode::Error) -> Self {
        ProgressError::Encoding(value.to_string())
    }
}

impl From<minicbor::encode::Error<std::convert::Infallible>> for ProgressError {
    fn from(value: minicbor::encode::Error<std::convert::Infallible>) -> Self {
        ProgressError::Encoding(value.to_string())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum GuideTableError {
    #[error("Guide table is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Guide table names an unknown status '{0}'")]
    UnknownStatus(String),
    #[error("Guide table has no entry for {0}, which needs operator guidance")]
    MissingEntry(CashFlowStatus),
    #[error("Guide entry for {0} offers no action, but the status needs an operator")]
    MissingAction(CashFlowStatus),
    #[error("Link entry for {0} has no url")]
    LinkWithoutUrl(CashFlowStatus),
    #[error("Failed to read guide table: {0}")]
    Io(#[from] std::io::Error),
}
