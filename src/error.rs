use thiserror::Error;

/// Error taxonomy for a harvest run. Only `Authentication` is fatal to a
/// batch; everything else is recorded per target and the batch continues.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("SEC API authentication failed")]
    Authentication,

    #[error("no filing found for {ticker} {year}")]
    NotFound { ticker: String, year: i32 },

    #[error("section {section} still processing after {attempts} attempts")]
    ProcessingTimeout { section: String, attempts: u32 },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl HarvestError {
    /// Short reason string used in the download summary's failure list.
    pub fn summary_reason(&self) -> String {
        match self {
            HarvestError::NotFound { .. } => "no filing found".to_string(),
            other => other.to_string(),
        }
    }
}
