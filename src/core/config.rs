use anyhow::{anyhow, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::filing::MAX_SECTION_CHARS;

/// Retry budget for a section stuck in "processing".
pub const DEFAULT_MAX_EXTRACT_ATTEMPTS: u32 = 3;

/// Delay between extraction retries.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Minimum spacing between outbound SEC API calls.
pub const DEFAULT_CALL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Clone, Debug)]
pub struct HarvestConfig {
    pub api_key: String,
    pub data_dir: PathBuf,
    pub max_section_chars: usize,
    pub max_extract_attempts: u32,
    pub retry_delay: Duration,
    pub call_interval: Duration,
}

impl HarvestConfig {
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("SEC_API_KEY").map_err(|_| {
            anyhow!(
                "SEC_API_KEY environment variable not set. \
                 Get your API key from https://sec-api.io/ and set it in your .env file"
            )
        })?;

        let data_dir = PathBuf::from(
            std::env::var("HARVEST_DATA_DIR").unwrap_or_else(|_| "data".to_string()),
        );

        Ok(Self::with_key(api_key).data_dir(data_dir))
    }

    /// Config with reference defaults for everything but the credential.
    pub fn with_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            data_dir: PathBuf::from("data"),
            max_section_chars: MAX_SECTION_CHARS,
            max_extract_attempts: DEFAULT_MAX_EXTRACT_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
            call_interval: DEFAULT_CALL_INTERVAL,
        }
    }

    pub fn data_dir(mut self, dir: PathBuf) -> Self {
        self.data_dir = dir;
        self
    }
}
