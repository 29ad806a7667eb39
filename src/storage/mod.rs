use anyhow::Result;
use async_trait::async_trait;

use crate::company::Ticker;
use crate::filing::FilingRecord;

/// Durable storage for harvested filings, keyed by (ticker, year).
/// Single-filing read/write granularity; no partial-section updates.
#[async_trait]
pub trait FilingStore: Send + Sync {
    async fn save(&self, record: &FilingRecord) -> Result<()>;

    async fn load(&self, ticker: &Ticker, year: i32) -> Result<Option<FilingRecord>>;
}

pub mod json;
pub mod memory;

pub use self::json::JsonFileStore;
pub use self::memory::InMemoryStore;
