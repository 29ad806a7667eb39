pub mod company;
pub mod core;
pub mod error;
pub mod extractor;
pub mod filing;
pub mod locator;
pub mod orchestrator;
pub mod secapi;
pub mod storage;
pub mod utils;

// Re-exports
pub use crate::core::config::HarvestConfig;
pub use crate::error::HarvestError;
pub use crate::filing::{DownloadSummary, FilingRecord, FilingStatus};
pub use crate::orchestrator::DownloadOrchestrator;
