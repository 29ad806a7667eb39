use indicatif::ProgressBar;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use strum::IntoEnumIterator;

use crate::company::Company;
use crate::core::config::HarvestConfig;
use crate::error::HarvestError;
use crate::extractor::SectionExtractor;
use crate::filing::{
    DownloadSummary, FilingLocation, FilingRecord, FilingStatus, FilingTarget, SectionName,
};
use crate::locator::FilingLocator;
use crate::secapi::FilingApi;
use crate::storage::FilingStore;

/// Drives the full (company x year) target matrix through locate ->
/// extract -> persist, aggregating per-target outcomes. A failure on one
/// target never prevents processing of the next; only the upfront access
/// check is fatal.
pub struct DownloadOrchestrator {
    api: Arc<dyn FilingApi>,
    locator: FilingLocator,
    extractor: SectionExtractor,
    store: Arc<dyn FilingStore>,
    sections: Vec<SectionName>,
    running: Arc<AtomicBool>,
    progress: Option<ProgressBar>,
}

impl DownloadOrchestrator {
    pub fn new(
        api: Arc<dyn FilingApi>,
        store: Arc<dyn FilingStore>,
        config: &HarvestConfig,
    ) -> Self {
        DownloadOrchestrator {
            api: api.clone(),
            locator: FilingLocator::new(api.clone()),
            extractor: SectionExtractor::new(api, config),
            store,
            sections: SectionName::iter().collect(),
            running: Arc::new(AtomicBool::new(true)),
            progress: None,
        }
    }

    /// Share a cancellation flag; clearing it stops new targets from
    /// starting while the in-flight target finishes its current attempt.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.running = flag;
        self
    }

    pub fn with_progress(mut self, bar: ProgressBar) -> Self {
        self.progress = Some(bar);
        self
    }

    /// Read accessor for the location cache, for callers that want to
    /// inspect or reuse resolutions after a run.
    pub fn location_cache(&self) -> &HashMap<FilingTarget, FilingLocation> {
        self.locator.cache()
    }

    /// Process every target independently and aggregate the outcomes.
    /// Fails only if the credential does not verify, in which case zero
    /// targets are processed.
    pub async fn run(&mut self, targets: &[FilingTarget]) -> Result<DownloadSummary, HarvestError> {
        if !self.api.verify_access().await {
            return Err(HarvestError::Authentication);
        }

        log::info!(
            "Starting filing download: {} targets",
            targets.len()
        );

        let mut summary = DownloadSummary::new(targets.len());
        for target in targets {
            if !self.running.load(Ordering::SeqCst) {
                log::warn!("Cancellation requested; not starting further targets");
                break;
            }

            if let Some(pb) = &self.progress {
                pb.set_message(target.to_string());
            }

            log::info!("Processing {}...", target);
            match self.process_target(target).await {
                Ok(record) => summary.record_success(record),
                Err(reason) => {
                    log::warn!("Failed to process {}: {}", target, reason);
                    summary.record_failure(target, reason);
                }
            }

            if let Some(pb) = &self.progress {
                pb.inc(1);
            }
        }

        if let Some(pb) = &self.progress {
            pb.finish_and_clear();
        }
        Ok(summary)
    }

    /// Ad-hoc single-filing retrieval outside a full batch. The record
    /// is returned even when partial; its status says how trustworthy it
    /// is.
    pub async fn run_single(
        &mut self,
        company: &Company,
        year: i32,
    ) -> Result<FilingRecord, HarvestError> {
        let target = FilingTarget::new(company, year);
        let location = self.locator.locate(&target).await?;
        let record = self.extractor.extract(&location, &self.sections).await;
        if record.status != FilingStatus::Failed {
            if let Err(e) = self.store.save(&record).await {
                log::error!("Failed to persist {}: {}", target, e);
            }
        }
        Ok(record)
    }

    async fn process_target(&mut self, target: &FilingTarget) -> Result<FilingRecord, String> {
        let location = self
            .locator
            .locate(target)
            .await
            .map_err(|e| e.summary_reason())?;

        let record = self.extractor.extract(&location, &self.sections).await;
        if record.status == FilingStatus::Failed {
            return Err("no sections extracted".to_string());
        }

        self.store
            .save(&record)
            .await
            .map_err(|e| format!("storage error: {}", e))?;

        Ok(record)
    }
}
