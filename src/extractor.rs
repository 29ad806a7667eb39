use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::core::config::HarvestConfig;
use crate::error::HarvestError;
use crate::filing::{FilingLocation, FilingRecord, Section, SectionName, MIN_SECTION_CHARS};
use crate::secapi::{FilingApi, SectionOutcome};

/// Pulls the requested sections out of a located filing, retrying
/// sections the service is still preparing. A filing with some but not
/// all sections is still useful, so per-section failures never abort the
/// filing.
pub struct SectionExtractor {
    api: Arc<dyn FilingApi>,
    max_attempts: u32,
    retry_delay: Duration,
    max_section_chars: usize,
}

impl SectionExtractor {
    pub fn new(api: Arc<dyn FilingApi>, config: &HarvestConfig) -> Self {
        SectionExtractor {
            api,
            max_attempts: config.max_extract_attempts,
            retry_delay: config.retry_delay,
            max_section_chars: config.max_section_chars,
        }
    }

    pub async fn extract(
        &self,
        location: &FilingLocation,
        section_names: &[SectionName],
    ) -> FilingRecord {
        let mut sections = BTreeMap::new();

        for name in section_names {
            log::info!(
                "  Extracting {} (Item {})...",
                name.description(),
                name.item_code()
            );
            match self.extract_one(location, *name).await {
                Ok(section) => {
                    log::info!("    Extracted {} characters", section.full_length);
                    if section.truncated {
                        log::info!("    Truncated to {} characters", self.max_section_chars);
                    }
                    sections.insert(*name, section);
                }
                Err(e) => {
                    log::warn!("    Failed to extract {}: {}", name.description(), e);
                }
            }
        }

        let record = FilingRecord::new(location.clone(), sections, section_names.len());
        log::info!(
            "  Extracted {}/{} sections for {} ({})",
            record.sections.len(),
            section_names.len(),
            record.target,
            record.status
        );
        record
    }

    /// Bounded retry loop for one section. "Processing" responses and
    /// transport errors each consume an attempt; an empty response is
    /// terminal.
    async fn extract_one(
        &self,
        location: &FilingLocation,
        name: SectionName,
    ) -> Result<Section, HarvestError> {
        for attempt in 1..=self.max_attempts {
            match self
                .api
                .fetch_section(&location.filing_url, name.item_code())
                .await
            {
                Ok(SectionOutcome::Text(text)) => {
                    if text.trim().chars().count() < MIN_SECTION_CHARS {
                        return Err(HarvestError::UnexpectedResponse(format!(
                            "content below minimum length for item {}",
                            name.item_code()
                        )));
                    }
                    return Ok(Section::new(name, text, self.max_section_chars));
                }
                Ok(SectionOutcome::Processing) => {
                    if attempt == self.max_attempts {
                        return Err(HarvestError::ProcessingTimeout {
                            section: name.item_code().to_string(),
                            attempts: self.max_attempts,
                        });
                    }
                    log::info!("Processing... retrying (attempt {})", attempt);
                }
                Ok(SectionOutcome::Empty) => {
                    return Err(HarvestError::UnexpectedResponse(format!(
                        "empty response for item {}",
                        name.item_code()
                    )));
                }
                Err(e) => {
                    log::error!("Request error extracting item {}: {}", name.item_code(), e);
                    if attempt == self.max_attempts {
                        return Err(e);
                    }
                }
            }
            tokio::time::sleep(self.retry_delay).await;
        }
        Err(HarvestError::ProcessingTimeout {
            section: name.item_code().to_string(),
            attempts: self.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::company::Company;
    use crate::filing::{FilingTarget, FormType};
    use crate::secapi::FilingCandidate;
    use async_trait::async_trait;
    use chrono::Utc;
    use url::Url;

    struct StuckApi;

    #[async_trait]
    impl FilingApi for StuckApi {
        async fn search_filings(
            &self,
            _cik: &str,
            _form: FormType,
            _year: i32,
        ) -> Result<Vec<FilingCandidate>, HarvestError> {
            Ok(Vec::new())
        }

        async fn fetch_section(
            &self,
            _filing_url: &Url,
            _item: &str,
        ) -> Result<SectionOutcome, HarvestError> {
            Ok(SectionOutcome::Processing)
        }

        async fn verify_access(&self) -> bool {
            true
        }
    }

    fn location() -> FilingLocation {
        let company = Company::new("MSFT", "789019").unwrap();
        FilingLocation {
            target: FilingTarget::new(&company, 2023),
            filing_url: Url::parse(
                "https://www.sec.gov/Archives/edgar/data/0000789019/msft-10k.htm",
            )
            .unwrap(),
            accession_no: "0000950170-23-035122".to_string(),
            resolved_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_retry_exhaustion_yields_processing_timeout() {
        let mut config = crate::core::config::HarvestConfig::with_key("test-key");
        config.retry_delay = std::time::Duration::ZERO;
        let extractor = SectionExtractor::new(Arc::new(StuckApi), &config);

        let err = extractor
            .extract_one(&location(), SectionName::RiskFactors)
            .await
            .unwrap_err();

        match err {
            HarvestError::ProcessingTimeout { section, attempts } => {
                assert_eq!(section, "1A");
                assert_eq!(attempts, 3);
            }
            other => panic!("expected ProcessingTimeout, got {}", other),
        }
    }
}
