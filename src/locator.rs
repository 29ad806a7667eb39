use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::HarvestError;
use crate::filing::{FilingLocation, FilingTarget, FormType};
use crate::secapi::{FilingApi, FilingCandidate};

/// Resolves (company, fiscal year) targets to concrete filings, caching
/// resolutions so repeat lookups within a run cost no network calls.
pub struct FilingLocator {
    api: Arc<dyn FilingApi>,
    form: FormType,
    cache: HashMap<FilingTarget, FilingLocation>,
}

impl FilingLocator {
    pub fn new(api: Arc<dyn FilingApi>) -> Self {
        FilingLocator {
            api,
            form: FormType::Form10K,
            cache: HashMap::new(),
        }
    }

    /// Read-only view of the resolution cache.
    pub fn cache(&self) -> &HashMap<FilingTarget, FilingLocation> {
        &self.cache
    }

    pub async fn locate(&mut self, target: &FilingTarget) -> Result<FilingLocation, HarvestError> {
        if let Some(location) = self.cache.get(target) {
            log::debug!("Location cache hit for {}", target);
            return Ok(location.clone());
        }

        let candidates = self
            .api
            .search_filings(&target.cik, self.form, target.fiscal_year)
            .await?;

        let candidate = select_candidate(&candidates, target.fiscal_year).ok_or_else(|| {
            log::warn!("No {} {} filing found for {}", target.fiscal_year, self.form, target.ticker);
            HarvestError::NotFound {
                ticker: target.ticker.to_string(),
                year: target.fiscal_year,
            }
        })?;

        log::info!(
            "Found {} filing: {}",
            target,
            candidate.link_to_filing_details
        );

        let location = FilingLocation {
            target: target.clone(),
            filing_url: candidate.link_to_filing_details.clone(),
            accession_no: candidate.accession_no.clone(),
            resolved_at: Utc::now(),
        };
        // Overwrite semantics: at most one location per target.
        self.cache.insert(target.clone(), location.clone());
        Ok(location)
    }
}

/// Pick the best candidate for a fiscal year. Filings whose period of
/// report falls in the target year win over ones that merely were filed
/// in it; most recently filed breaks any remaining tie.
pub fn select_candidate(candidates: &[FilingCandidate], year: i32) -> Option<&FilingCandidate> {
    candidates
        .iter()
        .filter(|c| c.period_year() == Some(year) || c.filed_year() == year)
        .max_by_key(|c| (c.period_year() == Some(year), c.filed_at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, NaiveDate};
    use url::Url;

    fn candidate(accession: &str, filed: &str, period: Option<&str>) -> FilingCandidate {
        FilingCandidate {
            accession_no: accession.to_string(),
            form_type: "10-K".to_string(),
            filed_at: DateTime::parse_from_rfc3339(filed).unwrap(),
            period_of_report: period.map(|p| p.parse::<NaiveDate>().unwrap()),
            link_to_filing_details: Url::parse("https://www.sec.gov/Archives/edgar/data/0000789019/msft-10k.htm")
                .unwrap(),
        }
    }

    #[test]
    fn test_prefers_period_end_in_target_year() {
        // FY2023 10-K filed mid-2023 vs. an amended FY2022 filing also
        // filed in 2023.
        let candidates = vec![
            candidate("a-1", "2023-02-09T16:01:46-05:00", Some("2022-12-31")),
            candidate("a-2", "2023-07-27T16:01:46-04:00", Some("2023-06-30")),
        ];
        let best = select_candidate(&candidates, 2023).unwrap();
        assert_eq!(best.accession_no, "a-2");
    }

    #[test]
    fn test_most_recent_filed_breaks_ties() {
        let candidates = vec![
            candidate("a-1", "2023-07-01T10:00:00-04:00", Some("2023-06-30")),
            candidate("a-2", "2023-09-01T10:00:00-04:00", Some("2023-06-30")),
        ];
        let best = select_candidate(&candidates, 2023).unwrap();
        assert_eq!(best.accession_no, "a-2");
    }

    #[test]
    fn test_filed_year_match_accepted_without_period() {
        let candidates = vec![candidate("a-1", "2023-02-09T16:01:46-05:00", None)];
        assert!(select_candidate(&candidates, 2023).is_some());
        assert!(select_candidate(&candidates, 2024).is_none());
    }

    #[test]
    fn test_no_candidates_yields_none() {
        assert!(select_candidate(&[], 2024).is_none());
    }
}
