mod client;
pub use client::SecApiClient;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::HarvestError;
use crate::filing::FormType;

/// One filing descriptor returned by the SEC-API query interface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilingCandidate {
    #[serde(rename = "accessionNo")]
    pub accession_no: String,
    #[serde(rename = "formType")]
    pub form_type: String,
    #[serde(rename = "filedAt")]
    pub filed_at: DateTime<FixedOffset>,
    #[serde(rename = "periodOfReport", default)]
    pub period_of_report: Option<NaiveDate>,
    #[serde(rename = "linkToFilingDetails")]
    pub link_to_filing_details: Url,
}

impl FilingCandidate {
    pub fn filed_year(&self) -> i32 {
        self.filed_at.year()
    }

    pub fn period_year(&self) -> Option<i32> {
        self.period_of_report.map(|d| d.year())
    }
}

/// Outcome of one extractor call. A closed set so the retry loop is a
/// state transition rather than response-shape probing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionOutcome {
    /// Section body is ready.
    Text(String),
    /// The service is still preparing the section; worth retrying.
    Processing,
    /// The service answered but with nothing usable; retrying won't help.
    Empty,
}

/// The external filing service capability the orchestrator consumes.
/// `SecApiClient` implements it against SEC-API.io; tests inject
/// scripted fakes.
#[async_trait]
pub trait FilingApi: Send + Sync {
    /// Query for candidate filings of `form` for `cik` around fiscal
    /// year `year`. Zero candidates is a normal outcome, not an error.
    async fn search_filings(
        &self,
        cik: &str,
        form: FormType,
        year: i32,
    ) -> Result<Vec<FilingCandidate>, HarvestError>;

    /// Fetch one section of the filing at `filing_url` by item code.
    async fn fetch_section(
        &self,
        filing_url: &Url,
        item: &str,
    ) -> Result<SectionOutcome, HarvestError>;

    /// Cheap authenticated probe. Never errors; any failure is `false`.
    async fn verify_access(&self) -> bool;
}
