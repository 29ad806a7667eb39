use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::{fmt, str::FromStr};
use strum::EnumIter;
use url::Url;

use crate::company::{Company, Ticker};

/// Per-section character cap. 50K chars is plenty for downstream chunking.
pub const MAX_SECTION_CHARS: usize = 50_000;

/// Responses shorter than this are noise (error pages, stray markup), not
/// a usable section body.
pub const MIN_SECTION_CHARS: usize = 100;

/// The form type we harvest. Only annual reports for now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormType {
    Form10K,
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormType::Form10K => write!(f, "10-K"),
        }
    }
}

/// The fixed set of 10-K sections worth extracting for financial Q&A,
/// in extraction order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum SectionName {
    Business,
    RiskFactors,
    FinancialPerformance,
    FinancialStatements,
}

impl SectionName {
    /// Item code understood by the extractor API.
    pub fn item_code(&self) -> &'static str {
        match self {
            SectionName::Business => "1",
            SectionName::RiskFactors => "1A",
            SectionName::FinancialPerformance => "7",
            SectionName::FinancialStatements => "8",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SectionName::Business => "Business Description",
            SectionName::RiskFactors => "Risk Factors",
            SectionName::FinancialPerformance => "Management's Discussion and Analysis",
            SectionName::FinancialStatements => "Financial Statements",
        }
    }
}

impl fmt::Display for SectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionName::Business => write!(f, "business"),
            SectionName::RiskFactors => write!(f, "risk_factors"),
            SectionName::FinancialPerformance => write!(f, "financial_performance"),
            SectionName::FinancialStatements => write!(f, "financial_statements"),
        }
    }
}

impl FromStr for SectionName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "business" => Ok(SectionName::Business),
            "risk_factors" => Ok(SectionName::RiskFactors),
            "financial_performance" => Ok(SectionName::FinancialPerformance),
            "financial_statements" => Ok(SectionName::FinancialStatements),
            _ => Err(format!("Unknown section name: {}", s)),
        }
    }
}

/// One desired filing: a (company, fiscal year) pair. Immutable once the
/// batch is configured.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilingTarget {
    pub ticker: Ticker,
    pub cik: String,
    pub fiscal_year: i32,
}

impl FilingTarget {
    pub fn new(company: &Company, fiscal_year: i32) -> Self {
        FilingTarget {
            ticker: company.ticker.clone(),
            cik: company.cik.clone(),
            fiscal_year,
        }
    }

    /// Cartesian product of a roster and a year list, company-major order.
    pub fn matrix(companies: &[Company], years: &[i32]) -> Vec<FilingTarget> {
        let mut targets = Vec::with_capacity(companies.len() * years.len());
        for company in companies {
            for year in years {
                targets.push(FilingTarget::new(company, *year));
            }
        }
        targets
    }
}

impl fmt::Display for FilingTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ticker, self.fiscal_year)
    }
}

/// A resolved filing: where the document lives and which accession it is.
/// At most one per target at a time; repeat lookups overwrite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilingLocation {
    pub target: FilingTarget,
    pub filing_url: Url,
    pub accession_no: String,
    pub resolved_at: DateTime<Utc>,
}

/// One extracted section, truncated to the configured cap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub name: SectionName,
    pub item: String,
    pub text: String,
    pub full_length: usize,
    pub truncated: bool,
}

impl Section {
    /// Build a section from raw extractor output, enforcing the char cap.
    pub fn new(name: SectionName, text: String, max_chars: usize) -> Self {
        let full_length = text.chars().count();
        let truncated = full_length > max_chars;
        let text = if truncated {
            text.chars().take(max_chars).collect()
        } else {
            text
        };
        Section {
            name,
            item: name.item_code().to_string(),
            text,
            full_length,
            truncated,
        }
    }
}

/// Whether a filing came back whole, usable-but-partial, or empty.
/// Downstream consumers treat partial records differently from complete
/// ones, so this is deliberately not a boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilingStatus {
    Complete,
    PartiallyExtracted,
    Failed,
}

impl fmt::Display for FilingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilingStatus::Complete => write!(f, "complete"),
            FilingStatus::PartiallyExtracted => write!(f, "partially_extracted"),
            FilingStatus::Failed => write!(f, "failed"),
        }
    }
}

/// The terminal result of one target's extraction. Never retried after
/// the run's extraction loop exits for that target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilingRecord {
    pub target: FilingTarget,
    pub location: FilingLocation,
    pub sections: BTreeMap<SectionName, Section>,
    pub status: FilingStatus,
    pub extracted_at: DateTime<Utc>,
}

impl FilingRecord {
    pub fn new(
        location: FilingLocation,
        sections: BTreeMap<SectionName, Section>,
        requested: usize,
    ) -> Self {
        let status = if sections.len() == requested && requested > 0 {
            FilingStatus::Complete
        } else if sections.is_empty() {
            FilingStatus::Failed
        } else {
            FilingStatus::PartiallyExtracted
        };
        FilingRecord {
            target: location.target.clone(),
            location,
            sections,
            status,
            extracted_at: Utc::now(),
        }
    }
}

/// One target that did not produce a usable record, with the reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedTarget {
    pub target: FilingTarget,
    pub reason: String,
}

/// Aggregated outcome of a batch run. Built incrementally by the
/// orchestrator, read-only once the run returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadSummary {
    pub total_targets: usize,
    pub successes: Vec<FilingRecord>,
    pub failures: Vec<FailedTarget>,
}

impl DownloadSummary {
    pub fn new(total_targets: usize) -> Self {
        DownloadSummary {
            total_targets,
            successes: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn record_success(&mut self, record: FilingRecord) {
        self.successes.push(record);
    }

    pub fn record_failure(&mut self, target: &FilingTarget, reason: impl Into<String>) {
        self.failures.push(FailedTarget {
            target: target.clone(),
            reason: reason.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_section_order_and_item_codes() {
        let names: Vec<SectionName> = SectionName::iter().collect();
        assert_eq!(
            names,
            vec![
                SectionName::Business,
                SectionName::RiskFactors,
                SectionName::FinancialPerformance,
                SectionName::FinancialStatements,
            ]
        );
        assert_eq!(SectionName::RiskFactors.item_code(), "1A");
        assert_eq!(SectionName::FinancialPerformance.item_code(), "7");
    }

    #[test]
    fn test_section_name_round_trip() {
        for name in SectionName::iter() {
            assert_eq!(name.to_string().parse::<SectionName>().unwrap(), name);
        }
    }

    #[test]
    fn test_section_truncates_at_cap() {
        let section = Section::new(SectionName::Business, "abcdef".repeat(100), 200);
        assert_eq!(section.text.chars().count(), 200);
        assert_eq!(section.full_length, 600);
        assert!(section.truncated);
    }

    #[test]
    fn test_section_under_cap_untouched() {
        let section = Section::new(SectionName::Business, "short body".to_string(), 200);
        assert_eq!(section.text, "short body");
        assert_eq!(section.full_length, 10);
        assert!(!section.truncated);
    }

    #[test]
    fn test_section_truncation_counts_chars_not_bytes() {
        // Multibyte text must not be split mid-character.
        let section = Section::new(SectionName::Business, "é".repeat(10), 4);
        assert_eq!(section.text, "é".repeat(4));
        assert!(section.truncated);
    }

    #[test]
    fn test_matrix_is_company_major() {
        let companies = crate::company::default_roster();
        let years = vec![2022, 2023];
        let targets = FilingTarget::matrix(&companies, &years);
        assert_eq!(targets.len(), 6);
        assert_eq!(targets[0].ticker.as_str(), "GOOGL");
        assert_eq!(targets[0].fiscal_year, 2022);
        assert_eq!(targets[1].ticker.as_str(), "GOOGL");
        assert_eq!(targets[1].fiscal_year, 2023);
        assert_eq!(targets[2].ticker.as_str(), "MSFT");
    }
}
