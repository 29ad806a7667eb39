use anyhow::{Context, Result};
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};

use crate::company::Ticker;
use crate::filing::FilingRecord;
use crate::storage::FilingStore;
use crate::utils::dirs;

/// One pretty-printed JSON file per filing under `<data_dir>/raw_filings/`.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(data_dir: &Path) -> Result<Self> {
        dirs::ensure_data_dirs(data_dir)?;
        Ok(JsonFileStore {
            dir: dirs::raw_filings_dir(data_dir),
        })
    }

    fn filepath(&self, ticker: &Ticker, year: i32) -> PathBuf {
        self.dir.join(format!("{}_{}.json", ticker, year))
    }
}

#[async_trait]
impl FilingStore for JsonFileStore {
    async fn save(&self, record: &FilingRecord) -> Result<()> {
        let filepath = self.filepath(&record.target.ticker, record.target.fiscal_year);
        let json = serde_json::to_string_pretty(record)?;
        fs::write(&filepath, json)
            .with_context(|| format!("Failed to save filing to {:?}", filepath))?;
        log::info!("Saved {} to {:?}", record.target, filepath);
        Ok(())
    }

    async fn load(&self, ticker: &Ticker, year: i32) -> Result<Option<FilingRecord>> {
        let filepath = self.filepath(ticker, year);
        if !filepath.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&filepath)
            .with_context(|| format!("Failed to read filing from {:?}", filepath))?;
        let record = serde_json::from_str(&content)
            .with_context(|| format!("Invalid filing JSON in {:?}", filepath))?;
        Ok(Some(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::company::Company;
    use crate::filing::{FilingLocation, FilingTarget, Section, SectionName};
    use chrono::Utc;
    use std::collections::BTreeMap;
    use tempfile::tempdir;
    use url::Url;

    fn sample_record() -> FilingRecord {
        let company = Company::new("MSFT", "789019").unwrap();
        let target = FilingTarget::new(&company, 2023);
        let location = FilingLocation {
            target: target.clone(),
            filing_url: Url::parse(
                "https://www.sec.gov/Archives/edgar/data/0000789019/msft-10k.htm",
            )
            .unwrap(),
            accession_no: "0000950170-23-035122".to_string(),
            resolved_at: Utc::now(),
        };
        let mut sections = BTreeMap::new();
        sections.insert(
            SectionName::Business,
            Section::new(SectionName::Business, "x".repeat(500), 50_000),
        );
        FilingRecord::new(location, sections, 1)
    }

    #[tokio::test]
    async fn test_save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();
        let record = sample_record();

        store.save(&record).await.unwrap();
        let loaded = store
            .load(&record.target.ticker, 2023)
            .await
            .unwrap()
            .expect("record should exist");

        assert_eq!(loaded.target, record.target);
        assert_eq!(loaded.status, record.status);
        assert_eq!(loaded.sections.len(), 1);
    }

    #[tokio::test]
    async fn test_load_missing_is_none() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();
        let ticker = crate::company::Ticker::new("NVDA").unwrap();
        assert!(store.load(&ticker, 2024).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_overwrites_existing() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();
        let record = sample_record();

        store.save(&record).await.unwrap();
        store.save(&record).await.unwrap();

        let files: Vec<_> = fs::read_dir(dirs::raw_filings_dir(dir.path()))
            .unwrap()
            .collect();
        assert_eq!(files.len(), 1);
    }
}
