use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::company::Ticker;
use crate::filing::FilingRecord;
use crate::storage::FilingStore;

/// Ephemeral store for tests and dry runs.
#[derive(Default)]
pub struct InMemoryStore {
    records: RwLock<HashMap<(Ticker, i32), FilingRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl FilingStore for InMemoryStore {
    async fn save(&self, record: &FilingRecord) -> Result<()> {
        let key = (record.target.ticker.clone(), record.target.fiscal_year);
        self.records.write().unwrap().insert(key, record.clone());
        Ok(())
    }

    async fn load(&self, ticker: &Ticker, year: i32) -> Result<Option<FilingRecord>> {
        let key = (ticker.clone(), year);
        Ok(self.records.read().unwrap().get(&key).cloned())
    }
}
