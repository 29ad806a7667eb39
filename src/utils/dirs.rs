use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

// Subdirectory of the data dir holding one JSON file per harvested filing
pub const RAW_FILINGS_SUBDIR: &str = "raw_filings";

pub fn raw_filings_dir(data_dir: &Path) -> PathBuf {
    data_dir.join(RAW_FILINGS_SUBDIR)
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)?;
    Ok(())
}

pub fn ensure_data_dirs(data_dir: &Path) -> Result<()> {
    ensure_dir(data_dir)?;
    ensure_dir(&raw_filings_dir(data_dir))?;
    Ok(())
}
