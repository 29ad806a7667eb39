use anyhow::{anyhow, Result};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use structopt::StructOpt;

use secharvest::company::{default_roster, default_years, Company, Ticker};
use secharvest::core::config::HarvestConfig;
use secharvest::filing::{DownloadSummary, FilingStatus, FilingTarget};
use secharvest::orchestrator::DownloadOrchestrator;
use secharvest::secapi::{FilingApi, SecApiClient};
use secharvest::storage::JsonFileStore;

#[derive(Debug, StructOpt)]
#[structopt(name = "secharvest", about = "Download and extract 10-K filing sections")]
enum Command {
    /// Download the full company x year matrix
    Download {
        /// Restrict the matrix to these tickers (default: full roster)
        #[structopt(long)]
        tickers: Vec<String>,
        /// Restrict the matrix to these fiscal years (default: 2022-2024)
        #[structopt(long)]
        years: Vec<i32>,
    },
    /// Fetch exactly one (ticker, year) filing
    Fetch { ticker: String, year: i32 },
    /// Verify the configured SEC API credential
    Verify,
}

fn lookup_company(roster: &[Company], ticker: &str) -> Result<Company> {
    let ticker = Ticker::new(ticker).map_err(|e| anyhow!(e))?;
    roster
        .iter()
        .find(|c| c.ticker == ticker)
        .cloned()
        .ok_or_else(|| anyhow!("Ticker {} is not in the company roster", ticker))
}

fn print_summary(summary: &DownloadSummary) {
    let partial = summary
        .successes
        .iter()
        .filter(|r| r.status == FilingStatus::PartiallyExtracted)
        .count();

    println!();
    println!("{}", "=".repeat(60));
    println!("DOWNLOAD SUMMARY");
    println!("{}", "=".repeat(60));
    println!("Total targets: {}", summary.total_targets);
    let succeeded = format!("Succeeded: {}", summary.successes.len());
    if partial > 0 {
        println!("{} ({} partial)", succeeded.green(), partial);
    } else {
        println!("{}", succeeded.green());
    }
    println!("{}", format!("Failed: {}", summary.failures.len()).red());

    for failure in &summary.failures {
        println!("  - {}: {}", failure.target, failure.reason.yellow());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let command = Command::from_args();
    let config = HarvestConfig::from_env()?;
    let api: Arc<dyn FilingApi> = Arc::new(SecApiClient::new(&config)?);

    match command {
        Command::Verify => {
            if api.verify_access().await {
                println!("{}", "SEC API access verified successfully".green());
            } else {
                println!("{}", "SEC API access verification failed".red());
                std::process::exit(1);
            }
        }
        Command::Fetch { ticker, year } => {
            let roster = default_roster();
            let company = lookup_company(&roster, &ticker)?;
            let store = Arc::new(JsonFileStore::new(&config.data_dir)?);
            let mut orchestrator = DownloadOrchestrator::new(api, store, &config);

            let record = orchestrator.run_single(&company, year).await?;
            let status = match record.status {
                FilingStatus::Complete => record.status.to_string().green(),
                FilingStatus::PartiallyExtracted => record.status.to_string().yellow(),
                FilingStatus::Failed => record.status.to_string().red(),
            };
            println!("{} {}: {}", company.ticker, year, status);
            for section in record.sections.values() {
                let truncated = if section.truncated { " (truncated)" } else { "" };
                println!(
                    "  {}: {} chars{}",
                    section.name,
                    section.text.chars().count(),
                    truncated
                );
            }
        }
        Command::Download { tickers, years } => {
            let roster = if tickers.is_empty() {
                default_roster()
            } else {
                tickers
                    .iter()
                    .map(|t| lookup_company(&default_roster(), t))
                    .collect::<Result<Vec<_>>>()?
            };
            let years = if years.is_empty() { default_years() } else { years };
            let targets = FilingTarget::matrix(&roster, &years);

            // Ctrl+C stops starting new targets; the in-flight one finishes.
            let running = Arc::new(AtomicBool::new(true));
            let r = running.clone();
            ctrlc::set_handler(move || {
                println!("\nReceived Ctrl+C, finishing current target...");
                r.store(false, Ordering::SeqCst);
            })?;

            let bar = ProgressBar::new(targets.len() as u64);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
                    .progress_chars("#>-"),
            );

            let store = Arc::new(JsonFileStore::new(&config.data_dir)?);
            let mut orchestrator = DownloadOrchestrator::new(api, store, &config)
                .with_cancel_flag(running)
                .with_progress(bar);

            match orchestrator.run(&targets).await {
                Ok(summary) => print_summary(&summary),
                Err(e) => {
                    eprintln!("{}", format!("Download aborted: {}", e).red());
                    eprintln!("Please check:");
                    eprintln!("1. Your SEC_API_KEY environment variable is set");
                    eprintln!("2. Your API key is valid and has quota remaining");
                    eprintln!("3. Your internet connection is working");
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
