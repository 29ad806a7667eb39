use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use url::Url;

use super::{FilingApi, FilingCandidate, SectionOutcome};
use crate::core::config::HarvestConfig;
use crate::error::HarvestError;
use crate::filing::FormType;
use crate::utils::rate_limit::RateLimiter;

pub const QUERY_URL: &str = "https://api.sec-api.io";
pub const EXTRACTOR_URL: &str = "https://api.sec-api.io/extractor";

const EXTRACTOR_TIMEOUT: Duration = Duration::from_secs(60);
const VERIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// Responses shorter than this from the extractor are error blurbs or
/// stray markup, never a section body.
const MIN_USABLE_RESPONSE: usize = 10;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    filings: Vec<FilingCandidate>,
}

/// Authenticated SEC-API.io client. Every outbound call waits on the
/// rate limiter first.
pub struct SecApiClient {
    http: Client,
    api_key: String,
    limiter: RateLimiter,
    query_url: Url,
    extractor_url: Url,
}

impl SecApiClient {
    pub fn new(config: &HarvestConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&config.api_key)
            .map_err(|_| anyhow!("SEC_API_KEY contains invalid header characters"))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(SecApiClient {
            http,
            api_key: config.api_key.clone(),
            limiter: RateLimiter::new(config.call_interval),
            query_url: Url::parse(QUERY_URL)?,
            extractor_url: Url::parse(EXTRACTOR_URL)?,
        })
    }
}

#[async_trait]
impl FilingApi for SecApiClient {
    async fn search_filings(
        &self,
        cik: &str,
        form: FormType,
        year: i32,
    ) -> Result<Vec<FilingCandidate>, HarvestError> {
        // Fiscal-year filings are often filed early the following
        // calendar year, so the filedAt window extends one year past the
        // target.
        let query_string = format!(
            r#"cik:{} AND formType:"{}" AND filedAt:[{}-01-01 TO {}-12-31]"#,
            cik,
            form,
            year,
            year + 1
        );
        let payload = json!({
            "query": query_string,
            "from": "0",
            "size": "10",
            "sort": [{ "filedAt": { "order": "desc" } }],
        });

        log::info!("Searching filings: {}", query_string);
        self.limiter.await_slot().await;

        let response = self
            .http
            .post(self.query_url.clone())
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;

        let data: SearchResponse = response
            .json()
            .await
            .map_err(|e| HarvestError::UnexpectedResponse(format!("search response: {}", e)))?;

        log::info!(
            "Found {} filings for CIK {} in {}",
            data.filings.len(),
            cik,
            year
        );
        Ok(data.filings)
    }

    async fn fetch_section(
        &self,
        filing_url: &Url,
        item: &str,
    ) -> Result<SectionOutcome, HarvestError> {
        self.limiter.await_slot().await;

        let response = self
            .http
            .get(self.extractor_url.clone())
            .query(&[
                ("url", filing_url.as_str()),
                ("item", item),
                ("type", "text"),
                ("token", &self.api_key),
            ])
            .timeout(EXTRACTOR_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;

        let content = response.text().await?;
        let trimmed = content.trim();

        if trimmed.eq_ignore_ascii_case("processing") {
            return Ok(SectionOutcome::Processing);
        }
        if trimmed.len() < MIN_USABLE_RESPONSE {
            log::warn!("Empty or minimal content for item {}", item);
            return Ok(SectionOutcome::Empty);
        }

        Ok(SectionOutcome::Text(content))
    }

    async fn verify_access(&self) -> bool {
        let payload = json!({
            "query": r#"ticker:AAPL AND formType:"10-K""#,
            "from": "0",
            "size": "1",
        });

        self.limiter.await_slot().await;

        let response = match self
            .http
            .post(self.query_url.clone())
            .json(&payload)
            .timeout(VERIFY_TIMEOUT)
            .send()
            .await
            .and_then(|r| r.error_for_status())
        {
            Ok(r) => r,
            Err(e) => {
                log::error!("SEC API access verification failed: {}", e);
                return false;
            }
        };

        match response.json::<serde_json::Value>().await {
            Ok(data) if data.get("filings").map(|f| f.is_array()).unwrap_or(false) => {
                log::info!("SEC API access verified successfully");
                true
            }
            Ok(_) => {
                log::error!("Invalid response format from SEC API");
                false
            }
            Err(e) => {
                log::error!("SEC API access verification failed: {}", e);
                false
            }
        }
    }
}
