use serde::{Deserialize, Serialize};

/// A validated ticker symbol, always stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    pub fn new(ticker: impl Into<String>) -> Result<Self, String> {
        let uppercase_ticker = ticker.into().to_uppercase();
        if uppercase_ticker.is_empty() {
            return Err("Ticker cannot be empty".to_string());
        }
        if !uppercase_ticker
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(format!(
                "Ticker must contain only alphanumeric characters or hyphens: {}",
                uppercase_ticker
            ));
        }
        Ok(Ticker(uppercase_ticker))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Ticker {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Ticker::new(s)
    }
}

impl From<Ticker> for String {
    fn from(t: Ticker) -> String {
        t.0
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Ticker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One company in the harvest roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub ticker: Ticker,
    pub cik: String,
}

impl Company {
    pub fn new(ticker: &str, cik: &str) -> Result<Self, String> {
        Ok(Company {
            ticker: Ticker::new(ticker)?,
            cik: cik.to_string(),
        })
    }
}

/// Reference roster: the three companies the batch deployment tracks.
pub fn default_roster() -> Vec<Company> {
    vec![
        Company::new("GOOGL", "1652044").unwrap(),
        Company::new("MSFT", "789019").unwrap(),
        Company::new("NVDA", "1045810").unwrap(),
    ]
}

/// Fiscal years the reference deployment fetches.
pub fn default_years() -> Vec<i32> {
    vec![2022, 2023, 2024]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_uppercases() {
        let t = Ticker::new("msft").unwrap();
        assert_eq!(t.as_str(), "MSFT");
    }

    #[test]
    fn test_ticker_rejects_empty_and_symbols() {
        assert!(Ticker::new("").is_err());
        assert!(Ticker::new("BRK.A").is_err());
        assert!(Ticker::new("BRK-A").is_ok());
    }

    #[test]
    fn test_default_roster_ciks() {
        let roster = default_roster();
        assert_eq!(roster.len(), 3);
        assert_eq!(roster[1].ticker.as_str(), "MSFT");
        assert_eq!(roster[1].cik, "789019");
    }
}
