use crate::config::LookupConfig;
use crate::domain::country::{CountryCode, CountryLookupResult};
use crate::domain::ports::CountryLookup;
use crate::error::{CardCostError, LookupError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Country lookup backed by the binlist.net BIN database.
///
/// Performs one `GET {base_url}/{pan}` per call. Nothing is cached and failed
/// calls are not retried.
#[derive(Debug, Clone)]
pub struct BinlistClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct BinlistBody {
    country: Option<BinlistCountry>,
}

#[derive(Debug, Deserialize)]
struct BinlistCountry {
    alpha2: Option<String>,
}

impl BinlistClient {
    pub fn new(config: &LookupConfig) -> Result<Self> {
        config.validate()?;
        let mut builder = reqwest::Client::builder().user_agent("cardcost/0.1.0");
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder
            .build()
            .map_err(|e| CardCostError::InternalError(Box::new(e)))?;
        Ok(Self::with_client(client, config))
    }

    /// Uses a preconfigured `reqwest::Client`; proxy settings in `config` are ignored.
    pub fn with_client(client: reqwest::Client, config: &LookupConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout(),
        }
    }
}

#[async_trait]
impl CountryLookup for BinlistClient {
    async fn lookup(&self, pan: &str) -> std::result::Result<CountryLookupResult, LookupError> {
        let url = format!("{}/{}", self.base_url, pan);
        let response = self
            .client
            .get(&url)
            .header("Accept-Version", "3")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(transport_error)?;
        parse_binlist_body(&body)
    }
}

/// Extracts the issuing country from a binlist JSON payload.
pub fn parse_binlist_body(body: &str) -> std::result::Result<CountryLookupResult, LookupError> {
    let parsed: BinlistBody =
        serde_json::from_str(body).map_err(|e| LookupError::Malformed(e.to_string()))?;
    let alpha2 = parsed
        .country
        .and_then(|c| c.alpha2)
        .ok_or(LookupError::MissingCountry)?;
    let code = CountryCode::parse(&alpha2).map_err(|_| LookupError::MissingCountry)?;
    Ok(CountryLookupResult::new(code))
}

// The request URL carries the full PAN, so it is stripped from the message.
fn transport_error(e: reqwest::Error) -> LookupError {
    let e = e.without_url();
    if e.is_timeout() {
        LookupError::Timeout
    } else if e.is_connect() {
        LookupError::Unreachable(e.to_string())
    } else if e.is_decode() {
        LookupError::Malformed(e.to_string())
    } else {
        LookupError::Transport(e.to_string())
    }
}
