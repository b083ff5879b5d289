//! HTTP GET with ordered fallback candidates.

use crate::error::{Error, Result};
use reqwest::{Client, header};
use tracing::{debug, info, instrument, warn};

/// Desktop browser user agent; several result sites refuse unknown clients.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/120 Safari/537.36";
pub const ACCEPT: &str = "text/html";
pub const ACCEPT_LANGUAGE: &str = "th-TH,th;q=0.9,en;q=0.8";

/// Fetches result pages with a fixed header set.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    http: Client,
}

impl PageFetcher {
    /// Build a fetcher with a desktop-browser user agent and Thai/English
    /// `Accept-Language`.
    ///
    /// # Errors
    ///
    /// [`Error::Http`] if the TLS backend cannot be initialized.
    pub fn new() -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static(ACCEPT));
        headers.insert(
            header::ACCEPT_LANGUAGE,
            header::HeaderValue::from_static(ACCEPT_LANGUAGE),
        );

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;
        Ok(Self { http })
    }

    /// Return the body of the first candidate that answers with a 2xx status.
    ///
    /// Candidates after the first success are never contacted.
    ///
    /// # Arguments
    ///
    /// * `candidates` - Primary URL first, then mirror rewrites
    ///
    /// # Returns
    ///
    /// The raw response body of the first successful candidate.
    ///
    /// # Errors
    ///
    /// [`Error::NoSourceReachable`] once every candidate has failed.
    #[instrument(level = "info", skip_all, fields(candidates = candidates.len()))]
    pub async fn fetch_first(&self, candidates: &[String]) -> Result<String> {
        for (index, url) in candidates.iter().enumerate() {
            let attempt = index + 1;
            match self.fetch_one(url).await {
                Ok(body) => {
                    info!(%url, attempt, bytes = body.len(), "Fetched page");
                    return Ok(body);
                }
                Err(e) => {
                    warn!(
                        %url,
                        attempt,
                        error = %e,
                        "Fetch candidate failed; trying next"
                    );
                }
            }
        }
        Err(Error::NoSourceReachable {
            attempts: candidates.len(),
        })
    }

    async fn fetch_one(&self, url: &str) -> Result<String> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        debug!(%url, %status, "Candidate responded");
        if !status.is_success() {
            return Err(Error::FetchStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.text().await?)
    }
}
