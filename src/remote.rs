//! Client for the raw-text parse service.

use anyhow::{Context, Result};

use crate::model::Template;

mod http_client;
mod types;
pub use self::types::*;

/// Turns raw query text into structured query configs.
pub trait ParseService: Send + Sync {
    /// Parse `queries` at `endpoint` (a source's `links.queries`).
    fn parse(
        &self,
        endpoint: &str,
        queries: &[RawQuery],
        templates: &[Template],
    ) -> Result<Vec<ParsedQuery>>;
}

pub struct HttpParseService {
    base_url: Option<String>,
    client: reqwest::blocking::Client,
}

impl HttpParseService {
    /// `base_url` is prepended to endpoints that are not absolute URLs.
    pub fn new(base_url: Option<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("celledit")
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("build reqwest client")?;
        Ok(Self {
            base_url: base_url.map(|u| u.trim_end_matches('/').to_string()),
            client,
        })
    }
}

impl ParseService for HttpParseService {
    fn parse(
        &self,
        endpoint: &str,
        queries: &[RawQuery],
        templates: &[Template],
    ) -> Result<Vec<ParsedQuery>> {
        let url = self.url(endpoint)?;
        let resp = self
            .client
            .post(&url)
            .json(&QueriesRequest {
                queries: queries.to_vec(),
                temp_vars: templates.to_vec(),
            })
            .send()
            .with_context(|| format!("parse queries request to {}", url))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            anyhow::bail!("parse endpoint not found at {} (is the source configured?)", url);
        }

        let body: QueriesResponse = self
            .ensure_ok(resp, "parse queries")?
            .json()
            .context("parse queries response")?;
        Ok(body.queries)
    }
}
