use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use bocfix_core::CorrectionCommand;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::debug;

use crate::request::TransactionUpdateRequest;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Where corrections are written. Failures are returned, never retried here.
pub trait Ledger: Send + Sync + 'static {
    fn update_transaction(
        &self,
        cmd: &CorrectionCommand,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Firefly III REST client.
#[derive(Clone)]
pub struct FireflyClient {
    http: reqwest::Client,
    base_url: String,
}

impl FireflyClient {
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut bearer = HeaderValue::from_str(&format!("Bearer {token}"))
            .context("token is not a valid header value")?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.api+json"));

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()
            .context("create http client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn transaction_url(&self, id: i64) -> String {
        format!("{}/api/v1/transactions/{id}", self.base_url)
    }

    pub async fn put_transaction(&self, id: i64, req: &TransactionUpdateRequest) -> Result<()> {
        let url = self.transaction_url(id);
        debug!(%url, "updating firefly transaction");

        let resp = self
            .http
            .put(&url)
            .json(req)
            .send()
            .await
            .with_context(|| format!("firefly request {url}"))?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("firefly error: {status} {txt} (url: {url})");
        }

        Ok(())
    }
}

impl Ledger for FireflyClient {
    async fn update_transaction(&self, cmd: &CorrectionCommand) -> Result<()> {
        self.put_transaction(cmd.journal_id, &TransactionUpdateRequest::from(cmd))
            .await
            .context("failed to update transaction")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_url_joins_cleanly() {
        let c = FireflyClient::new("https://firefly.example.com/", "tok").unwrap();
        assert_eq!(c.transaction_url(42), "https://firefly.example.com/api/v1/transactions/42");
    }

    #[test]
    fn test_rejects_token_with_newline() {
        assert!(FireflyClient::new("http://localhost", "bad\ntoken").is_err());
    }
}
