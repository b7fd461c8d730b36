//! Thin fetch helpers shared by the probe loop and the strategies.
//!
//! Deliberately no retries, timeouts or backoff: the engine performs one
//! sequential round-trip per step and propagates the first transport fault.

use reqwest::Client;

use crate::error::ResolveError;

pub(crate) async fn fetch_text(client: &Client, url: &str) -> Result<String, ResolveError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ResolveError::network(url, e))?;
    response
        .text()
        .await
        .map_err(|e| ResolveError::network(url, e))
}

pub(crate) async fn fetch_json(
    client: &Client,
    url: &str,
) -> Result<serde_json::Value, ResolveError> {
    let body = fetch_text(client, url).await?;
    serde_json::from_str(&body).map_err(|e| ResolveError::UnableGetStreamMetadata {
        context: format!("{url}: {e}"),
    })
}
