//! Operator-message gate that runs before every resolution attempt.

use std::sync::Arc;

use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::config::SiteConfig;
use crate::error::ResolveError;
use crate::http::fetch_text;

const INFO_PATH: &str = "/rest/articles/v1/tv/info";

pub struct AlertInterceptor {
    client: Client,
    config: Arc<SiteConfig>,
}

impl AlertInterceptor {
    pub fn new(client: Client, config: Arc<SiteConfig>) -> Self {
        Self { client, config }
    }

    /// Ask upstream whether playback should be blocked with a message.
    ///
    /// A `buttonDescription` of null means all clear; any text means the
    /// operator wants it shown, truncated after its first sentence.
    pub async fn check(&self) -> Result<(), ResolveError> {
        let url = format!("{}{}", self.config.mobile_api_base(), INFO_PATH);
        let body = fetch_text(&self.client, &url).await?;

        let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&body) else {
            return Err(ResolveError::mismatch("tv/info body is not a JSON object"));
        };
        let Some(description) = map.get("buttonDescription") else {
            return Err(ResolveError::mismatch("tv/info missing buttonDescription"));
        };
        if description.is_null() {
            debug!("no operator message");
            return Ok(());
        }
        match description.as_str() {
            Some(text) => Err(ResolveError::OperatorMessage(truncate_sentence(text))),
            None => Err(ResolveError::mismatch("tv/info buttonDescription is not text")),
        }
    }
}

/// Keep everything up to and including the first `.`, adding one if missing.
fn truncate_sentence(text: &str) -> String {
    let head = match text.split_once('.') {
        Some((head, _)) => head,
        None => text,
    };
    format!("{head}.")
}
