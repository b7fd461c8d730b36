use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use tracing::debug;

use crate::config::Quality;
use crate::error::ResolveError;
use crate::http::fetch_text;
use crate::strategy::{DirectPlaylistStrategy, StreamDescriptor, StreamStrategy};

static LAUNCH_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<streamLaunchCode><!\[CDATA\[(.*?)\]\]></streamLaunchCode>")
        .expect("valid launch-code pattern")
});

/// Scrapes `<streamLaunchCode>` CDATA entries out of the provider's XML
/// document and follows the last HLS-looking one.
pub struct UrlPerformStrategy {
    client: Client,
    url: String,
    quality: Quality,
}

impl UrlPerformStrategy {
    pub fn new(client: Client, url: impl Into<String>, quality: Quality) -> Self {
        Self {
            client,
            url: url.into(),
            quality,
        }
    }
}

#[async_trait]
impl StreamStrategy for UrlPerformStrategy {
    fn name(&self) -> &'static str {
        "url_perform"
    }

    async fn get(&self) -> Result<Option<StreamDescriptor>, ResolveError> {
        let document = fetch_text(&self.client, &self.url).await?;
        let flattened = document.replace('\n', "");

        let candidates: Vec<&str> = LAUNCH_CODE
            .captures_iter(&flattened)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str())
            .filter(|u| u.contains("m3u8") || u.contains("hls"))
            .collect();

        let Some(manifest_url) = candidates.last() else {
            debug!(url = %self.url, "no HLS launch code in perform document");
            return Ok(None);
        };
        DirectPlaylistStrategy::new(self.client.clone(), *manifest_url, self.quality)
            .get()
            .await
    }
}
