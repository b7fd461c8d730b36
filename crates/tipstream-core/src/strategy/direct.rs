use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::config::Quality;
use crate::error::ResolveError;
use crate::http::fetch_text;
use crate::playlist;
use crate::strategy::{StreamDescriptor, StreamStrategy};

/// Fetches a master playlist, picks a quality rung and resolves its URI.
///
/// A query string on the manifest URL (auth tokens travel there) is
/// re-appended to the selected variant at link-construction time.
pub struct DirectPlaylistStrategy {
    client: Client,
    url: String,
    quality: Quality,
}

impl DirectPlaylistStrategy {
    pub fn new(client: Client, url: impl Into<String>, quality: Quality) -> Self {
        Self {
            client,
            url: url.into(),
            quality,
        }
    }
}

#[async_trait]
impl StreamStrategy for DirectPlaylistStrategy {
    fn name(&self) -> &'static str {
        "direct_playlist"
    }

    async fn get(&self) -> Result<Option<StreamDescriptor>, ResolveError> {
        let manifest_url = Url::parse(self.url.trim()).map_err(|e| {
            ResolveError::UnableGetStreamMetadata {
                context: format!("manifest URL {:?}: {e}", self.url),
            }
        })?;
        let carried_query = manifest_url
            .query()
            .filter(|q| !q.is_empty())
            .map(str::to_string);

        let manifest = fetch_text(&self.client, manifest_url.as_str()).await?;
        let mut stream_url =
            playlist::resolve_stream_url(&manifest, &manifest_url, self.quality)?;

        if let Some(query) = carried_query {
            let separator = if stream_url.contains('?') { '&' } else { '?' };
            stream_url = format!("{stream_url}{separator}{query}");
        }
        debug!(%stream_url, "direct playlist variant resolved");

        Ok(Some(StreamDescriptor::Plain {
            uri: stream_url.trim().to_string(),
        }))
    }
}
