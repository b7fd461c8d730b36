use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::config::Quality;
use crate::error::ResolveError;
use crate::http::fetch_json;
use crate::strategy::{DirectPlaylistStrategy, StreamDescriptor, StreamStrategy};

/// Provider-specific location of the manifest URL inside the redirect
/// document. Two providers use a flat key, one nests a level deeper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectProvider {
    /// `{"hlsUrl": "..."}`
    Img,
    /// `{"url": "..."}`
    Agura,
    /// `{"url": {"hls": {"url": "..."}}}`
    Tvcom,
}

impl RedirectProvider {
    fn extract<'a>(&self, document: &'a Value) -> Option<&'a str> {
        match self {
            Self::Img => document.get("hlsUrl")?.as_str(),
            Self::Agura => document.get("url")?.as_str(),
            Self::Tvcom => document.get("url")?.get("hls")?.get("url")?.as_str(),
        }
    }
}

/// Fetches a small provider JSON document, pulls the manifest URL out of
/// it and hands over to the direct-playlist behavior.
pub struct RedirectJsonStrategy {
    client: Client,
    url: String,
    quality: Quality,
    provider: RedirectProvider,
}

impl RedirectJsonStrategy {
    pub fn new(
        client: Client,
        url: impl Into<String>,
        quality: Quality,
        provider: RedirectProvider,
    ) -> Self {
        Self {
            client,
            url: url.into(),
            quality,
            provider,
        }
    }
}

#[async_trait]
impl StreamStrategy for RedirectJsonStrategy {
    fn name(&self) -> &'static str {
        match self.provider {
            RedirectProvider::Img => "url_img",
            RedirectProvider::Agura => "url_agura",
            RedirectProvider::Tvcom => "url_tvcom",
        }
    }

    async fn get(&self) -> Result<Option<StreamDescriptor>, ResolveError> {
        let document = fetch_json(&self.client, &self.url).await?;
        let Some(manifest_url) = self.provider.extract(&document) else {
            return Err(ResolveError::UnableGetStreamMetadata {
                context: format!("{} document carries no manifest URL", self.name()),
            });
        };
        debug!(provider = self.name(), %manifest_url, "redirect document resolved");
        DirectPlaylistStrategy::new(self.client.clone(), manifest_url, self.quality)
            .get()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MASTER: &str = "\
#EXTM3U
#EXT-X-STREAM-INF:BANDWIDTH=400000,RESOLUTION=320x180
chunklist_180.m3u8
";

    async fn mount_master(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/hls/master.m3u8"))
            .respond_with(ResponseTemplate::new(200).set_body_string(MASTER))
            .mount(server)
            .await;
    }

    async fn mount_redirect(server: &MockServer, body: String) {
        Mock::given(method("GET"))
            .and(path("/redirect.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(body)
                    .insert_header("content-type", "application/json"),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn img_provider_follows_flat_hls_url() {
        let server = MockServer::start().await;
        mount_master(&server).await;
        mount_redirect(
            &server,
            format!(r#"{{"hlsUrl":"{}/hls/master.m3u8"}}"#, server.uri()),
        )
        .await;

        let strategy = RedirectJsonStrategy::new(
            Client::new(),
            format!("{}/redirect.json", server.uri()),
            Quality::Low,
            RedirectProvider::Img,
        );
        let descriptor = strategy.get().await.unwrap().unwrap();
        assert_eq!(
            descriptor.player_link(),
            format!("{}/hls/chunklist_180.m3u8", server.uri())
        );
    }

    #[tokio::test]
    async fn agura_provider_follows_flat_url() {
        let server = MockServer::start().await;
        mount_master(&server).await;
        mount_redirect(
            &server,
            format!(r#"{{"url":"{}/hls/master.m3u8"}}"#, server.uri()),
        )
        .await;

        let strategy = RedirectJsonStrategy::new(
            Client::new(),
            format!("{}/redirect.json", server.uri()),
            Quality::Low,
            RedirectProvider::Agura,
        );
        let descriptor = strategy.get().await.unwrap().unwrap();
        assert_eq!(
            descriptor.player_link(),
            format!("{}/hls/chunklist_180.m3u8", server.uri())
        );
    }

    #[tokio::test]
    async fn tvcom_provider_follows_nested_url() {
        let server = MockServer::start().await;
        mount_master(&server).await;
        mount_redirect(
            &server,
            format!(
                r#"{{"url":{{"hls":{{"url":"{}/hls/master.m3u8"}}}}}}"#,
                server.uri()
            ),
        )
        .await;

        let strategy = RedirectJsonStrategy::new(
            Client::new(),
            format!("{}/redirect.json", server.uri()),
            Quality::Low,
            RedirectProvider::Tvcom,
        );
        let descriptor = strategy.get().await.unwrap().unwrap();
        assert_eq!(
            descriptor.player_link(),
            format!("{}/hls/chunklist_180.m3u8", server.uri())
        );
    }

    #[tokio::test]
    async fn missing_field_is_a_metadata_failure() {
        let server = MockServer::start().await;
        mount_redirect(&server, r#"{"somethingElse":true}"#.to_string()).await;

        for provider in [
            RedirectProvider::Img,
            RedirectProvider::Agura,
            RedirectProvider::Tvcom,
        ] {
            let strategy = RedirectJsonStrategy::new(
                Client::new(),
                format!("{}/redirect.json", server.uri()),
                Quality::Low,
                provider,
            );
            assert!(matches!(
                strategy.get().await,
                Err(ResolveError::UnableGetStreamMetadata { .. })
            ));
        }
    }

    #[tokio::test]
    async fn null_field_is_a_metadata_failure() {
        let server = MockServer::start().await;
        mount_redirect(&server, r#"{"hlsUrl":null}"#.to_string()).await;

        let strategy = RedirectJsonStrategy::new(
            Client::new(),
            format!("{}/redirect.json", server.uri()),
            Quality::Low,
            RedirectProvider::Img,
        );
        assert!(matches!(
            strategy.get().await,
            Err(ResolveError::UnableGetStreamMetadata { .. })
        ));
    }
}
