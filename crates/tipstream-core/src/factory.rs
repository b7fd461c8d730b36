//! Per-format probing loop that picks and runs one stream strategy.

use std::sync::Arc;

use reqwest::Client;
use tracing::{debug, warn};

use crate::config::SiteConfig;
use crate::envelope::{parse_probe, Envelope, Probe};
use crate::error::ResolveError;
use crate::http::fetch_text;
use crate::strategy::{
    DirectPlaylistStrategy, NullStrategy, RedirectJsonStrategy, RedirectProvider, RtmpStrategy,
    StreamDescriptor, StreamStrategy, UrlPerformStrategy,
};

/// Envelope `type` upstream answers while a broadcast is not live yet.
const NOT_STARTED_TYPE: &str = "INF";

/// Probe order is strict priority: HLS family first, RTMP next, then the
/// composite format, then the provider grab-bag.
const FORMAT_PROBES: [&str; 4] = ["HLS", "RTMP", "RTMP_WITH_HLS", "OTHER"];

pub struct StreamStrategyFactory {
    client: Client,
    config: Arc<SiteConfig>,
}

impl StreamStrategyFactory {
    pub fn new(client: Client, config: Arc<SiteConfig>) -> Self {
        Self { client, config }
    }

    /// Resolve a relative match path into a playable descriptor.
    pub async fn resolve(&self, match_path: &str) -> Result<StreamDescriptor, ResolveError> {
        let strategy = self.pick_strategy(match_path).await?;
        debug!(strategy = strategy.name(), "stream strategy selected");
        match strategy.get().await {
            Ok(Some(descriptor)) => Ok(descriptor),
            Ok(None) => Err(ResolveError::UnsupportedFormat),
            Err(e) => Err(ResolveError::UnableParseStreamMetadata {
                source: Box::new(e),
            }),
        }
    }

    async fn pick_strategy(
        &self,
        match_path: &str,
    ) -> Result<Box<dyn StreamStrategy>, ResolveError> {
        let stream_id = parse_stream_id(match_path)?;
        let base_url = format!(
            "{}/rest/offer/v2/live/matches/{stream_id}/stream?deviceType=DESKTOP",
            self.config.mobile_api_base(),
        );

        // Format-less probe first: carries the liveness sentinel.
        let body = fetch_text(&self.client, &base_url).await?;
        match parse_probe(&body) {
            Probe::Blocked(message) => return Err(ResolveError::OperatorMessage(message)),
            Probe::Malformed(context) => {
                return Err(ResolveError::mismatch(format!("liveness probe: {context}")));
            }
            Probe::Parsed(envelope) if envelope.stream_type == NOT_STARTED_TYPE => {
                return Err(ResolveError::StreamNotStarted);
            }
            Probe::Parsed(_) => {}
        }

        for format in FORMAT_PROBES {
            let url = format!("{base_url}&format={format}");
            let body = fetch_text(&self.client, &url).await?;
            match parse_probe(&body) {
                // An explicit block outranks any format that might still match.
                Probe::Blocked(message) => return Err(ResolveError::OperatorMessage(message)),
                Probe::Malformed(context) => {
                    debug!(format, context, "skipping malformed probe envelope");
                }
                Probe::Parsed(envelope) => {
                    if let Some(strategy) = self.strategy_for(format, &envelope) {
                        return Ok(strategy);
                    }
                }
            }
        }
        Ok(Box::new(NullStrategy::new(match_path)))
    }

    fn strategy_for(&self, format: &str, envelope: &Envelope) -> Option<Box<dyn StreamStrategy>> {
        let client = self.client.clone();
        let quality = self.config.quality;
        let data = envelope.data.as_str();

        match (format, envelope.stream_type.as_str()) {
            ("HLS", "HLS") => Some(Box::new(DirectPlaylistStrategy::new(client, data, quality))),
            ("HLS", "URL_IMG") => Some(Box::new(RedirectJsonStrategy::new(
                client,
                data,
                quality,
                RedirectProvider::Img,
            ))),
            ("HLS", "URL_AGURA") => Some(Box::new(RedirectJsonStrategy::new(
                client,
                data,
                quality,
                RedirectProvider::Agura,
            ))),
            ("RTMP", "RTMP") => {
                if data.is_empty() {
                    debug!("rtmp probe answered with an empty address");
                    None
                } else {
                    Some(Box::new(RtmpStrategy::new(data)))
                }
            }
            ("RTMP_WITH_HLS", "RTMP_WITH_HLS") => {
                // Composite payload: `<rtmp>###<hls-manifest-url>`.
                match data.split("###").nth(1).filter(|url| !url.is_empty()) {
                    Some(url) => Some(Box::new(DirectPlaylistStrategy::new(client, url, quality))),
                    None => {
                        debug!("composite payload without embedded playlist URL");
                        None
                    }
                }
            }
            ("OTHER", "URL_PERFORM") => {
                Some(Box::new(UrlPerformStrategy::new(client, data, quality)))
            }
            ("OTHER", "URL_TVCOM") => Some(Box::new(RedirectJsonStrategy::new(
                client,
                data,
                quality,
                RedirectProvider::Tvcom,
            ))),
            (_, stream_type) => {
                warn!(
                    format,
                    stream_type,
                    source = %envelope.source,
                    "unrecognized stream type for format probe"
                );
                None
            }
        }
    }
}

/// Pull the numeric stream id out of the trailing path segment.
///
/// `/team-a-team-b/2768186` → `2768186`; anything non-numeric is invalid.
fn parse_stream_id(match_path: &str) -> Result<u64, ResolveError> {
    let without_fragment = match_path.split('#').next().unwrap_or_default();
    let trailing = without_fragment.rsplit('/').next().unwrap_or_default();
    trailing
        .parse::<u64>()
        .map_err(|_| ResolveError::InvalidStreamIdentifier(match_path.to_string()))
}
