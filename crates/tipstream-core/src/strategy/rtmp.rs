use async_trait::async_trait;

use crate::error::ResolveError;
use crate::strategy::{StreamDescriptor, StreamStrategy};

/// Splits an RTMP URL of the form `scheme://host/.../a/b/playpath` into
/// base, app (`a/b`) and playpath. No network round-trip involved.
pub struct RtmpStrategy {
    url: String,
}

impl RtmpStrategy {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl StreamStrategy for RtmpStrategy {
    fn name(&self) -> &'static str {
        "rtmp"
    }

    async fn get(&self) -> Result<Option<StreamDescriptor>, ResolveError> {
        let mut segments: Vec<&str> = self.url.trim().split('/').collect();

        let Some(play_path) = segments.pop().filter(|s| !s.is_empty()) else {
            return Ok(None);
        };
        // The two segments right before the playpath form the app.
        if segments.len() < 2 {
            return Ok(None);
        }
        let app_tail = segments.pop().unwrap_or_default();
        let app_head = segments.pop().unwrap_or_default();
        if app_head.is_empty() || app_tail.is_empty() {
            return Ok(None);
        }
        let base_url = segments.join("/");
        if base_url.is_empty() {
            return Ok(None);
        }

        Ok(Some(StreamDescriptor::Rtmp {
            base_url,
            play_path: play_path.to_string(),
            app: format!("{app_head}/{app_tail}"),
            is_live: true,
        }))
    }
}
