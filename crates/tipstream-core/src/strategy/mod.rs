//! The closed family of per-format stream handlers.
//!
//! Each strategy turns one probe envelope into a playable descriptor.
//! `Ok(None)` means "this envelope looked right but carried nothing
//! playable"; the factory maps that to `UnsupportedFormat`.

pub mod direct;
pub mod perform;
pub mod redirect;
pub mod rtmp;

use async_trait::async_trait;
use tracing::warn;

use crate::error::ResolveError;

pub use direct::DirectPlaylistStrategy;
pub use perform::UrlPerformStrategy;
pub use redirect::{RedirectJsonStrategy, RedirectProvider};
pub use rtmp::RtmpStrategy;

/// The only artifact ever handed to the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamDescriptor {
    Rtmp {
        base_url: String,
        play_path: String,
        app: String,
        is_live: bool,
    },
    Plain {
        uri: String,
    },
}

impl StreamDescriptor {
    /// Render the single line a player consumes.
    pub fn player_link(&self) -> String {
        match self {
            Self::Rtmp {
                base_url,
                play_path,
                app,
                is_live,
            } => {
                let live = if *is_live { " live=true" } else { "" };
                format!("{base_url} playpath={play_path} app={app}{live}")
            }
            Self::Plain { uri } => uri.clone(),
        }
    }
}

/// One concrete algorithm for turning an envelope into a descriptor.
#[async_trait]
pub trait StreamStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn get(&self) -> Result<Option<StreamDescriptor>, ResolveError>;
}

/// Explicit "no format matched" sentinel, distinguishable by name.
pub struct NullStrategy {
    match_path: String,
}

impl NullStrategy {
    pub fn new(match_path: impl Into<String>) -> Self {
        Self {
            match_path: match_path.into(),
        }
    }
}

#[async_trait]
impl StreamStrategy for NullStrategy {
    fn name(&self) -> &'static str {
        "null"
    }

    async fn get(&self) -> Result<Option<StreamDescriptor>, ResolveError> {
        warn!(match_path = %self.match_path, "no stream strategy matched");
        Ok(None)
    }
}
