use thiserror::Error;

/// Everything that can go wrong between a match path and a playable link.
///
/// The engine never retries internally: transport faults surface as
/// [`ResolveError::Network`] on the first failure, and only
/// [`ResolveError::StreamNotStarted`] is worth retrying later from the
/// caller's side.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("network error for {url}: {reason}")]
    Network { url: String, reason: String },

    #[error("login failed, check username/password")]
    AuthenticationFailure,

    #[error("unexpected upstream response: {context}")]
    ProtocolMismatch { context: String },

    /// Upstream explicitly blocked playback and wants this text shown.
    #[error("{0}")]
    OperatorMessage(String),

    #[error("stream has not started yet")]
    StreamNotStarted,

    #[error("unsupported stream format")]
    UnsupportedFormat,

    #[error("manifest contains no variant streams")]
    EmptyLadder,

    #[error("no numeric stream id in match path {0:?}")]
    InvalidStreamIdentifier(String),

    #[error("unable to get stream metadata: {context}")]
    UnableGetStreamMetadata { context: String },

    #[error("unable to parse stream metadata")]
    UnableParseStreamMetadata {
        #[source]
        source: Box<ResolveError>,
    },
}

impl ResolveError {
    pub(crate) fn network(url: &str, err: reqwest::Error) -> Self {
        Self::Network {
            url: url.to_string(),
            reason: err.to_string(),
        }
    }

    pub(crate) fn mismatch(context: impl Into<String>) -> Self {
        Self::ProtocolMismatch {
            context: context.into(),
        }
    }

    /// True for faults the caller may resolve by simply trying again later.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::StreamNotStarted)
    }

    /// The operator-supplied block text, when this failure carries one.
    pub fn operator_message(&self) -> Option<&str> {
        match self {
            Self::OperatorMessage(text) => Some(text),
            _ => None,
        }
    }
}
