#![forbid(unsafe_code)]

pub mod alert;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod factory;
pub mod matches;
pub mod playlist;
pub mod session;
pub mod strategy;

mod http;

pub use alert::AlertInterceptor;
pub use client::Tipstream;
pub use config::{Quality, Site, SiteConfig};
pub use envelope::{Envelope, Probe};
pub use error::ResolveError;
pub use factory::StreamStrategyFactory;
pub use matches::Match;
pub use playlist::PlaylistVariant;
pub use session::SessionManager;
pub use strategy::{StreamDescriptor, StreamStrategy};
