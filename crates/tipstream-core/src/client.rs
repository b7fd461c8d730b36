//! The engine facade: one authenticated client, one resolution at a time.

use std::sync::Arc;

use cookie_store::CookieStore;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use reqwest_cookie_store::CookieStoreMutex;

use crate::alert::AlertInterceptor;
use crate::config::SiteConfig;
use crate::error::ResolveError;
use crate::factory::StreamStrategyFactory;
use crate::matches::{self, Match};
use crate::session::SessionManager;
use crate::strategy::StreamDescriptor;

/// Client for the Tipsport live-TV offering.
///
/// Holds the mutable cookie jar, so at most one resolution should be in
/// flight per instance; nothing here is synchronized for concurrent use.
pub struct Tipstream {
    config: Arc<SiteConfig>,
    client: Client,
    session: SessionManager,
    alert: AlertInterceptor,
    factory: StreamStrategyFactory,
}

impl Tipstream {
    /// Fresh client with an empty cookie jar.
    pub fn new(config: SiteConfig) -> Self {
        Self::with_cookie_store(config, CookieStore::default())
    }

    /// Client over a previously persisted cookie jar.
    pub fn with_cookie_store(config: SiteConfig, store: CookieStore) -> Self {
        let config = Arc::new(config);
        let cookies = Arc::new(CookieStoreMutex::new(store));

        let mut headers = HeaderMap::new();
        headers.insert("DNT", HeaderValue::from_static("1"));
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .cookie_provider(Arc::clone(&cookies))
            .gzip(true)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            session: SessionManager::new(client.clone(), Arc::clone(&config), cookies),
            alert: AlertInterceptor::new(client.clone(), Arc::clone(&config)),
            factory: StreamStrategyFactory::new(client.clone(), Arc::clone(&config)),
            client,
            config,
        }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// The jar backing this client, for save-at-end persistence.
    pub fn cookie_store(&self) -> Arc<CookieStoreMutex> {
        self.session.cookie_store()
    }

    pub async fn is_authenticated(&self) -> Result<bool, ResolveError> {
        self.session.is_authenticated().await
    }

    pub async fn login(&self) -> Result<(), ResolveError> {
        self.session.login().await
    }

    /// Turn a relative match path into a playable stream descriptor.
    ///
    /// Reauthenticates at most once, lets an operator message short-circuit
    /// everything, then runs the per-format probe loop.
    pub async fn resolve(&self, match_path: &str) -> Result<StreamDescriptor, ResolveError> {
        self.session.ensure_authenticated().await?;
        self.alert.check().await?;
        self.factory.resolve(match_path).await
    }

    /// Today's programme of broadcastable matches.
    pub async fn matches(&self) -> Result<Vec<Match>, ResolveError> {
        self.session.ensure_authenticated().await?;
        matches::fetch_matches(&self.client, &self.config).await
    }
}
