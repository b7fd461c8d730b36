//! Authentication state and cookie continuity.

use std::sync::Arc;

use reqwest::Client;
use reqwest_cookie_store::CookieStoreMutex;
use serde_json::json;
use tracing::{debug, info};

use crate::config::SiteConfig;
use crate::error::ResolveError;

const LOGIN_PROBE_PATH: &str = "/rest/ver1/client/restrictions/login/duration";
const SESSION_PATH: &str = "/rest/client/v1/session";

/// Owns the authenticated session against the main site.
///
/// Authentication is never cached: every check is a live probe, and the
/// cookie jar is the only carried state. The jar is shared with the HTTP
/// client and exposed so an external collaborator can persist it across
/// process invocations.
pub struct SessionManager {
    client: Client,
    config: Arc<SiteConfig>,
    cookies: Arc<CookieStoreMutex>,
}

impl SessionManager {
    pub fn new(client: Client, config: Arc<SiteConfig>, cookies: Arc<CookieStoreMutex>) -> Self {
        Self {
            client,
            config,
            cookies,
        }
    }

    pub fn cookie_store(&self) -> Arc<CookieStoreMutex> {
        Arc::clone(&self.cookies)
    }

    /// Probe whether the current cookies hold a valid login.
    ///
    /// Transport faults propagate; they are not the same as "logged out".
    pub async fn is_authenticated(&self) -> Result<bool, ResolveError> {
        let url = format!("{}{}", self.config.site_base(), LOGIN_PROBE_PATH);
        let response = self
            .client
            .put(&url)
            .send()
            .await
            .map_err(|e| ResolveError::network(&url, e))?;
        let authenticated = response.status().is_success();
        debug!(authenticated, "login probe");
        Ok(authenticated)
    }

    /// Perform the credential handshake.
    ///
    /// The login response's own status is not trusted; success is only
    /// what the follow-up probe says it is.
    pub async fn login(&self) -> Result<(), ResolveError> {
        let site = self.config.site_base();

        // First touch the site to pick up session cookies.
        self.client
            .get(site)
            .send()
            .await
            .map_err(|e| ResolveError::network(site, e))?;

        let url = format!("{site}{SESSION_PATH}");
        let body = json!({
            "username": self.config.username,
            "password": self.config.password,
        });
        self.client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.redacted_network(&url, e))?;

        if !self.is_authenticated().await? {
            return Err(ResolveError::AuthenticationFailure);
        }
        info!("login succeeded");
        Ok(())
    }

    /// Probe once; log in at most once. A still-failing session after the
    /// single login attempt is terminal.
    pub async fn ensure_authenticated(&self) -> Result<(), ResolveError> {
        if self.is_authenticated().await? {
            return Ok(());
        }
        self.login().await
    }

    /// Transport errors from the credential POST must never echo the
    /// credentials; mask them while keeping the rest of the message.
    fn redacted_network(&self, url: &str, err: reqwest::Error) -> ResolveError {
        let mut url = url.to_string();
        let mut reason = err.to_string();
        for secret in [&self.config.username, &self.config.password] {
            if !secret.is_empty() {
                url = url.replace(secret.as_str(), "<redacted>");
                reason = reason.replace(secret.as_str(), "<redacted>");
            }
        }
        ResolveError::Network { url, reason }
    }
}
