//! TOML configuration file schema and parsing.
//!
//! Example config file:
//!
//! ```toml
//! site = "cz"
//! quality = "high"
//! log_format = "pretty"
//!
//! [credentials]
//! username = "punter42"
//! password = "hunter2"          # or set TIPSTREAM_PASSWORD instead
//!
//! [session]
//! cookie_file = "~/.cache/tipstream/cookies.json"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use tipstream_core::{Quality, Site, SiteConfig};

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_site")]
    pub site: Site,

    #[serde(default)]
    pub quality: Quality,

    #[serde(default = "default_log_format")]
    pub log_format: String,

    pub credentials: Credentials,

    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,

    /// Optional in the file; falls back to the TIPSTREAM_PASSWORD env var.
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub cookie_file: Option<PathBuf>,
}

fn default_site() -> Site {
    Site::Cz
}

fn default_log_format() -> String {
    "pretty".into()
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, String> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;
        toml::from_str(&raw)
            .map_err(|e| format!("Failed to parse config file {}: {}", path.display(), e))
    }

    /// Materialize the engine configuration, resolving the password from
    /// the file or the environment.
    pub fn to_site_config(&self) -> Result<SiteConfig, String> {
        let password = self
            .credentials
            .password
            .clone()
            .or_else(|| std::env::var("TIPSTREAM_PASSWORD").ok())
            .ok_or("No password: set credentials.password or TIPSTREAM_PASSWORD")?;
        Ok(
            SiteConfig::new(self.site, self.credentials.username.clone(), password)
                .with_quality(self.quality),
        )
    }

    pub fn cookie_file(&self) -> PathBuf {
        self.session
            .cookie_file
            .clone()
            .unwrap_or_else(default_cookie_file)
    }
}

fn default_cookie_file() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".cache/tipstream/cookies.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_parses_with_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [credentials]
            username = "punter42"
            password = "hunter2"
            "#,
        )
        .unwrap();
        assert_eq!(config.site, Site::Cz);
        assert_eq!(config.quality, Quality::High);
        assert_eq!(config.log_format, "pretty");
        assert!(config.session.cookie_file.is_none());

        let site = config.to_site_config().unwrap();
        assert_eq!(site.username, "punter42");
        assert_eq!(site.quality, Quality::High);
    }

    #[test]
    fn full_config_overrides_everything() {
        let config: AppConfig = toml::from_str(
            r#"
            site = "sk"
            quality = "low"
            log_format = "json"

            [credentials]
            username = "u"
            password = "p"

            [session]
            cookie_file = "/tmp/jar.json"
            "#,
        )
        .unwrap();
        assert_eq!(config.site, Site::Sk);
        assert_eq!(config.quality, Quality::Low);
        assert_eq!(config.cookie_file(), PathBuf::from("/tmp/jar.json"));
    }

    #[test]
    fn missing_password_everywhere_is_an_error() {
        let config: AppConfig = toml::from_str(
            r#"
            [credentials]
            username = "u"
            "#,
        )
        .unwrap();
        std::env::remove_var("TIPSTREAM_PASSWORD");
        assert!(config.to_site_config().is_err());
    }
}
