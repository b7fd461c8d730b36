use serde::{Deserialize, Serialize};
use url::Url;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/97.0.4692.99 Safari/537.36 OPR/83.0.4254.27";

/// Which national Tipsport site to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Site {
    Cz,
    Sk,
}

impl Site {
    pub fn base_url(self) -> Url {
        let url = match self {
            Self::Cz => "https://www.tipsport.cz",
            Self::Sk => "https://www.tipsport.sk",
        };
        Url::parse(url).expect("valid site URL")
    }

    pub fn mobile_api_url(self) -> Url {
        let url = match self {
            Self::Cz => "https://m.tipsport.cz",
            Self::Sk => "https://m.tipsport.sk",
        };
        Url::parse(url).expect("valid mobile API URL")
    }
}

impl std::str::FromStr for Site {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "0" | "cz" => Ok(Self::Cz),
            "1" | "sk" => Ok(Self::Sk),
            other => Err(format!("unknown site '{other}' (expected cz or sk)")),
        }
    }
}

/// Requested quality level inside a variant ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Low,
    Mid,
    High,
}

impl Quality {
    /// Zero-based slot this quality asks for in an ascending ladder.
    pub fn slot(self) -> usize {
        match self {
            Self::Low => 0,
            Self::Mid => 1,
            Self::High => 2,
        }
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self::High
    }
}

impl std::str::FromStr for Quality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "0" | "low" => Ok(Self::Low),
            "1" | "mid" => Ok(Self::Mid),
            "2" | "high" => Ok(Self::High),
            other => Err(format!("unknown quality '{other}' (expected low, mid or high)")),
        }
    }
}

/// Configuration for one engine instance.
///
/// All of this is external process-wide state (credentials, quality choice,
/// endpoints); it is handed in explicitly at construction and never read
/// from ambient globals.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Main site base, e.g. `https://www.tipsport.cz`.
    pub site: Url,
    /// Mobile API base, e.g. `https://m.tipsport.cz`.
    pub mobile_api: Url,
    pub username: String,
    pub password: String,
    pub quality: Quality,
    pub user_agent: String,
}

impl SiteConfig {
    pub fn new(site: Site, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            site: site.base_url(),
            mobile_api: site.mobile_api_url(),
            username: username.into(),
            password: password.into(),
            quality: Quality::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    /// Point both endpoints somewhere else. Used by tests and mirrors.
    pub fn with_base_urls(mut self, site: Url, mobile_api: Url) -> Self {
        self.site = site;
        self.mobile_api = mobile_api;
        self
    }

    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Base URL string with no trailing slash, ready for path concatenation.
    pub(crate) fn site_base(&self) -> &str {
        self.site.as_str().trim_end_matches('/')
    }

    pub(crate) fn mobile_api_base(&self) -> &str {
        self.mobile_api.as_str().trim_end_matches('/')
    }
}
