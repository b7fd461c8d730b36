//! Today's TV programme: the list of matches a stream can be resolved for.

use std::sync::Arc;

use chrono::NaiveTime;
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::config::SiteConfig;
use crate::error::ResolveError;
use crate::http::fetch_text;

const PROGRAM_PATH: &str = "/rest/articles/v1/tv/program?day=0&articleId=";

/// One broadcastable match from the daily programme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub name: String,
    pub first_team: String,
    pub second_team: String,
    pub competition: String,
    pub sport: String,
    /// Relative match path, the input to stream resolution.
    pub url: String,
    pub start_time: NaiveTime,
    pub live: bool,
    pub score: Option<String>,
    pub status: Option<String>,
}

impl Match {
    fn from_raw(raw: RawMatch) -> Self {
        let (first_team, second_team, name) = split_name(&raw.name);
        let start_time = NaiveTime::parse_from_str(&raw.match_start_time, "%H:%M")
            .unwrap_or_else(|_| {
                debug!(start = %raw.match_start_time, "unparseable match start time");
                NaiveTime::MIN
            });
        Self {
            name,
            first_team,
            second_team,
            competition: raw.competition,
            sport: raw.sport,
            url: raw.url,
            start_time,
            live: raw.live,
            score: raw.score.as_ref().and_then(|s| s.score_offer.clone()),
            status: raw.score.as_ref().and_then(|s| s.status_offer.clone()),
        }
    }
}

/// `"TeamA-TeamB"` → both teams plus a display name; anything else keeps
/// the raw name with empty team fields.
fn split_name(name: &str) -> (String, String, String) {
    match name.split_once('-') {
        Some((first, second)) if !first.is_empty() && !second.is_empty() => (
            first.to_string(),
            second.to_string(),
            format!("{first} - {second}"),
        ),
        _ => (String::new(), String::new(), name.to_string()),
    }
}

#[derive(Debug, Deserialize)]
struct Programme {
    program: Vec<SportBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SportBlock {
    #[serde(default)]
    matches_by_timespans: Vec<Vec<RawMatch>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMatch {
    name: String,
    #[serde(default)]
    competition: String,
    #[serde(default)]
    sport: String,
    url: String,
    #[serde(default)]
    match_start_time: String,
    #[serde(default, deserialize_with = "bool_or_string")]
    live: bool,
    #[serde(default)]
    score: Option<RawScore>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawScore {
    #[serde(default)]
    score_offer: Option<String>,
    #[serde(default)]
    status_offer: Option<String>,
}

/// Upstream serializes the live flag as a bool or as `"true"`/`"false"`.
fn bool_or_string<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }
    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Text(s) => s == "true",
    })
}

/// Fetch today's programme, flattened across sports and timespans, sorted
/// by start time.
pub(crate) async fn fetch_matches(
    client: &Client,
    config: &Arc<SiteConfig>,
) -> Result<Vec<Match>, ResolveError> {
    let url = format!("{}{}", config.mobile_api_base(), PROGRAM_PATH);
    let body = fetch_text(client, &url).await?;
    if !body.contains("program") {
        return Err(ResolveError::mismatch("tv/program body has no programme"));
    }
    let programme: Programme = serde_json::from_str(&body)
        .map_err(|e| ResolveError::mismatch(format!("tv/program did not parse: {e}")))?;

    let mut matches: Vec<Match> = programme
        .program
        .into_iter()
        .flat_map(|sport| sport.matches_by_timespans)
        .flatten()
        .map(Match::from_raw)
        .collect();
    matches.sort_by_key(|m| m.start_time);
    debug!(count = matches.len(), "programme loaded");
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Site;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PROGRAMME: &str = r#"{
        "program": [
            {
                "id": 23,
                "matchesByTimespans": [
                    [
                        {
                            "name": "Sparta-Trinec",
                            "competition": "Tipsport extraliga",
                            "sport": "Hokej",
                            "url": "/sparta-trinec/2768186",
                            "matchStartTime": "18:30",
                            "live": true,
                            "score": {"scoreOffer": "2:1", "statusOffer": "2. třetina"}
                        },
                        {
                            "name": "Plzen-Kladno",
                            "competition": "Tipsport extraliga",
                            "sport": "Hokej",
                            "url": "/plzen-kladno/2768187",
                            "matchStartTime": "16:00",
                            "live": "false",
                            "score": null
                        }
                    ]
                ]
            }
        ]
    }"#;

    #[test]
    fn split_name_handles_both_shapes() {
        assert_eq!(
            split_name("Sparta-Trinec"),
            ("Sparta".into(), "Trinec".into(), "Sparta - Trinec".into())
        );
        assert_eq!(
            split_name("Exhibition"),
            ("".into(), "".into(), "Exhibition".into())
        );
    }

    #[tokio::test]
    async fn programme_flattens_and_sorts_by_start_time() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/articles/v1/tv/program"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PROGRAMME))
            .mount(&server)
            .await;

        let base = Url::parse(&server.uri()).unwrap();
        let config =
            Arc::new(SiteConfig::new(Site::Cz, "u", "p").with_base_urls(base.clone(), base));
        let matches = fetch_matches(&Client::new(), &config).await.unwrap();

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].name, "Plzen - Kladno");
        assert!(!matches[0].live);
        assert_eq!(matches[1].name, "Sparta - Trinec");
        assert!(matches[1].live);
        assert_eq!(matches[1].score.as_deref(), Some("2:1"));
        assert_eq!(matches[1].url, "/sparta-trinec/2768186");
    }

    #[tokio::test]
    async fn body_without_programme_is_a_mismatch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/articles/v1/tv/program"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
            .mount(&server)
            .await;

        let base = Url::parse(&server.uri()).unwrap();
        let config =
            Arc::new(SiteConfig::new(Site::Cz, "u", "p").with_base_urls(base.clone(), base));
        assert!(matches!(
            fetch_matches(&Client::new(), &config).await,
            Err(ResolveError::ProtocolMismatch { .. })
        ));
    }
}
