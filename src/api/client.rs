//! HTTP client for the Soundwave backend.
//!
//! Each call is made exactly once; a failure is returned to the caller and
//! never retried here.

use std::collections::HashSet;

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde_json::{json, Value};
use tracing::{debug, error};

use super::routes::{Route, Routes};
use crate::config::ClientConfig;
use crate::converters;
use crate::error::{Result, SoundwaveError};
use crate::models::{Session, Track};
use crate::source::{LoginReply, TrackSource};

/// Live backend client.
///
/// # Example
///
/// ```rust,no_run
/// use soundwave::{ClientConfig, MusicApi, TrackSource};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let api = MusicApi::new(ClientConfig::new("http://localhost:8000"))?;
///     for track in api.fetch_all().await? {
///         println!("{} - {}", track.artist, track.title);
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MusicApi {
    client: Client,
    base_url: Url,
    routes: Routes,
}

impl MusicApi {
    /// Create a client from configuration.
    ///
    /// The configured timeout applies to every request.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| SoundwaveError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(SoundwaveError::InvalidUrl(config.base_url));
        }

        let client = Client::builder()
            .user_agent(concat!("soundwave/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url,
            routes: Routes::new(config.routes, config.recommendations),
        })
    }

    /// The route table in use.
    pub fn routes(&self) -> &Routes {
        &self.routes
    }

    /// Resolve a route against the base URL.
    fn url(&self, route: &Route) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SoundwaveError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(route.segments.iter());
        if !route.query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(route.query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    /// Turn a non-success response into a server error.
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let err = SoundwaveError::from_response(status, &body);
        error!("Backend error: {}", err);
        Err(err)
    }

    /// Make a GET request and decode the JSON body.
    async fn get_json(&self, route: Route) -> Result<Value> {
        let url = self.url(&route)?;
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let response = Self::check(response).await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Make a POST request and decode the JSON body, if any.
    async fn post_json(&self, route: Route, body: Option<Value>) -> Result<Value> {
        let url = self.url(&route)?;
        debug!("POST {}", url);

        let mut request = self.client.post(url);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = Self::check(request.send().await?).await?;

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// Get raw track records from the catalog endpoint.
    pub async fn fetch_all_raw(&self) -> Result<Value> {
        self.get_json(self.routes.songs()).await
    }
}

#[async_trait]
impl TrackSource for MusicApi {
    async fn fetch_all(&self) -> Result<Vec<Track>> {
        let data = self.fetch_all_raw().await?;
        converters::parse_tracks(&data, &HashSet::new())
    }

    async fn fetch_recommended(&self, session: &Session) -> Result<Vec<Track>> {
        let data = self
            .get_json(self.routes.recommended(session.username()))
            .await?;
        converters::parse_tracks(&data, &HashSet::new())
    }

    async fn search(&self, query: &str) -> Result<Vec<Track>> {
        let data = self.get_json(self.routes.search(query)).await?;
        converters::parse_tracks(&data, &HashSet::new())
    }

    async fn fetch_liked(&self, session: &Session) -> Result<Vec<Track>> {
        let data = self.get_json(self.routes.liked(session.username())).await?;
        converters::parse_liked_tracks(&data)
    }

    async fn like(&self, track_id: &str, session: &Session) -> Result<()> {
        self.post_json(self.routes.like(track_id, session.username()), None)
            .await?;
        Ok(())
    }

    async fn unlike(&self, track_id: &str, session: &Session) -> Result<()> {
        self.post_json(self.routes.unlike(track_id, session.username()), None)
            .await?;
        Ok(())
    }

    async fn login(&self, username: &str) -> Result<LoginReply> {
        let data = self
            .post_json(self.routes.login(), Some(json!({ "username": username })))
            .await?;
        let message = data
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or_default()
            .to_string();
        Ok(LoginReply { message })
    }
}
