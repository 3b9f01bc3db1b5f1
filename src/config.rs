//! Client configuration.
//!
//! Paths on the backend changed between revisions, so the route layout is
//! configuration rather than code. See [`RouteStyle`].

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default backend address.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default number of collaborative recommendations.
pub const DEFAULT_TOP_N: u32 = 5;

/// Default number of model-based recommendations.
pub const DEFAULT_TOP_K: u32 = 10;

/// Which path layout the backend exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RouteStyle {
    /// `/recommended`, `/liked`, `/like/{id}`, `/unlike/{id}`.
    Legacy,
    /// `/recommendations/{user}`, `/liked/{user}`, `/like/{id}/user/{user}`, ...
    #[default]
    UserScoped,
}

impl FromStr for RouteStyle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "legacy" => Ok(RouteStyle::Legacy),
            "user-scoped" | "user_scoped" | "userscoped" => Ok(RouteStyle::UserScoped),
            other => Err(format!("unknown route style: {}", other)),
        }
    }
}

/// How `login` establishes a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginMode {
    /// Persist any non-empty username without asking the backend.
    Local,
    /// POST `/login` and only persist on success.
    #[default]
    Remote,
}

impl FromStr for LoginMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" | "mock" => Ok(LoginMode::Local),
            "remote" => Ok(LoginMode::Remote),
            other => Err(format!("unknown login mode: {}", other)),
        }
    }
}

/// Where recommendations come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendationSource {
    /// Similarity between users' liked sets, top `n` tracks.
    Collaborative { top_n: u32 },
    /// External recommendation model, top `k` tracks.
    Model { top_k: u32 },
}

impl Default for RecommendationSource {
    fn default() -> Self {
        RecommendationSource::Collaborative {
            top_n: DEFAULT_TOP_N,
        }
    }
}

/// Configuration for [`MusicApi`](crate::api::MusicApi) and the session store.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Backend path layout.
    pub routes: RouteStyle,
    /// Login behaviour.
    pub login_mode: LoginMode,
    /// Recommendation endpoint selection.
    pub recommendations: RecommendationSource,
    /// File backing the persisted session.
    pub session_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            routes: RouteStyle::default(),
            login_mode: LoginMode::default(),
            recommendations: RecommendationSource::default(),
            session_path: default_session_path(),
        }
    }
}

impl ClientConfig {
    /// Create a config for a backend URL with all other values defaulted.
    pub fn new<S: Into<String>>(base_url: S) -> Self {
        Self::default().with_base_url(base_url)
    }

    /// Set the backend URL. A trailing slash is dropped.
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the route layout.
    pub fn with_routes(mut self, routes: RouteStyle) -> Self {
        self.routes = routes;
        self
    }

    /// Set the login behaviour.
    pub fn with_login_mode(mut self, login_mode: LoginMode) -> Self {
        self.login_mode = login_mode;
        self
    }

    /// Set the recommendation source.
    pub fn with_recommendations(mut self, recommendations: RecommendationSource) -> Self {
        self.recommendations = recommendations;
        self
    }

    /// Set the session file.
    pub fn with_session_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.session_path = path.into();
        self
    }
}

/// `$XDG_CONFIG_HOME/soundwave/session.json`, or `~/.config/...` when unset.
///
/// Falls back to the working directory when neither variable exists.
pub fn default_session_path() -> PathBuf {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        PathBuf::from(xdg)
    } else if let Some(home) = env::var_os("HOME") {
        PathBuf::from(home).join(".config")
    } else {
        PathBuf::from(".")
    };

    config_home.join("soundwave").join("session.json")
}
