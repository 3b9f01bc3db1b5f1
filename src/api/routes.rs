//! Backend path table.
//!
//! Each route is a list of path segments plus query parameters. Segments are
//! percent-encoded when the client joins them onto the base URL, so usernames
//! with spaces or slashes stay a single segment.

use crate::config::{RecommendationSource, RouteStyle};

/// A request target relative to the base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Path segments, unencoded.
    pub segments: Vec<String>,
    /// Query parameters.
    pub query: Vec<(&'static str, String)>,
}

impl Route {
    fn path<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
            query: Vec::new(),
        }
    }

    fn with_query(mut self, key: &'static str, value: impl ToString) -> Self {
        self.query.push((key, value.to_string()));
        self
    }

    /// Render as `/a/b?k=v` for logging. No encoding is applied.
    pub fn display(&self) -> String {
        let mut out = format!("/{}", self.segments.join("/"));
        for (i, (k, v)) in self.query.iter().enumerate() {
            out.push(if i == 0 { '?' } else { '&' });
            out.push_str(k);
            out.push('=');
            out.push_str(v);
        }
        out
    }
}

/// Builds routes for one backend layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Routes {
    style: RouteStyle,
    recommendations: RecommendationSource,
}

impl Routes {
    pub fn new(style: RouteStyle, recommendations: RecommendationSource) -> Self {
        Self {
            style,
            recommendations,
        }
    }

    pub fn songs(&self) -> Route {
        Route::path(["songs"])
    }

    /// Legacy backends only know `/recommended`; the source choice is ignored.
    pub fn recommended(&self, username: &str) -> Route {
        match (self.style, self.recommendations) {
            (RouteStyle::Legacy, _) => Route::path(["recommended"]),
            (RouteStyle::UserScoped, RecommendationSource::Collaborative { top_n }) => {
                Route::path(["recommendations", username]).with_query("top_n", top_n)
            }
            (RouteStyle::UserScoped, RecommendationSource::Model { top_k }) => {
                Route::path(["ml-recommendations", username]).with_query("top_k", top_k)
            }
        }
    }

    pub fn search(&self, query: &str) -> Route {
        Route::path(["search"]).with_query("query", query)
    }

    pub fn liked(&self, username: &str) -> Route {
        match self.style {
            RouteStyle::Legacy => Route::path(["liked"]),
            RouteStyle::UserScoped => Route::path(["liked", username]),
        }
    }

    pub fn like(&self, track_id: &str, username: &str) -> Route {
        self.like_relation("like", track_id, username)
    }

    pub fn unlike(&self, track_id: &str, username: &str) -> Route {
        self.like_relation("unlike", track_id, username)
    }

    pub fn login(&self) -> Route {
        Route::path(["login"])
    }

    fn like_relation(&self, verb: &str, track_id: &str, username: &str) -> Route {
        match self.style {
            RouteStyle::Legacy => Route::path([verb, track_id]),
            RouteStyle::UserScoped => Route::path([verb, track_id, "user", username]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scoped() -> Routes {
        Routes::new(RouteStyle::UserScoped, RecommendationSource::default())
    }

    fn legacy() -> Routes {
        Routes::new(RouteStyle::Legacy, RecommendationSource::default())
    }

    #[test]
    fn test_user_scoped_routes() {
        let routes = scoped();
        assert_eq!(routes.liked("alice").display(), "/liked/alice");
        assert_eq!(routes.like("1", "alice").display(), "/like/1/user/alice");
        assert_eq!(routes.unlike("1", "alice").display(), "/unlike/1/user/alice");
        assert_eq!(
            routes.recommended("alice").display(),
            "/recommendations/alice?top_n=5"
        );
    }

    #[test]
    fn test_legacy_routes() {
        let routes = legacy();
        assert_eq!(routes.liked("alice").display(), "/liked");
        assert_eq!(routes.like("1", "alice").display(), "/like/1");
        assert_eq!(routes.unlike("1", "alice").display(), "/unlike/1");
        assert_eq!(routes.recommended("alice").display(), "/recommended");
    }

    #[test]
    fn test_model_recommendations() {
        let routes = Routes::new(
            RouteStyle::UserScoped,
            RecommendationSource::Model { top_k: 20 },
        );
        assert_eq!(
            routes.recommended("bob").display(),
            "/ml-recommendations/bob?top_k=20"
        );
    }

    #[test]
    fn test_search_and_fixed_routes() {
        let routes = scoped();
        assert_eq!(routes.search("rock").display(), "/search?query=rock");
        assert_eq!(routes.songs().display(), "/songs");
        assert_eq!(routes.login().display(), "/login");
    }
}
