//! Session persistence and the auth holder.
//!
//! The session lives in a small JSON key/value file, written under the key
//! `"username"`. [`AuthContext`] is created once from that file and handed to
//! every page explicitly; pages never read the file themselves.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::config::LoginMode;
use crate::error::{Result, SoundwaveError};
use crate::models::Session;
use crate::pages::Screen;
use crate::source::{LoginReply, TrackSource};

/// Storage key for the username.
pub const USERNAME_KEY: &str = "username";

/// Durable key/value storage for the session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Map<String, Value>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(entries)) => Ok(entries),
            Ok(_) => {
                warn!("Ignoring session file {}: not a JSON object", self.path.display());
                Ok(Map::new())
            }
            Err(e) => {
                warn!("Ignoring unreadable session file {}: {}", self.path.display(), e);
                Ok(Map::new())
            }
        }
    }

    fn write_entries(&self, entries: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(entries)?)?;
        Ok(())
    }

    /// Read the persisted session, if any.
    pub fn load(&self) -> Result<Option<Session>> {
        let entries = self.read_entries()?;
        Ok(entries
            .get(USERNAME_KEY)
            .and_then(Value::as_str)
            .and_then(|name| Session::new(name).ok()))
    }

    /// Persist a session, keeping unrelated keys.
    pub fn save(&self, session: &Session) -> Result<()> {
        let mut entries = self.read_entries()?;
        entries.insert(
            USERNAME_KEY.to_string(),
            Value::String(session.username().to_string()),
        );
        self.write_entries(&entries)
    }

    /// Remove the persisted session.
    pub fn clear(&self) -> Result<()> {
        let mut entries = self.read_entries()?;
        if entries.remove(USERNAME_KEY).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}

/// Holder of the current user.
///
/// Lifecycle is `none -> authenticated -> none`; only [`login`](Self::login)
/// and [`logout`](Self::logout) change it.
#[derive(Debug)]
pub struct AuthContext {
    store: SessionStore,
    login_mode: LoginMode,
    current: Option<Session>,
}

impl AuthContext {
    /// Initialise from the persisted session.
    pub fn restore(store: SessionStore, login_mode: LoginMode) -> Result<Self> {
        let current = store.load()?;
        if let Some(session) = &current {
            info!("Restored session for {}", session.username());
        }
        Ok(Self {
            store,
            login_mode,
            current,
        })
    }

    /// The current session, if logged in.
    pub fn session(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    /// The current session, or `NotAuthenticated`.
    pub fn require(&self) -> Result<&Session> {
        self.current.as_ref().ok_or(SoundwaveError::NotAuthenticated)
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    /// Log in.
    ///
    /// In [`LoginMode::Local`] any non-empty username is accepted without a
    /// request. In [`LoginMode::Remote`] the backend must acknowledge the
    /// login first; on failure nothing is persisted.
    pub async fn login(&mut self, source: &dyn TrackSource, username: &str) -> Result<LoginReply> {
        let session = Session::new(username)?;

        let reply = match self.login_mode {
            LoginMode::Local => LoginReply::default(),
            LoginMode::Remote => source.login(session.username()).await?,
        };

        self.store.save(&session)?;
        info!("Logged in as {}", session.username());
        self.current = Some(session);
        Ok(reply)
    }

    /// Log out and return the screen to show next.
    pub fn logout(&mut self) -> Result<Screen> {
        self.store.clear()?;
        if let Some(session) = self.current.take() {
            info!("Logged out {}", session.username());
        }
        Ok(Screen::Login)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{demo_catalog, MemorySource, SourceCall};

    fn store_in(dir: &tempfile::TempDir) -> SessionStore {
        SessionStore::new(dir.path().join("nested").join("session.json"))
    }

    #[test]
    fn test_store_round_trip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.load().unwrap(), None);

        store.save(&Session::new("alice").unwrap()).unwrap();
        assert_eq!(store.load().unwrap().unwrap().username(), "alice");

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_store_writes_username_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&Session::new("alice").unwrap()).unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["username"], "alice");
    }

    #[test]
    fn test_save_and_clear_keep_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, r#"{"theme": {"dark": true}, "volume": 3}"#).unwrap();
        let store = SessionStore::new(&path);

        store.save(&Session::new("alice").unwrap()).unwrap();
        assert_eq!(store.load().unwrap().unwrap().username(), "alice");
        store.clear().unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["theme"]["dark"], true);
        assert_eq!(value["volume"], 3);
        assert!(value.get("username").is_none());
    }

    #[test]
    fn test_corrupt_store_reads_as_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();
        assert_eq!(SessionStore::new(path).load().unwrap(), None);
    }

    #[tokio::test]
    async fn test_local_login_persists_without_request() {
        let dir = tempfile::tempdir().unwrap();
        let source = MemorySource::new(demo_catalog());
        let mut auth = AuthContext::restore(store_in(&dir), LoginMode::Local).unwrap();

        auth.login(&source, "alice").await.unwrap();
        assert_eq!(auth.require().unwrap().username(), "alice");
        assert!(source.calls().await.is_empty());

        let restored = AuthContext::restore(store_in(&dir), LoginMode::Local).unwrap();
        assert_eq!(restored.session().unwrap().username(), "alice");
    }

    #[tokio::test]
    async fn test_remote_login_failure_keeps_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let source = MemorySource::new(demo_catalog());
        source.set_offline(true).await;
        let mut auth = AuthContext::restore(store_in(&dir), LoginMode::Remote).unwrap();

        assert!(auth.login(&source, "alice").await.is_err());
        assert!(!auth.is_authenticated());
        assert_eq!(store_in(&dir).load().unwrap(), None);
        assert_eq!(source.calls().await, vec![SourceCall::Login("alice".into())]);
    }

    #[tokio::test]
    async fn test_empty_username_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let source = MemorySource::new(demo_catalog());
        let mut auth = AuthContext::restore(store_in(&dir), LoginMode::Remote).unwrap();
        let err = auth.login(&source, "  ").await.unwrap_err();
        assert!(matches!(err, SoundwaveError::InvalidUsername));
        assert!(source.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_logout_clears_and_redirects() {
        let dir = tempfile::tempdir().unwrap();
        let source = MemorySource::new(demo_catalog());
        let mut auth = AuthContext::restore(store_in(&dir), LoginMode::Remote).unwrap();
        auth.login(&source, "alice").await.unwrap();

        assert_eq!(auth.logout().unwrap(), Screen::Login);
        assert!(matches!(auth.require(), Err(SoundwaveError::NotAuthenticated)));
        assert_eq!(store_in(&dir).load().unwrap(), None);
    }
}
