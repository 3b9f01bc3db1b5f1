use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use soundwave::{
    AckOutcome, AuthContext, ClientConfig, DashboardPage, DashboardSection, LikedPage, LoadState,
    LoginMode, MusicApi, PageContext, PageOutcome, RouteStyle, SearchPage, Session, SessionStore,
    SoundwaveError, TrackSource,
};

type ApiError = (StatusCode, Json<Value>);

#[derive(Clone, Default)]
struct Backend {
    users: Arc<Mutex<HashSet<String>>>,
    likes: Arc<Mutex<HashMap<String, HashSet<u64>>>>,
}

fn record(id: u64, title: &str, artist: &str) -> Value {
    json!({
        "id": id as f64,
        "title": title,
        "link": format!("https://www.deezer.com/track/{}", id),
        "duration": 200,
        "preview": "",
        "position": null,
        "rank": 1000.0,
        "explicit_lyrics": false,
        "album_id": 10.0,
        "album_title": "Album",
        "album_cover": format!("https://cdn/{}.jpg", id),
        "artist_id": 5.0,
        "artist_name": artist
    })
}

fn catalog() -> Vec<Value> {
    vec![
        record(1, "Harder, Better, Faster, Stronger", "Daft Punk"),
        record(2, "One More Time", "Daft Punk"),
        record(3, "Windowlicker", "Aphex Twin"),
    ]
}

fn not_found(detail: &str) -> ApiError {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": detail })))
}

fn records_for(ids: &HashSet<u64>) -> Vec<Value> {
    catalog()
        .into_iter()
        .filter(|r| ids.contains(&(r["id"].as_f64().unwrap() as u64)))
        .collect()
}

async fn songs() -> Json<Value> {
    Json(Value::Array(catalog()))
}

async fn slow_songs() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(2)).await;
    Json(Value::Array(catalog()))
}

async fn search(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let query = params.get("query").cloned().unwrap_or_default().to_lowercase();
    let found: Vec<Value> = catalog()
        .into_iter()
        .filter(|r| {
            r["title"].as_str().unwrap().to_lowercase().contains(&query)
                || r["artist_name"].as_str().unwrap().to_lowercase().contains(&query)
        })
        .collect();
    Json(Value::Array(found))
}

async fn login(State(backend): State<Backend>, Json(body): Json<Value>) -> Json<Value> {
    let username = body["username"].as_str().unwrap_or_default().to_string();
    let created = backend.users.lock().unwrap().insert(username.clone());
    let message = if created {
        format!("New user created: {}", username)
    } else {
        format!("Welcome back, {}!", username)
    };
    Json(json!({ "message": message }))
}

async fn liked(State(backend): State<Backend>, Path(username): Path<String>) -> Json<Value> {
    let likes = backend.likes.lock().unwrap();
    let ids = likes.get(&username).cloned().unwrap_or_default();
    Json(Value::Array(records_for(&ids)))
}

async fn recommendations(
    State(backend): State<Backend>,
    Path(username): Path<String>,
) -> Json<Value> {
    let likes = backend.likes.lock().unwrap();
    let own = likes.get(&username).cloned().unwrap_or_default();
    let others: HashSet<u64> = likes
        .iter()
        .filter(|(user, _)| **user != username)
        .flat_map(|(_, ids)| ids.iter().copied())
        .filter(|id| !own.contains(id))
        .collect();
    Json(Value::Array(records_for(&others)))
}

async fn like(
    State(backend): State<Backend>,
    Path((id, username)): Path<(u64, String)>,
) -> Result<Json<Value>, ApiError> {
    let known_song = catalog().iter().any(|r| r["id"].as_f64() == Some(id as f64));
    if !backend.users.lock().unwrap().contains(&username) || !known_song {
        return Err(not_found("User or Song not found"));
    }
    backend
        .likes
        .lock()
        .unwrap()
        .entry(username.clone())
        .or_default()
        .insert(id);
    Ok(Json(json!({ "message": format!("Song {} liked by {}", id, username) })))
}

async fn unlike(
    State(backend): State<Backend>,
    Path((id, username)): Path<(u64, String)>,
) -> Result<Json<Value>, ApiError> {
    if !backend.users.lock().unwrap().contains(&username) {
        return Err(not_found("User not found"));
    }
    if let Some(ids) = backend.likes.lock().unwrap().get_mut(&username) {
        ids.remove(&id);
    }
    Ok(Json(json!({ "message": format!("Song {} unliked by {}", id, username) })))
}

async fn legacy_like(State(backend): State<Backend>, Path(id): Path<u64>) -> StatusCode {
    backend
        .likes
        .lock()
        .unwrap()
        .entry("anonymous".to_string())
        .or_default()
        .insert(id);
    StatusCode::OK
}

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn spawn_backend(backend: Backend) -> String {
    let app = Router::new()
        .route("/songs", get(songs))
        .route("/search", get(search))
        .route("/login", post(login))
        .route("/liked/:username", get(liked))
        .route("/recommendations/:username", get(recommendations))
        .route("/like/:id/user/:username", post(like))
        .route("/unlike/:id/user/:username", post(unlike))
        .route("/like/:id", post(legacy_like))
        .with_state(backend);
    spawn(app).await
}

struct Harness {
    _dir: tempfile::TempDir,
    api: Arc<MusicApi>,
    auth: AuthContext,
}

async fn harness(backend: Backend) -> Harness {
    let base = spawn_backend(backend).await;
    let dir = tempfile::tempdir().unwrap();
    let config = ClientConfig::new(base)
        .with_timeout(Duration::from_secs(5))
        .with_session_path(dir.path().join("session.json"));
    let api = Arc::new(MusicApi::new(config.clone()).unwrap());
    let auth =
        AuthContext::restore(SessionStore::new(&config.session_path), LoginMode::Remote).unwrap();
    Harness {
        _dir: dir,
        api,
        auth,
    }
}

#[tokio::test]
async fn remote_login_persists_session() {
    let mut h = harness(Backend::default()).await;
    let reply = h.auth.login(h.api.as_ref(), "alice").await.unwrap();
    assert_eq!(reply.message, "New user created: alice");

    let again = h.auth.login(h.api.as_ref(), "alice").await.unwrap();
    assert_eq!(again.message, "Welcome back, alice!");
    assert_eq!(h.auth.require().unwrap().username(), "alice");
}

#[tokio::test]
async fn dashboard_like_flow() {
    let backend = Backend::default();
    let mut h = harness(backend.clone()).await;
    h.auth.login(h.api.as_ref(), "alice").await.unwrap();
    backend
        .likes
        .lock()
        .unwrap()
        .insert("alice".to_string(), [2].into_iter().collect());

    let mut page = DashboardPage::new(PageContext::new(h.api.clone()));
    assert_eq!(page.load(&h.auth).await, PageOutcome::Ready);

    let all = page.section(DashboardSection::All);
    assert_eq!(all.len(), 3);
    assert!(!all.get("1").unwrap().is_liked());
    assert!(all.get("2").unwrap().is_liked());
    assert_eq!(all.get("1").unwrap().track().artist, "Daft Punk");

    let outcome = page.toggle_like(DashboardSection::All, "1").await.unwrap();
    assert_eq!(outcome, AckOutcome::Applied);
    assert!(page.section(DashboardSection::All).get("1").unwrap().is_liked());
    assert!(page.section(DashboardSection::All).get("2").unwrap().is_liked());
    assert!(backend.likes.lock().unwrap()["alice"].contains(&1));
}

#[tokio::test]
async fn like_rejected_by_backend_reverts() {
    let mut h = harness(Backend::default()).await;
    // Local login: the backend never hears about this user.
    h.auth = AuthContext::restore(
        SessionStore::new(h._dir.path().join("other.json")),
        LoginMode::Local,
    )
    .unwrap();
    h.auth.login(h.api.as_ref(), "ghost").await.unwrap();

    let mut page = DashboardPage::new(PageContext::new(h.api.clone()));
    page.load(&h.auth).await;
    let outcome = page.toggle_like(DashboardSection::All, "3").await.unwrap();
    assert_eq!(outcome, AckOutcome::Reverted);
    assert!(!page.section(DashboardSection::All).get("3").unwrap().is_liked());
}

#[tokio::test]
async fn server_error_carries_detail() {
    let h = harness(Backend::default()).await;
    let session = Session::new("nobody").unwrap();
    let err = h.api.like("1", &session).await.unwrap_err();
    match err {
        SoundwaveError::Server { status, detail } => {
            assert_eq!(status, 404);
            assert_eq!(detail, "User or Song not found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn liked_page_unlike_removes_row() {
    let backend = Backend::default();
    let mut h = harness(backend.clone()).await;
    h.auth.login(h.api.as_ref(), "alice").await.unwrap();
    backend
        .likes
        .lock()
        .unwrap()
        .insert("alice".to_string(), [1, 3].into_iter().collect());

    let mut page = LikedPage::new(PageContext::new(h.api.clone()));
    assert_eq!(page.load(&h.auth).await, PageOutcome::Ready);
    assert_eq!(page.tracks().len(), 2);
    assert!(page.tracks().tracks().all(|t| t.liked));

    assert_eq!(page.toggle_like("3").await.unwrap(), AckOutcome::Removed);
    assert_eq!(page.tracks().len(), 1);
    assert!(!backend.likes.lock().unwrap()["alice"].contains(&3));
}

#[tokio::test]
async fn search_without_matches_is_empty_state() {
    let mut h = harness(Backend::default()).await;
    h.auth.login(h.api.as_ref(), "alice").await.unwrap();

    let mut page = SearchPage::new(PageContext::new(h.api.clone()));
    assert_eq!(page.search(&h.auth, "daft").await, PageOutcome::Ready);
    assert_eq!(page.results().len(), 2);

    assert_eq!(page.search(&h.auth, "polka").await, PageOutcome::Ready);
    assert!(page.is_empty_result());
    assert_eq!(page.state(), &LoadState::Ready);
}

#[tokio::test]
async fn recommendations_come_from_other_users() {
    let backend = Backend::default();
    let mut h = harness(backend.clone()).await;
    h.auth.login(h.api.as_ref(), "alice").await.unwrap();
    {
        let mut likes = backend.likes.lock().unwrap();
        likes.insert("alice".to_string(), [1].into_iter().collect());
        likes.insert("bob".to_string(), [1, 3].into_iter().collect());
    }

    let session = h.auth.require().unwrap().clone();
    let recommended = h.api.fetch_recommended(&session).await.unwrap();
    let ids: Vec<&str> = recommended.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["3"]);
}

#[tokio::test]
async fn timeout_surfaces_as_network_error() {
    let base = spawn(Router::new().route("/songs", get(slow_songs))).await;
    let api = MusicApi::new(ClientConfig::new(base).with_timeout(Duration::from_millis(200))).unwrap();
    let err = api.fetch_all().await.unwrap_err();
    assert!(matches!(err, SoundwaveError::Network(_)));
}

#[tokio::test]
async fn legacy_routes_omit_username() {
    let backend = Backend::default();
    let base = spawn_backend(backend.clone()).await;
    let api = MusicApi::new(ClientConfig::new(base).with_routes(RouteStyle::Legacy)).unwrap();

    api.like("2", &Session::new("alice").unwrap()).await.unwrap();
    assert!(backend.likes.lock().unwrap()["anonymous"].contains(&2));
}
