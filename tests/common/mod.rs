#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use axum::{
    Form, Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use discord_connect::{
    models::{AppState, ProviderIdentity, UserRecord},
    services::{
        discord::{AuthCodeExchangeError, IdentityProvider, ProviderFetchError},
        session::SessionService,
        store::{MemoryUserStore, StoreError, UserStore},
    },
    utils::config::DiscordConfig,
};
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::net::TcpListener;

pub const TEST_SESSION_SECRET: &str = "test-session-secret";
pub const TEST_CLIENT_ID: &str = "test-client-id";

pub fn init_tracing_once() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("discord_connect=debug")
            .with_test_writer()
            .try_init();
    });
}

pub fn test_session_service() -> Arc<SessionService> {
    Arc::new(SessionService::from_secret(&SecretString::from(
        TEST_SESSION_SECRET.to_string(),
    )))
}

/// Binds a random localhost port and serves the router on it.
///
/// Returned address format: `http://127.0.0.1:8492`
pub async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port at localhost");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://127.0.0.1:{port}")
}

// ---------------------------------------------------------------------------
// Fake Discord API
// ---------------------------------------------------------------------------

pub fn default_discord_profile() -> Value {
    json!({
        "id": "80351110224678912",
        "username": "nelly",
        "global_name": "Nelly",
        "avatar": "8342729096ea3675442027381ff50dfe"
    })
}

#[derive(Default)]
struct FakeDiscordState {
    valid_codes: Mutex<HashSet<String>>,
    access_tokens: Mutex<HashSet<String>>,
    profile: Mutex<Value>,
    expires_in: Mutex<Value>,
    token_requests: AtomicUsize,
    identity_requests: AtomicUsize,
}

/// A stand-in for the Discord OAuth endpoints.
///
/// Authorization codes are single-use: a code is forgotten the moment it is
/// exchanged, like the real thing.
pub struct FakeDiscord {
    pub address: String,
    state: Arc<FakeDiscordState>,
}

impl FakeDiscord {
    pub async fn spawn() -> Self {
        let state = Arc::new(FakeDiscordState {
            profile: Mutex::new(default_discord_profile()),
            expires_in: Mutex::new(json!(604800)),
            ..Default::default()
        });

        let router = Router::new()
            .route("/oauth2/token", post(fake_token))
            .route("/users/@me", get(fake_me))
            .with_state(Arc::clone(&state));

        Self {
            address: serve(router).await,
            state,
        }
    }

    /// Makes `code` exchangeable exactly once.
    pub fn issue_code(&self, code: &str) {
        self.state.valid_codes.lock().unwrap().insert(code.to_string());
    }

    pub fn set_profile(&self, profile: Value) {
        *self.state.profile.lock().unwrap() = profile;
    }

    /// Overrides the `expires_in` of subsequent token responses.
    pub fn set_expires_in(&self, expires_in: Value) {
        *self.state.expires_in.lock().unwrap() = expires_in;
    }

    pub fn token_requests(&self) -> usize {
        self.state.token_requests.load(Ordering::SeqCst)
    }

    pub fn identity_requests(&self) -> usize {
        self.state.identity_requests.load(Ordering::SeqCst)
    }

    pub fn config(&self) -> DiscordConfig {
        DiscordConfig::new(
            TEST_CLIENT_ID,
            "test-client-secret",
            "http://localhost:8090/discord/success",
        )
        .with_api_base(&self.address)
    }
}

fn oauth_error(status: StatusCode, error: &str, description: &str) -> Response {
    (
        status,
        Json(json!({ "error": error, "error_description": description })),
    )
        .into_response()
}

async fn fake_token(
    State(state): State<Arc<FakeDiscordState>>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    state.token_requests.fetch_add(1, Ordering::SeqCst);

    let has_client_auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("Basic "));
    if !has_client_auth {
        return oauth_error(StatusCode::UNAUTHORIZED, "invalid_client", "Missing client auth");
    }

    if form.get("grant_type").map(String::as_str) != Some("authorization_code") {
        return oauth_error(
            StatusCode::BAD_REQUEST,
            "unsupported_grant_type",
            "Unsupported grant type",
        );
    }

    let code = form.get("code").cloned().unwrap_or_default();
    if !state.valid_codes.lock().unwrap().remove(&code) {
        return oauth_error(
            StatusCode::BAD_REQUEST,
            "invalid_grant",
            "Invalid \"code\" in request.",
        );
    }

    let access_token = format!("access-{code}");
    state
        .access_tokens
        .lock()
        .unwrap()
        .insert(access_token.clone());

    Json(json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "expires_in": state.expires_in.lock().unwrap().clone(),
        "refresh_token": format!("refresh-{code}"),
        "scope": "identify"
    }))
    .into_response()
}

async fn fake_me(State(state): State<Arc<FakeDiscordState>>, headers: HeaderMap) -> Response {
    state.identity_requests.fetch_add(1, Ordering::SeqCst);

    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .unwrap_or_default()
        .to_string();

    if !state.access_tokens.lock().unwrap().contains(&token) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "401: Unauthorized", "code": 0 })),
        )
            .into_response();
    }

    Json(state.profile.lock().unwrap().clone()).into_response()
}

// ---------------------------------------------------------------------------
// Mock identity provider
// ---------------------------------------------------------------------------

pub fn mock_discord_user_info() -> ProviderIdentity {
    ProviderIdentity {
        user_id: "discord123".to_string(),
        username: "discord-fakeuser".to_string(),
        avatar_url:
            "https://cdn.discordapp.com/avatars/discord123/ea8f5f59aff14450e892321ba128745d.png"
                .to_string(),
        refresh_token: Some("fakeRefreshToken".to_string()),
    }
}

/// What the mock exchange answers with
pub enum ExchangeBehavior {
    Succeed(UserRecord),
    Reject(&'static str),
    /// Discord accepted the code but the tokens could not be stored
    StoreFailure,
}

/// What the mock fetch answers with
pub enum FetchBehavior {
    Succeed(ProviderIdentity),
    Reject(&'static str),
}

/// Identity provider recording its calls, for tests that don't care about HTTP.
pub struct MockProvider {
    exchange: ExchangeBehavior,
    fetch: FetchBehavior,
    exchange_calls: Mutex<Vec<(i64, String)>>,
    fetch_calls: Mutex<Vec<i64>>,
}

impl MockProvider {
    pub fn new(exchange: ExchangeBehavior, fetch: FetchBehavior) -> Self {
        Self {
            exchange,
            fetch,
            exchange_calls: Mutex::new(Vec::new()),
            fetch_calls: Mutex::new(Vec::new()),
        }
    }

    /// Exchange and fetch both succeed with the canonical fake identity.
    pub fn succeeding(user_id: i64) -> Self {
        Self::new(
            ExchangeBehavior::Succeed(UserRecord::new(user_id, "")),
            FetchBehavior::Succeed(mock_discord_user_info()),
        )
    }

    pub fn exchange_calls(&self) -> Vec<(i64, String)> {
        self.exchange_calls.lock().unwrap().clone()
    }

    pub fn fetch_calls(&self) -> Vec<i64> {
        self.fetch_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl IdentityProvider for MockProvider {
    fn authorize_url(&self) -> String {
        "https://discord.example/oauth2/authorize?client_id=mock".to_string()
    }

    async fn exchange_code(
        &self,
        user_id: i64,
        code: &str,
    ) -> Result<UserRecord, AuthCodeExchangeError> {
        self.exchange_calls
            .lock()
            .unwrap()
            .push((user_id, code.to_string()));

        match &self.exchange {
            ExchangeBehavior::Succeed(user) => Ok(user.clone()),
            ExchangeBehavior::Reject(reason) => Err(AuthCodeExchangeError::Rejected {
                status: reqwest::StatusCode::BAD_REQUEST,
                reason: reason.to_string(),
            }),
            ExchangeBehavior::StoreFailure => Err(AuthCodeExchangeError::Store(StoreError::Db(
                sqlx::Error::PoolTimedOut,
            ))),
        }
    }

    async fn fetch_identity(
        &self,
        user: &UserRecord,
    ) -> Result<ProviderIdentity, ProviderFetchError> {
        self.fetch_calls.lock().unwrap().push(user.id);

        match &self.fetch {
            FetchBehavior::Succeed(identity) => Ok(identity.clone()),
            FetchBehavior::Reject(reason) => Err(ProviderFetchError::Rejected {
                status: reqwest::StatusCode::UNAUTHORIZED,
                reason: reason.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Application
// ---------------------------------------------------------------------------

pub struct TestApp {
    pub address: String,
    pub store: Arc<MemoryUserStore>,
    pub sessions: Arc<SessionService>,
    pub client: reqwest::Client,
}

impl TestApp {
    /// Creates a user with a live session and returns the session token.
    pub fn login(&self, user_id: i64, username: &str) -> String {
        self.store.insert_user(UserRecord::new(user_id, username));
        let session_id = self.store.create_session(user_id);
        self.sessions
            .issue_token(&session_id)
            .expect("Failed to issue session token")
    }

    /// `GET` with the session cookie set, if any.
    pub async fn get(&self, path: &str, session_token: Option<&str>) -> reqwest::Response {
        let mut request = self.client.get(format!("{}{path}", self.address));
        if let Some(token) = session_token {
            request = request.header(header::COOKIE, format!("session={token}"));
        }
        request.send().await.expect("Failed to execute request")
    }
}

/// Spawns the application wired to the given identity provider.
pub async fn spawn_app_with_provider(provider: Arc<dyn IdentityProvider>) -> TestApp {
    init_tracing_once();

    let store = Arc::new(MemoryUserStore::new());
    let sessions = test_session_service();
    let state = Arc::new(AppState::new(
        Arc::clone(&store) as Arc<dyn UserStore>,
        Arc::clone(&sessions),
        provider,
    ));

    let address = serve(discord_connect::app(state)).await;

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    // Wait for server to be ready
    for _ in 0..10 {
        if client
            .get(format!("{address}/health-check"))
            .send()
            .await
            .is_ok()
        {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    }

    TestApp {
        address,
        store,
        sessions,
        client,
    }
}

/// Spawns the application talking to a fresh fake Discord.
pub async fn spawn_app() -> (TestApp, FakeDiscord) {
    init_tracing_once();

    let discord = FakeDiscord::spawn().await;

    let store = Arc::new(MemoryUserStore::new());
    let sessions = test_session_service();
    let provider = discord_connect::services::discord::DiscordOAuth::new(
        discord.config(),
        Arc::clone(&store) as Arc<dyn UserStore>,
    )
    .expect("Failed to build Discord client");

    let state = Arc::new(AppState::new(
        Arc::clone(&store) as Arc<dyn UserStore>,
        Arc::clone(&sessions),
        Arc::new(provider),
    ));

    let address = serve(discord_connect::app(state)).await;
    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    (
        TestApp {
            address,
            store,
            sessions,
            client,
        },
        discord,
    )
}
