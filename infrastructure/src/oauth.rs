//! Installed-app OAuth for Drive: reuse or refresh the saved token, otherwise run
//! a one-shot loopback consent flow. The token file is plain JSON.

use crate::config::Config;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use domain::errors::RagError;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

pub const DRIVE_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/drive.readonly";

/// Tokens this close to expiry are refreshed instead of reused.
const EXPIRY_MARGIN_SECS: u64 = 60;

#[derive(Clone)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,
    pub auth_uri: String,
    pub token_uri: String,
}

#[derive(Deserialize)]
struct ClientSecretFile {
    installed: Option<ClientSecret>,
    web: Option<ClientSecret>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Unix seconds.
    pub expires_at: u64,
}

impl StoredToken {
    pub fn is_fresh(&self, now: u64) -> bool {
        self.expires_at > now.saturating_add(EXPIRY_MARGIN_SECS)
    }

    /// Google omits the refresh token on refresh responses; keep the previous one.
    fn from_response(response: TokenResponse, now: u64, previous_refresh: Option<String>) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token.or(previous_refresh),
            expires_at: now.saturating_add(response.expires_in.unwrap_or(3600)),
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<u64>,
    refresh_token: Option<String>,
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn auth_error(context: &str, err: impl fmt::Display) -> RagError {
    RagError::Authentication(format!("{context}: {err}"))
}

pub fn load_client_secret(path: &Path) -> Result<ClientSecret, RagError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| auth_error(&format!("cannot read client secret {}", path.display()), e))?;
    let file: ClientSecretFile =
        serde_json::from_str(&raw).map_err(|e| auth_error("invalid client secret file", e))?;
    file.installed.or(file.web).ok_or_else(|| {
        RagError::Authentication("client secret has no `installed` or `web` section".to_string())
    })
}

pub fn authorization_url(
    secret: &ClientSecret,
    redirect_uri: &str,
    state: &str,
) -> Result<Url, RagError> {
    Url::parse_with_params(
        &secret.auth_uri,
        &[
            ("client_id", secret.client_id.as_str()),
            ("redirect_uri", redirect_uri),
            ("response_type", "code"),
            ("scope", DRIVE_READONLY_SCOPE),
            ("access_type", "offline"),
            // Always show the account chooser and consent screen.
            ("prompt", "consent select_account"),
            ("state", state),
        ],
    )
    .map_err(|e| auth_error("invalid auth_uri", e))
}

#[derive(Debug, Default, Deserialize)]
pub struct Redirect {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

pub fn redirect_code(redirect: Redirect, expected_state: &str) -> Result<String, RagError> {
    if let Some(error) = redirect.error {
        return Err(RagError::Authentication(format!(
            "consent was not granted: {error}"
        )));
    }
    if redirect.state.as_deref() != Some(expected_state) {
        return Err(RagError::Authentication(
            "state mismatch in OAuth redirect".to_string(),
        ));
    }
    redirect
        .code
        .ok_or_else(|| RagError::Authentication("redirect carried no code".to_string()))
}

#[derive(Clone)]
struct RedirectState {
    expected_state: Arc<str>,
    outcomes: mpsc::Sender<Result<String, RagError>>,
}

async fn handle_redirect(
    State(app): State<RedirectState>,
    Query(redirect): Query<Redirect>,
) -> (StatusCode, &'static str) {
    let outcome = redirect_code(redirect, &app.expected_state);
    let reply = if outcome.is_ok() {
        (
            StatusCode::OK,
            "Signed in. You can close this window and return to the terminal.",
        )
    } else {
        (
            StatusCode::BAD_REQUEST,
            "Sign-in failed. Return to the terminal for details.",
        )
    };
    // Only the first redirect counts.
    let _ = app.outcomes.try_send(outcome);
    reply
}

/// Serves `GET /` on `listener` until the first redirect arrives, then shuts
/// the server down and returns its authorization code.
pub async fn await_redirect(listener: TcpListener, expected_state: &str) -> Result<String, RagError> {
    let (outcomes, mut received) = mpsc::channel(1);
    let app = Router::new()
        .route("/", get(handle_redirect))
        .with_state(RedirectState {
            expected_state: Arc::from(expected_state),
            outcomes,
        });

    let (stop, stopped) = oneshot::channel::<()>();
    tokio::spawn(async move {
        let shutdown = async {
            let _ = stopped.await;
        };
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
        {
            tracing::error!(error = %e, "OAuth redirect server failed");
        }
    });

    let outcome = received.recv().await.unwrap_or_else(|| {
        Err(RagError::Authentication(
            "redirect server stopped before sign-in completed".to_string(),
        ))
    });
    let _ = stop.send(());
    outcome
}

pub struct OAuthFlow {
    client: Client,
    secret_path: PathBuf,
    token_path: PathBuf,
}

impl OAuthFlow {
    pub fn new(secret_path: impl Into<PathBuf>, token_path: impl Into<PathBuf>) -> Self {
        Self {
            client: Client::new(),
            secret_path: secret_path.into(),
            token_path: token_path.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.client_secret_path, &config.token_path)
    }

    pub fn token_path(&self) -> &Path {
        &self.token_path
    }

    pub async fn authorize(&self) -> Result<AccessToken, RagError> {
        let stored = self.load_token();
        let now = now_unix();

        if let Some(token) = stored.as_ref().filter(|t| t.is_fresh(now)) {
            tracing::debug!("reusing saved access token");
            return Ok(AccessToken::new(token.access_token.clone()));
        }

        let secret = load_client_secret(&self.secret_path)?;

        if let Some(refresh_token) = stored.and_then(|t| t.refresh_token) {
            match self.refresh(&secret, refresh_token).await {
                Ok(token) => {
                    self.save_token(&token)?;
                    tracing::info!("access token refreshed");
                    return Ok(AccessToken::new(token.access_token));
                }
                Err(err) => {
                    tracing::warn!(error = %err, "token refresh failed; asking for consent again");
                }
            }
        }

        let token = self.consent(&secret).await?;
        self.save_token(&token)?;
        tracing::info!(path = %self.token_path.display(), "login saved");
        Ok(AccessToken::new(token.access_token))
    }

    pub fn forget(&self) -> Result<(), RagError> {
        match std::fs::remove_file(&self.token_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn load_token(&self) -> Option<StoredToken> {
        let raw = std::fs::read_to_string(&self.token_path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(token) => Some(token),
            Err(err) => {
                tracing::warn!(error = %err, "ignoring unreadable token file");
                None
            }
        }
    }

    pub fn save_token(&self, token: &StoredToken) -> Result<(), RagError> {
        if let Some(parent) = self.token_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(token)
            .map_err(|e| auth_error("cannot serialize token", e))?;
        std::fs::write(&self.token_path, json)?;
        Ok(())
    }

    async fn refresh(
        &self,
        secret: &ClientSecret,
        refresh_token: String,
    ) -> Result<StoredToken, RagError> {
        let response = self
            .token_request(
                secret,
                &[
                    ("client_id", secret.client_id.as_str()),
                    ("client_secret", secret.client_secret.as_str()),
                    ("refresh_token", refresh_token.as_str()),
                    ("grant_type", "refresh_token"),
                ],
            )
            .await?;
        Ok(StoredToken::from_response(response, now_unix(), Some(refresh_token)))
    }

    async fn consent(&self, secret: &ClientSecret) -> Result<StoredToken, RagError> {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
        let redirect_uri = format!("http://127.0.0.1:{}", listener.local_addr()?.port());
        let state = Uuid::new_v4().simple().to_string();
        let url = authorization_url(secret, &redirect_uri, &state)?;

        eprintln!("Open this URL in your browser to sign in to Google Drive:\n\n{url}\n");
        tracing::info!(%redirect_uri, "waiting for OAuth redirect");

        let code = await_redirect(listener, &state).await?;

        let response = self
            .token_request(
                secret,
                &[
                    ("code", code.as_str()),
                    ("client_id", secret.client_id.as_str()),
                    ("client_secret", secret.client_secret.as_str()),
                    ("redirect_uri", redirect_uri.as_str()),
                    ("grant_type", "authorization_code"),
                ],
            )
            .await?;
        Ok(StoredToken::from_response(response, now_unix(), None))
    }

    async fn token_request(
        &self,
        secret: &ClientSecret,
        form: &[(&str, &str)],
    ) -> Result<TokenResponse, RagError> {
        let response = self
            .client
            .post(&secret.token_uri)
            .form(form)
            .send()
            .await
            .map_err(|e| auth_error("token endpoint unreachable", e))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RagError::Authentication(format!(
                "token endpoint returned {status}: {body}"
            )));
        }
        response
            .json()
            .await
            .map_err(|e| auth_error("invalid token response", e))
    }
}
