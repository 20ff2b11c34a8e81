use async_trait::async_trait;
use thiserror::Error;

use crate::auth::dto::{AuthResponse, LoginRequest, PublicUser, RegisterRequest};

/// Failures surfaced by the auth API seam.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The server refused the request; `message` is safe to show the user.
    #[error("{message}")]
    Rejected { message: String },

    /// The presented token is no longer accepted. The session context clears
    /// stored credentials on this.
    #[error("not authenticated")]
    Unauthorized,

    /// The server could not be reached. Not fatal to an existing session;
    /// the context falls back to the cached identity.
    #[error("network error: {0}")]
    Transport(String),
}

/// The server-side operations the session context depends on.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn current_user(&self, token: &str) -> Result<PublicUser, SessionError>;
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, SessionError>;
    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, SessionError>;
}

/// HTTP implementation against the backend's /api surface.
pub struct HttpAuthApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAuthApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    async fn read_message(resp: reqwest::Response) -> Option<String> {
        #[derive(serde::Deserialize)]
        struct Body {
            message: String,
        }
        resp.json::<Body>().await.ok().map(|b| b.message)
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn current_user(&self, token: &str) -> Result<PublicUser, SessionError> {
        let resp = self
            .http
            .get(format!("{}/api/me", self.base_url))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            // Any explicit refusal means the token is dead for our purposes.
            return Err(SessionError::Unauthorized);
        }
        resp.json()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))
    }

    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, SessionError> {
        let resp = self
            .http
            .post(format!("{}/api/login", self.base_url))
            .json(request)
            .send()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let message = Self::read_message(resp)
                .await
                .unwrap_or_else(|| format!("Login failed (HTTP {status})"));
            return Err(SessionError::Rejected { message });
        }
        resp.json()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, SessionError> {
        let resp = self
            .http
            .post(format!("{}/api/register", self.base_url))
            .json(request)
            .send()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let message = Self::read_message(resp)
                .await
                .unwrap_or_else(|| format!("Registration failed (HTTP {status})"));
            return Err(SessionError::Rejected { message });
        }
        resp.json()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))
    }
}
