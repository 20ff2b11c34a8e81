use tracing::{debug, warn};
use url::form_urlencoded;

use crate::auth::dto::{LoginRequest, PublicUser, RegisterRequest};
use crate::session::api::{AuthApi, SessionError};
use crate::session::store::CredentialStore;

/// Storage keys for the two durable entries.
pub const TOKEN_KEY: &str = "auth_token";
pub const USER_KEY: &str = "user_data";

/// How the startup identity pass concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Restoration {
    /// Redirect-carried credentials were consumed. The caller must strip the
    /// auth parameters from the visible URL (see [`strip_auth_params`]) so a
    /// reload does not replay this path.
    RedirectCredentials,
    /// A stored token revalidated against the server.
    StoredToken,
    /// The server was unreachable; the cached identity is in effect and the
    /// stored credentials were kept.
    CachedFallback,
    /// No usable credentials.
    Unauthenticated,
}

/// Client-side holder of the current authenticated identity.
///
/// Exactly one restoration pass runs at startup; `login`, `register` and
/// `logout` are the only other mutations. Last write to the store wins — no
/// transactional coordination is attempted.
pub struct SessionContext<S, A> {
    store: S,
    api: A,
    identity: Option<PublicUser>,
}

impl<S: CredentialStore, A: AuthApi> SessionContext<S, A> {
    pub fn new(store: S, api: A) -> Self {
        Self {
            store,
            api,
            identity: None,
        }
    }

    pub fn current_user(&self) -> Option<&PublicUser> {
        self.identity.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub fn token(&self) -> Option<String> {
        self.store.get(TOKEN_KEY)
    }

    /// Startup identity resolution, three paths in strict priority order:
    /// redirect-carried credentials, stored-token revalidation, nothing.
    pub async fn restore(&mut self, query: &str) -> Restoration {
        if let Some((token, user)) = parse_redirect_credentials(query) {
            debug!("restoring session from redirect parameters");
            self.persist(&token, &user);
            self.identity = Some(user);
            return Restoration::RedirectCredentials;
        }

        let Some(token) = self.store.get(TOKEN_KEY) else {
            return Restoration::Unauthenticated;
        };

        match self.api.current_user(&token).await {
            // Prefer the fresh server view over the cached copy.
            Ok(user) => {
                if let Ok(json) = serde_json::to_string(&user) {
                    self.store.set(USER_KEY, &json);
                }
                self.identity = Some(user);
                Restoration::StoredToken
            }
            Err(SessionError::Transport(reason)) => {
                // Connectivity problems do not kill the session.
                warn!(%reason, "revalidation unreachable, falling back to cached identity");
                let cached = self
                    .store
                    .get(USER_KEY)
                    .and_then(|json| serde_json::from_str(&json).ok());
                match cached {
                    Some(user) => {
                        self.identity = Some(user);
                        Restoration::CachedFallback
                    }
                    None => Restoration::Unauthenticated,
                }
            }
            Err(_) => {
                debug!("stored token rejected, clearing credentials");
                self.store.remove(TOKEN_KEY);
                self.store.remove(USER_KEY);
                Restoration::Unauthenticated
            }
        }
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<(), SessionError> {
        let response = self
            .api
            .login(&LoginRequest {
                email: email.into(),
                password: password.into(),
            })
            .await?;
        self.persist(&response.token, &response.user);
        self.identity = Some(response.user);
        Ok(())
    }

    pub async fn register(&mut self, request: &RegisterRequest) -> Result<(), SessionError> {
        let response = self.api.register(request).await?;
        self.persist(&response.token, &response.user);
        self.identity = Some(response.user);
        Ok(())
    }

    /// Clears the stored credentials and the in-memory identity,
    /// unconditionally and without a server round-trip.
    pub fn logout(&mut self) {
        self.store.remove(TOKEN_KEY);
        self.store.remove(USER_KEY);
        self.identity = None;
    }

    fn persist(&self, token: &str, user: &PublicUser) {
        self.store.set(TOKEN_KEY, token);
        if let Ok(json) = serde_json::to_string(user) {
            self.store.set(USER_KEY, &json);
        }
    }
}

/// Decodes `auth_success=1&token=...&user=<base64 JSON>` redirect parameters.
/// Returns None unless all three are present and well-formed.
fn parse_redirect_credentials(query: &str) -> Option<(String, PublicUser)> {
    use base64::Engine;

    let query = query.strip_prefix('?').unwrap_or(query);
    let mut success = false;
    let mut token = None;
    let mut payload = None;
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "auth_success" => success = value == "1",
            "token" => token = Some(value.into_owned()),
            "user" => payload = Some(value.into_owned()),
            _ => {}
        }
    }
    if !success {
        return None;
    }

    let decoded = base64::engine::general_purpose::STANDARD
        .decode(payload?.as_bytes())
        .ok()?;
    let user = serde_json::from_slice::<PublicUser>(&decoded).ok()?;
    Some((token?, user))
}

/// Removes the redirect-credential parameters from a URL so a reload does not
/// replay the restoration. Other query parameters are preserved.
pub fn strip_auth_params(url: &str) -> String {
    let Some((path, query)) = url.split_once('?') else {
        return url.to_string();
    };

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    let mut any = false;
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        if matches!(key.as_ref(), "auth_success" | "token" | "user") {
            continue;
        }
        serializer.append_pair(&key, &value);
        any = true;
    }

    if any {
        format!("{path}?{}", serializer.finish())
    } else {
        path.to_string()
    }
}
