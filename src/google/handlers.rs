use axum::{
    extract::{FromRef, Query, State},
    response::Redirect,
    routing::get,
    Router,
};
use serde::Deserialize;
use tracing::{error, info, instrument, warn};
use url::form_urlencoded;

use crate::{
    auth::{dto::PublicUser, jwt::JwtKeys},
    google::{client::GoogleClient, profile::GoogleProfile, resolve},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/connect/google", get(connect))
        .route("/connect/google/check", get(connect_check))
}

#[derive(Debug, Deserialize)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// Starts the provider redirect.
#[instrument(skip(state))]
async fn connect(State(state): State<AppState>) -> Redirect {
    if state.config.google.client_id.is_empty() {
        warn!("google sign-in requested but not configured");
        return error_redirect(&state, "Sign-in with Google is unavailable");
    }

    let csrf = state.oauth_states.issue();
    let client = GoogleClient::new(&state.http, &state.config.google);
    match client.authorize_url(&csrf) {
        Ok(url) => Redirect::temporary(&url),
        Err(e) => {
            error!(error = %e, "authorize url construction failed");
            error_redirect(&state, "Sign-in with Google is unavailable")
        }
    }
}

/// Completes the exchange. Always answers with a redirect: success hands the
/// token to the client route, any failure lands on the neutral route with a
/// flash parameter.
#[instrument(skip(state, params))]
async fn connect_check(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Redirect {
    let code = match params.code {
        Some(code) if !code.is_empty() => code,
        _ => {
            let reason = params
                .error_description
                .or(params.error)
                .unwrap_or_else(|| "No authorization code received".to_string());
            warn!(reason = %reason, "google callback without authorization code");
            return error_redirect(&state, &format!("OAuth error: {reason}"));
        }
    };

    let state_ok = params
        .state
        .as_deref()
        .map(|s| state.oauth_states.take(s))
        .unwrap_or(false);
    if !state_ok {
        warn!("google callback with unknown or expired state");
        return error_redirect(&state, "OAuth error: invalid state");
    }

    match complete(&state, &code).await {
        Ok(redirect) => redirect,
        Err(e) => {
            error!(error = %e, "google sign-in failed");
            error_redirect(&state, "Error signing in with Google")
        }
    }
}

async fn complete(state: &AppState, code: &str) -> anyhow::Result<Redirect> {
    let client = GoogleClient::new(&state.http, &state.config.google);
    let tokens = client.exchange_code(code).await?;
    let profile: GoogleProfile = client.fetch_profile(&tokens.access_token).await?.into();

    let (user, created) = resolve::resolve(&state.db, &profile).await?;
    info!(user_id = %user.id, created, "google user resolved");

    let token = JwtKeys::from_ref(state).sign(&user)?;
    let url = success_url(
        &state.config.frontend.app_route,
        &token,
        &PublicUser::from(&user),
    )?;
    Ok(Redirect::temporary(&url))
}

/// `/app?auth_success=1&token=...&user=<base64 JSON>` — the transport the
/// client session state decodes on startup.
fn success_url(app_route: &str, token: &str, user: &PublicUser) -> anyhow::Result<String> {
    use base64::Engine;

    let payload = base64::engine::general_purpose::STANDARD.encode(serde_json::to_vec(user)?);
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("auth_success", "1")
        .append_pair("token", token)
        .append_pair("user", &payload)
        .finish();
    Ok(format!("{app_route}?{query}"))
}

fn error_redirect(state: &AppState, message: &str) -> Redirect {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("auth_error", message)
        .finish();
    Redirect::temporary(&format!(
        "{}?{}",
        state.config.frontend.landing_route, query
    ))
}
