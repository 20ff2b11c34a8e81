use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::config::GoogleConfig;

/// Failures talking to the identity provider. The callback handler absorbs
/// these into a redirect-with-flash; they never surface as raw error pages.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("token exchange rejected: HTTP {status}: {body}")]
    Exchange {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("userinfo request rejected: HTTP {status}")]
    UserInfo { status: reqwest::StatusCode },
}

/// Response from the provider's token endpoint.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: Option<String>,
    pub expires_in: Option<i64>,
    pub id_token: Option<String>,
    pub scope: Option<String>,
}

/// Raw profile as returned by the OpenID userinfo endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RawProfile {
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

/// Thin OAuth client over the shared (timeout-bounded) HTTP client.
pub struct GoogleClient<'a> {
    http: &'a reqwest::Client,
    config: &'a GoogleConfig,
}

impl<'a> GoogleClient<'a> {
    pub fn new(http: &'a reqwest::Client, config: &'a GoogleConfig) -> Self {
        Self { http, config }
    }

    /// Authorization endpoint URL the browser is sent to.
    pub fn authorize_url(&self, state: &str) -> anyhow::Result<String> {
        let mut url = Url::parse(&self.config.auth_url)?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", "openid email profile")
            .append_pair("state", state);
        Ok(url.to_string())
    }

    /// Exchange an authorization code for provider tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, ProviderError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];

        let resp = self
            .http
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Exchange { status, body });
        }

        Ok(resp.json::<TokenResponse>().await?)
    }

    /// Fetch the OpenID profile for an access token.
    pub async fn fetch_profile(&self, access_token: &str) -> Result<RawProfile, ProviderError> {
        let resp = self
            .http
            .get(&self.config.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ProviderError::UserInfo {
                status: resp.status(),
            });
        }

        Ok(resp.json::<RawProfile>().await?)
    }
}
