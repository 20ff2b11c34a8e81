use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    /// Upper bound on the code-exchange and userinfo calls; an unbounded hang
    /// there would stall the whole login redirect.
    pub http_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FrontendConfig {
    /// Client route that receives the token after an external login.
    pub app_route: String,
    /// Neutral route that receives `auth_error` flashes.
    pub landing_route: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub google: GoogleConfig,
    pub frontend: FrontendConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "praxis".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "praxis-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
        };
        let google = GoogleConfig {
            client_id: std::env::var("GOOGLE_CLIENT_ID").unwrap_or_default(),
            client_secret: std::env::var("GOOGLE_CLIENT_SECRET").unwrap_or_default(),
            redirect_uri: std::env::var("GOOGLE_REDIRECT_URI")
                .unwrap_or_else(|_| "http://localhost:8080/connect/google/check".into()),
            auth_url: std::env::var("GOOGLE_AUTH_URL")
                .unwrap_or_else(|_| "https://accounts.google.com/o/oauth2/v2/auth".into()),
            token_url: std::env::var("GOOGLE_TOKEN_URL")
                .unwrap_or_else(|_| "https://oauth2.googleapis.com/token".into()),
            userinfo_url: std::env::var("GOOGLE_USERINFO_URL")
                .unwrap_or_else(|_| "https://openidconnect.googleapis.com/v1/userinfo".into()),
            http_timeout_secs: std::env::var("OAUTH_HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(10),
        };
        let frontend = FrontendConfig {
            app_route: std::env::var("FRONTEND_APP_ROUTE").unwrap_or_else(|_| "/app".into()),
            landing_route: std::env::var("FRONTEND_LANDING_ROUTE").unwrap_or_else(|_| "/".into()),
        };
        Ok(Self {
            database_url,
            jwt,
            google,
            frontend,
        })
    }
}
