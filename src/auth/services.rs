use axum::extract::FromRef;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RegisterRequest},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo::{NewUser, User, ROLE_USER},
    },
    contacts,
    error::{is_unique_violation, ApiError},
    state::AppState,
};

const CONFLICT_MESSAGE: &str = "An account with this email already exists";

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Registration input checks: every required field present and non-empty,
/// confirmation matching when supplied.
pub fn validate_registration(payload: &RegisterRequest) -> Result<(), ApiError> {
    let required = [
        ("firstName", payload.first_name.as_str()),
        ("lastName", payload.last_name.as_str()),
        ("email", payload.email.as_str()),
        ("password", payload.password.as_str()),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(ApiError::Validation(format!("The {field} field is required")));
        }
    }

    if !is_valid_email(payload.email.trim()) {
        return Err(ApiError::Validation("Invalid email".into()));
    }

    if let Some(confirm) = &payload.confirm_password {
        if confirm != &payload.password {
            return Err(ApiError::Validation("Passwords do not match".into()));
        }
    }

    Ok(())
}

/// Validate, create and persist a user, link any waiting contact requests,
/// and issue a token.
pub async fn register(state: &AppState, payload: RegisterRequest) -> Result<AuthResponse, ApiError> {
    validate_registration(&payload)?;
    let email = payload.email.trim().to_lowercase();

    // Advisory pre-check; the unique index below stays authoritative.
    if User::find_by_email(&state.db, &email).await?.is_some() {
        warn!(email = %email, "registration for existing email");
        return Err(ApiError::Conflict(CONFLICT_MESSAGE.into()));
    }

    let hash = hash_password(&payload.password)?;
    let user = User::create(
        &state.db,
        NewUser {
            email,
            password_hash: Some(hash),
            first_name: payload.first_name.trim().to_string(),
            last_name: payload.last_name.trim().to_string(),
            roles: vec![ROLE_USER.to_string()],
            google_id: None,
            is_verified: false,
        },
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::Conflict(CONFLICT_MESSAGE.into())
        } else {
            ApiError::Internal(e.into())
        }
    })?;

    contacts::repo::link_unclaimed(&state.db, user.id, &user.email).await?;

    let token = JwtKeys::from_ref(state).sign(&user)?;
    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(AuthResponse {
        message: Some("Account created successfully".into()),
        token,
        user: PublicUser::from(&user),
    })
}

/// Authenticate email + password. Fails with one uniform message whether the
/// email is unknown or the password is wrong.
pub async fn login(state: &AppState, payload: LoginRequest) -> Result<AuthResponse, ApiError> {
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation("Email and password are required".into()));
    }

    let user = match User::find_by_email(&state.db, &email).await? {
        Some(user) => user,
        None => {
            warn!("login failed: unknown email");
            return Err(ApiError::InvalidCredentials);
        }
    };

    let password_ok = match user.password_hash.as_deref() {
        Some(hash) => verify_password(&payload.password, hash)?,
        // External-identity account without a usable password.
        None => false,
    };
    if !password_ok {
        warn!(user_id = %user.id, "login failed: bad password");
        return Err(ApiError::InvalidCredentials);
    }

    let token = JwtKeys::from_ref(state).sign(&user)?;
    info!(user_id = %user.id, "user logged in");
    Ok(AuthResponse {
        message: None,
        token,
        user: PublicUser::from(&user),
    })
}

/// Fresh public view for the session-restoration path.
pub async fn current_user(state: &AppState, user_id: Uuid) -> Result<PublicUser, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or(ApiError::Unauthenticated)?;
    Ok(PublicUser::from(&user))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_payload() -> RegisterRequest {
        RegisterRequest {
            first_name: "Ana".into(),
            last_name: "Ruiz".into(),
            email: "ana@example.com".into(),
            password: "pw123456".into(),
            confirm_password: Some("pw123456".into()),
        }
    }

    #[test]
    fn accepts_valid_payload() {
        assert!(validate_registration(&valid_payload()).is_ok());
    }

    #[test]
    fn accepts_missing_confirmation() {
        let mut payload = valid_payload();
        payload.confirm_password = None;
        assert!(validate_registration(&payload).is_ok());
    }

    #[test]
    fn rejects_empty_required_fields() {
        for field in ["firstName", "lastName", "email", "password"] {
            let mut payload = valid_payload();
            match field {
                "firstName" => payload.first_name = "  ".into(),
                "lastName" => payload.last_name = String::new(),
                "email" => payload.email = String::new(),
                _ => payload.password = String::new(),
            }
            let err = validate_registration(&payload).unwrap_err();
            assert!(
                matches!(err, ApiError::Validation(ref m) if m.contains(field)),
                "expected validation error naming {field}, got {err:?}"
            );
        }
    }

    #[test]
    fn rejects_mismatched_confirmation() {
        let mut payload = valid_payload();
        payload.confirm_password = Some("different".into());
        let err = validate_registration(&payload).unwrap_err();
        assert!(matches!(err, ApiError::Validation(ref m) if m.contains("match")));
    }

    #[test]
    fn rejects_malformed_email() {
        let mut payload = valid_payload();
        payload.email = "not-an-email".into();
        assert!(validate_registration(&payload).is_err());
    }

    #[test]
    fn email_shape_check() {
        assert!(is_valid_email("ana@example.com"));
        assert!(is_valid_email("a.b+c@sub.example.org"));
        assert!(!is_valid_email("ana@example"));
        assert!(!is_valid_email("ana example.com"));
        assert!(!is_valid_email("@example.com"));
    }
}
