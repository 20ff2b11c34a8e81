use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        jwt::AuthUser,
        repo::{User, ROLE_ADMIN},
        services::is_valid_email,
    },
    contacts::{
        dto::{ContactView, CreateContactRequest},
        repo::{self, NewContact},
    },
    error::ApiError,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/contacts", post(create_contact))
        .route("/me/contacts", get(my_contacts))
        .route("/admin/contacts", get(admin_contacts))
}

fn validate_contact(payload: &CreateContactRequest) -> Result<(), ApiError> {
    let required = [
        ("firstName", payload.first_name.as_str()),
        ("lastName", payload.last_name.as_str()),
        ("email", payload.email.as_str()),
        ("consultationType", payload.consultation_type.as_str()),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(ApiError::Validation(format!("The {field} field is required")));
        }
    }
    if !is_valid_email(payload.email.trim()) {
        return Err(ApiError::Validation("Invalid email".into()));
    }
    if !payload.confidentiality_accepted {
        return Err(ApiError::Validation(
            "You must accept the confidentiality policy".into(),
        ));
    }
    Ok(())
}

/// Public contact-form submission. Linked to an existing account at creation
/// time when the sender's email already has one.
#[instrument(skip(state, payload))]
async fn create_contact(
    State(state): State<AppState>,
    Json(payload): Json<CreateContactRequest>,
) -> Result<(StatusCode, Json<ContactView>), ApiError> {
    validate_contact(&payload)?;
    let email = payload.email.trim().to_lowercase();

    let owner = User::find_by_email(&state.db, &email).await?;

    let contact = repo::create(
        &state.db,
        NewContact {
            first_name: payload.first_name.trim().to_string(),
            last_name: payload.last_name.trim().to_string(),
            email,
            phone: payload.phone,
            consultation_type: payload.consultation_type,
            message: payload.message,
            confidentiality_accepted: payload.confidentiality_accepted,
            user_id: owner.map(|u| u.id),
        },
    )
    .await?;

    info!(contact_id = %contact.id, linked = contact.user_id.is_some(), "contact request created");
    Ok((StatusCode::CREATED, Json(contact.into())))
}

/// Contact requests belonging to the caller, newest first.
#[instrument(skip(state, auth))]
async fn my_contacts(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<ContactView>>, ApiError> {
    let user = User::find_by_id(&state.db, auth.id)
        .await?
        .ok_or(ApiError::Unauthenticated)?;

    let contacts = repo::list_for_user(&state.db, user.id, &user.email).await?;
    Ok(Json(contacts.into_iter().map(Into::into).collect()))
}

#[derive(Debug, Deserialize)]
struct AdminContactsQuery {
    #[serde(default)]
    processed: Option<bool>,
}

/// Admin inbox: every contact request, optionally filtered on the processed
/// flag.
#[instrument(skip(state, auth))]
async fn admin_contacts(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<AdminContactsQuery>,
) -> Result<Json<Vec<ContactView>>, ApiError> {
    if !auth.has_role(ROLE_ADMIN) {
        warn!(user_id = %auth.id, "admin contacts requested without admin role");
        return Err(ApiError::Forbidden);
    }

    let contacts = repo::list_all(&state.db, query.processed).await?;
    Ok(Json(contacts.into_iter().map(Into::into).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_payload() -> CreateContactRequest {
        CreateContactRequest {
            first_name: "Ana".into(),
            last_name: "Ruiz".into(),
            email: "ana@example.com".into(),
            phone: None,
            consultation_type: "Individual therapy".into(),
            message: None,
            confidentiality_accepted: true,
        }
    }

    #[test]
    fn accepts_valid_submission() {
        assert!(validate_contact(&valid_payload()).is_ok());
    }

    #[test]
    fn rejects_missing_required_fields() {
        let mut payload = valid_payload();
        payload.consultation_type = String::new();
        let err = validate_contact(&payload).unwrap_err();
        assert!(matches!(err, ApiError::Validation(ref m) if m.contains("consultationType")));
    }

    #[test]
    fn rejects_declined_confidentiality() {
        let mut payload = valid_payload();
        payload.confidentiality_accepted = false;
        let err = validate_contact(&payload).unwrap_err();
        assert!(matches!(err, ApiError::Validation(ref m) if m.contains("confidentiality")));
    }
}
