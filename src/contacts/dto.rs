use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::contacts::repo::Contact;

/// Contact-form submission body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContactRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub consultation_type: String,
    #[serde(default)]
    pub message: Option<String>,
    pub confidentiality_accepted: bool,
}

/// Contact request as exposed to clients.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactView {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub consultation_type: String,
    pub message: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub processed: bool,
}

impl From<Contact> for ContactView {
    fn from(contact: Contact) -> Self {
        Self {
            id: contact.id,
            first_name: contact.first_name,
            last_name: contact.last_name,
            email: contact.email,
            phone: contact.phone,
            consultation_type: contact.consultation_type,
            message: contact.message,
            created_at: contact.created_at,
            processed: contact.processed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_serializes_camel_case_with_rfc3339_timestamp() {
        let view = ContactView {
            id: Uuid::new_v4(),
            first_name: "Ana".into(),
            last_name: "Ruiz".into(),
            email: "ana@example.com".into(),
            phone: None,
            consultation_type: "Individual therapy".into(),
            message: Some("First appointment".into()),
            created_at: time::macros::datetime!(2025-08-15 20:13:20 UTC),
            processed: false,
        };

        let json = serde_json::to_string(&view).unwrap();
        assert!(json.contains("consultationType"));
        assert!(json.contains("createdAt"));
        assert!(json.contains("2025-08-15T20:13:20Z"));
    }

    #[test]
    fn request_defaults_optional_fields() {
        let payload = r#"{
            "firstName": "Ana",
            "lastName": "Ruiz",
            "email": "ana@example.com",
            "consultationType": "Individual therapy",
            "confidentialityAccepted": true
        }"#;
        let request: CreateContactRequest = serde_json::from_str(payload).unwrap();
        assert!(request.phone.is_none());
        assert!(request.message.is_none());
        assert!(request.confidentiality_accepted);
    }
}
