use crate::google::client::RawProfile;

/// Normalized external identity used for local resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleProfile {
    pub external_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<RawProfile> for GoogleProfile {
    fn from(raw: RawProfile) -> Self {
        let mut first = raw.given_name.unwrap_or_default();
        let mut last = raw.family_name.unwrap_or_default();

        // Some providers only expose a display name.
        if first.is_empty() && last.is_empty() {
            if let Some(display) = raw.name.as_deref() {
                let mut parts = display.splitn(2, ' ');
                first = parts.next().unwrap_or_default().to_string();
                last = parts.next().unwrap_or_default().to_string();
            }
        }

        // No name at all: fall back to the mailbox name plus a filler surname.
        if first.is_empty() && last.is_empty() {
            first = raw
                .email
                .split('@')
                .next()
                .filter(|s| !s.is_empty())
                .unwrap_or("user")
                .to_string();
            last = "Google".to_string();
        }

        Self {
            external_id: raw.sub,
            email: raw.email.trim().to_lowercase(),
            first_name: first,
            last_name: last,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(
        given: Option<&str>,
        family: Option<&str>,
        name: Option<&str>,
        email: &str,
    ) -> RawProfile {
        RawProfile {
            sub: "g-123".into(),
            email: email.into(),
            given_name: given.map(Into::into),
            family_name: family.map(Into::into),
            name: name.map(Into::into),
            picture: None,
        }
    }

    #[test]
    fn prefers_structured_names() {
        let profile = GoogleProfile::from(raw(
            Some("Ana"),
            Some("Ruiz"),
            Some("Somebody Else"),
            "ana@example.com",
        ));
        assert_eq!(profile.first_name, "Ana");
        assert_eq!(profile.last_name, "Ruiz");
    }

    #[test]
    fn splits_display_name_on_first_space() {
        let profile =
            GoogleProfile::from(raw(None, None, Some("Ana Ruiz Pérez"), "ana@example.com"));
        assert_eq!(profile.first_name, "Ana");
        assert_eq!(profile.last_name, "Ruiz Pérez");
    }

    #[test]
    fn single_word_display_name_leaves_last_name_empty() {
        let profile = GoogleProfile::from(raw(None, None, Some("Ana"), "ana@example.com"));
        assert_eq!(profile.first_name, "Ana");
        assert_eq!(profile.last_name, "");
    }

    #[test]
    fn falls_back_to_mailbox_name() {
        let profile = GoogleProfile::from(raw(None, None, None, "Ana.Ruiz@Example.com"));
        assert_eq!(profile.first_name, "Ana.Ruiz");
        assert_eq!(profile.last_name, "Google");
        assert_eq!(profile.email, "ana.ruiz@example.com");
    }

    #[test]
    fn partial_structured_name_is_kept() {
        let profile = GoogleProfile::from(raw(Some("Ana"), None, None, "ana@example.com"));
        assert_eq!(profile.first_name, "Ana");
        assert_eq!(profile.last_name, "");
    }
}
