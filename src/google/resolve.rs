use sqlx::PgPool;
use tracing::info;

use crate::auth::password::unusable_placeholder;
use crate::auth::repo::{NewUser, User, ROLE_USER};
use crate::contacts;
use crate::google::profile::GoogleProfile;

/// What the bridge should do for an incoming external profile.
#[derive(Debug)]
pub enum Resolution {
    /// A user already carries this external id.
    Existing(User),
    /// An email-matched local account gets the external id attached.
    Link(User),
    /// No match at all; a fresh account is created.
    Create,
}

/// Resolution precedence: external id first, then email linkage, then a new
/// account. Kept pure so the precedence itself is testable.
pub fn plan(by_external_id: Option<User>, by_email: Option<User>) -> Resolution {
    match (by_external_id, by_email) {
        (Some(user), _) => Resolution::Existing(user),
        (None, Some(user)) => Resolution::Link(user),
        (None, None) => Resolution::Create,
    }
}

/// Find-or-create the local account for an external profile. Returns the
/// user and whether this call created it.
pub async fn resolve(db: &PgPool, profile: &GoogleProfile) -> anyhow::Result<(User, bool)> {
    let by_external = User::find_by_google_id(db, &profile.external_id).await?;
    let by_email = match &by_external {
        Some(_) => None,
        None => User::find_by_email(db, &profile.email).await?,
    };

    match plan(by_external, by_email) {
        Resolution::Existing(user) => Ok((user, false)),
        Resolution::Link(user) => {
            let user = User::link_google_id(db, user.id, &profile.external_id).await?;
            info!(user_id = %user.id, "external identity linked to existing account");
            Ok((user, false))
        }
        Resolution::Create => {
            let placeholder = unusable_placeholder()?;
            let user = User::create(
                db,
                NewUser {
                    email: profile.email.clone(),
                    password_hash: Some(placeholder),
                    first_name: profile.first_name.clone(),
                    last_name: profile.last_name.clone(),
                    roles: vec![ROLE_USER.to_string()],
                    google_id: Some(profile.external_id.clone()),
                    is_verified: true,
                },
            )
            .await?;
            contacts::repo::link_unclaimed(db, user.id, &user.email).await?;
            info!(user_id = %user.id, "user created from external identity");
            Ok((user, true))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn user(email: &str, google_id: Option<&str>) -> User {
        User {
            id: Uuid::new_v4(),
            email: email.into(),
            password_hash: Some("hash".into()),
            first_name: "Ana".into(),
            last_name: "Ruiz".into(),
            roles: vec![ROLE_USER.to_string()],
            google_id: google_id.map(Into::into),
            is_verified: false,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn external_id_match_wins_over_email_match() {
        let by_external = user("ana@example.com", Some("g-123"));
        let by_email = user("ana@example.com", None);
        let expected = by_external.id;

        match plan(Some(by_external), Some(by_email)) {
            Resolution::Existing(u) => assert_eq!(u.id, expected),
            other => panic!("expected Existing, got {other:?}"),
        }
    }

    #[test]
    fn email_match_links_instead_of_creating() {
        let by_email = user("ana@example.com", None);
        let expected = by_email.id;

        match plan(None, Some(by_email)) {
            Resolution::Link(u) => assert_eq!(u.id, expected),
            other => panic!("expected Link, got {other:?}"),
        }
    }

    #[test]
    fn no_match_creates() {
        assert!(matches!(plan(None, None), Resolution::Create));
    }
}
