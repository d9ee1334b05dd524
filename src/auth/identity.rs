//! Maps a login identifier (username or email) to at most one user.

use sqlx::PgPool;

use crate::auth::repo_types::User;

/// Shape of a login identifier: anything containing `@` is email-shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    Email,
    Username,
}

impl IdentifierKind {
    pub fn classify(identifier: &str) -> Self {
        if identifier.contains('@') {
            Self::Email
        } else {
            Self::Username
        }
    }
}

/// Lowercase the identifier with the same rule used at write time, then look
/// up by the matching column. `Alice@Example.com` and `alice@example.com`
/// always resolve to the same record.
pub async fn resolve(db: &PgPool, identifier: &str) -> anyhow::Result<Option<User>> {
    let normalized = identifier.trim().to_lowercase();
    match IdentifierKind::classify(&normalized) {
        IdentifierKind::Email => User::find_by_lower_email(db, &normalized).await,
        IdentifierKind::Username => User::find_by_lower_username(db, &normalized).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_email_shaped_identifiers() {
        assert_eq!(IdentifierKind::classify("alice@example.com"), IdentifierKind::Email);
        assert_eq!(IdentifierKind::classify("a@b"), IdentifierKind::Email);
    }

    #[test]
    fn classifies_username_shaped_identifiers() {
        assert_eq!(IdentifierKind::classify("alice"), IdentifierKind::Username);
        assert_eq!(IdentifierKind::classify("al-ice_99"), IdentifierKind::Username);
    }
}
