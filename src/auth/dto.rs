//! Wire types. The JSON field names (`displayName`, `lastLogin`, `success`)
//! are a compatibility surface and must not drift.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::User;

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request body for login; `identifier` is a username or an email.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
}

/// Envelope for every successful response: `{success:true, message?, data}`.
#[derive(Debug, Serialize)]
pub struct ApiSuccess<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
}

impl<T> ApiSuccess<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data,
        }
    }

    /// The profile route replies without a message field.
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }
}

/// Success responses that carry no data (logout, health).
#[derive(Debug, Serialize)]
pub struct ApiMessage {
    pub success: bool,
    pub message: String,
}

impl ApiMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Public part of a user: normalized username plus original-case display name.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub email: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            display_name: user.display_name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Login response user: summary plus the previous successful login time.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    #[serde(flatten)]
    pub summary: UserSummary,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_login: Option<OffsetDateTime>,
}

/// Profile response user: the full visible field set.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUser {
    #[serde(flatten)]
    pub summary: UserSummary,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_login: Option<OffsetDateTime>,
}

#[derive(Debug, Serialize)]
pub struct RegisterData {
    pub user: UserSummary,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct LoginData {
    pub user: SessionUser,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileData {
    pub user: ProfileUser,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub user: UserSummary,
    pub dashboard_data: DashboardInfo,
}

#[derive(Debug, Serialize)]
pub struct DashboardInfo {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> UserSummary {
        UserSummary {
            id: Uuid::new_v4(),
            username: "alice".into(),
            display_name: "Alice".into(),
            email: "alice@example.com".into(),
        }
    }

    #[test]
    fn register_data_uses_camel_case_field_names() {
        let data = RegisterData {
            user: summary(),
            token: "tok".into(),
        };
        let json = serde_json::to_value(ApiSuccess::new("User registered successfully", data))
            .expect("serialize");
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["user"]["displayName"], "Alice");
        assert_eq!(json["data"]["user"]["username"], "alice");
        assert_eq!(json["data"]["token"], "tok");
    }

    #[test]
    fn login_data_includes_last_login() {
        let data = LoginData {
            user: SessionUser {
                summary: summary(),
                last_login: None,
            },
            token: "tok".into(),
        };
        let json = serde_json::to_value(data).expect("serialize");
        assert!(json["user"].get("lastLogin").is_some());
        assert_eq!(json["user"]["lastLogin"], serde_json::Value::Null);
    }

    #[test]
    fn profile_user_serializes_timestamps_as_rfc3339() {
        let now = OffsetDateTime::now_utc();
        let user = ProfileUser {
            summary: summary(),
            created_at: now,
            last_login: Some(now),
        };
        let json = serde_json::to_value(user).expect("serialize");
        let created = json["createdAt"].as_str().expect("string timestamp");
        assert!(created.contains('T'));
        assert!(json["lastLogin"].as_str().is_some());
    }
}
