//! The auth gate. Register and login validate first, then run the store and
//! hashing work inside a [`ResponseTimer`] so every post-validation outcome,
//! success included, leaves after the same minimum latency.

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{
            ApiMessage, ApiSuccess, DashboardData, DashboardInfo, LoginData, LoginRequest,
            ProfileData, ProfileUser, RegisterData, RegisterRequest, SessionUser, UserSummary,
        },
        identity,
        jwt::{AuthUser, JwtKeys},
        password,
        repo::{InsertUserError, NewUser},
        repo_types::User,
        timing::ResponseTimer,
        validate::{self, NormalizedLogin, NormalizedRegistration},
    },
    error::{ApiError, FieldError},
    state::AppState,
};

const USERNAME_EXISTS: &str = "Username already exists";
const EMAIL_EXISTS: &str = "An account with this email already exists";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
}

pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiSuccess<RegisterData>>), ApiError> {
    let registration =
        validate::validate_registration(&payload.username, &payload.email, &payload.password)
            .map_err(ApiError::Validation)?;

    let timer = ResponseTimer::start(state.config.auth.timing_floor());
    let result = register_user(&state, registration).await;
    timer.pad().await;
    result.map(|body| (StatusCode::CREATED, Json(body)))
}

async fn register_user(
    state: &AppState,
    registration: NormalizedRegistration,
) -> Result<ApiSuccess<RegisterData>, ApiError> {
    // Early exits for the common case; the unique indexes below are what
    // actually guarantee uniqueness under concurrency.
    if User::find_by_lower_username(&state.db, &registration.username)
        .await
        .map_err(ApiError::internal)?
        .is_some()
    {
        warn!("registration rejected: username taken");
        return Err(ApiError::Duplicate(FieldError::new("username", USERNAME_EXISTS)));
    }
    if User::find_by_lower_email(&state.db, &registration.email)
        .await
        .map_err(ApiError::internal)?
        .is_some()
    {
        warn!("registration rejected: email taken");
        return Err(ApiError::Duplicate(FieldError::new("email", EMAIL_EXISTS)));
    }

    let hash = password::hash_password(&registration.password).map_err(ApiError::internal)?;

    let user = match User::insert(
        &state.db,
        NewUser {
            username: &registration.username,
            display_name: &registration.display_name,
            email: &registration.email,
            password_hash: &hash,
        },
    )
    .await
    {
        Ok(user) => user,
        // Lost a registration race: report exactly what the early exit would have.
        Err(InsertUserError::DuplicateUsername) => {
            warn!("registration race lost on username");
            return Err(ApiError::Duplicate(FieldError::new("username", USERNAME_EXISTS)));
        }
        Err(InsertUserError::DuplicateEmail) => {
            warn!("registration race lost on email");
            return Err(ApiError::Duplicate(FieldError::new("email", EMAIL_EXISTS)));
        }
        Err(InsertUserError::Database(e)) => return Err(ApiError::internal(e)),
    };

    let token = JwtKeys::from_ref(state)
        .sign(&user)
        .map_err(ApiError::internal)?;

    info!(user_id = %user.id, "user registered");
    Ok(ApiSuccess::new(
        "User registered successfully",
        RegisterData {
            user: UserSummary::from(&user),
            token,
        },
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiSuccess<LoginData>>, ApiError> {
    let login = validate::validate_login(&payload.identifier, &payload.password)
        .map_err(ApiError::Validation)?;

    let timer = ResponseTimer::start(state.config.auth.timing_floor());
    let result = login_user(&state, login).await;
    timer.pad().await;
    result.map(Json)
}

async fn login_user(
    state: &AppState,
    login: NormalizedLogin,
) -> Result<ApiSuccess<LoginData>, ApiError> {
    let user = identity::resolve(&state.db, &login.identifier)
        .await
        .map_err(ApiError::internal)?;

    let Some(user) = user else {
        // Unknown identifier still pays a full hash verification.
        password::verify_dummy(&login.password).map_err(ApiError::internal)?;
        return Err(ApiError::AuthenticationFailed);
    };

    if !password::verify_password(&login.password, &user.password_hash)
        .map_err(ApiError::internal)?
    {
        warn!(user_id = %user.id, "login failed: password mismatch");
        return Err(ApiError::AuthenticationFailed);
    }

    // The client sees the previous login time; the stamp records this one.
    let previous_login = user.last_login;
    User::update_last_login(&state.db, user.id)
        .await
        .map_err(ApiError::internal)?;

    let token = JwtKeys::from_ref(state)
        .sign(&user)
        .map_err(ApiError::internal)?;

    info!(user_id = %user.id, "user logged in");
    Ok(ApiSuccess::new(
        "Login successful",
        LoginData {
            user: SessionUser {
                summary: UserSummary::from(&user),
                last_login: previous_login,
            },
            token,
        },
    ))
}

#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ApiSuccess<ProfileData>>, ApiError> {
    let user = User::find_by_id(&state.db, claims.sub)
        .await
        .map_err(ApiError::internal)?
        .ok_or(ApiError::UserNotFound)?;

    Ok(Json(ApiSuccess::data(ProfileData {
        user: ProfileUser {
            summary: UserSummary::from(&user),
            created_at: user.created_at,
            last_login: user.last_login,
        },
    })))
}

#[instrument(skip_all)]
pub async fn dashboard(AuthUser(claims): AuthUser) -> Json<ApiSuccess<DashboardData>> {
    Json(ApiSuccess::new(
        "Welcome to your dashboard!",
        DashboardData {
            user: UserSummary {
                id: claims.sub,
                username: claims.username,
                display_name: claims.display_name,
                email: claims.email,
            },
            dashboard_data: DashboardInfo {
                message: "You have successfully accessed the protected dashboard.".into(),
            },
        },
    ))
}

/// Sessions are stateless, so logout is a client-side token drop; there is no
/// server-side blacklist.
#[instrument(skip_all)]
pub async fn logout(AuthUser(_claims): AuthUser) -> Json<ApiMessage> {
    Json(ApiMessage::new("Logout successful"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::Claims;
    use uuid::Uuid;

    #[tokio::test]
    async fn dashboard_echoes_claims_without_store_lookup() {
        let claims = Claims {
            sub: Uuid::new_v4(),
            username: "alice".into(),
            display_name: "Alice".into(),
            email: "alice@example.com".into(),
            iat: 0,
            exp: 0,
            iss: "test-issuer".into(),
            aud: "test-aud".into(),
        };
        let Json(body) = dashboard(AuthUser(claims.clone())).await;
        assert!(body.success);
        assert_eq!(body.data.user.id, claims.sub);
        assert_eq!(body.data.user.display_name, "Alice");
        assert_eq!(
            body.data.dashboard_data.message,
            "You have successfully accessed the protected dashboard."
        );
    }

    #[tokio::test]
    async fn logout_needs_no_server_state() {
        let claims = Claims {
            sub: Uuid::new_v4(),
            username: "alice".into(),
            display_name: "Alice".into(),
            email: "alice@example.com".into(),
            iat: 0,
            exp: 0,
            iss: "test-issuer".into(),
            aud: "test-aud".into(),
        };
        let Json(body) = logout(AuthUser(claims)).await;
        assert!(body.success);
        assert_eq!(body.message, "Logout successful");
    }
}
