use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RefreshRequest, RegisterRequest},
        jwt::JwtKeys,
        password::{is_valid_email, validate_password},
        repo::{add_user, verify_user, User},
        session::{self, Session},
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

fn issue_tokens(state: &AppState, user_id: i64, session_id: uuid::Uuid) -> Result<(String, String), ApiError> {
    let keys = JwtKeys::from_ref(state);
    let access_token = keys.sign_access(user_id, session_id).map_err(|e| {
        error!(error = %e, "jwt sign access failed");
        ApiError::Internal
    })?;
    let refresh_token = keys.sign_refresh(user_id, session_id).map_err(|e| {
        error!(error = %e, "jwt sign refresh failed");
        ApiError::Internal
    })?;
    Ok((access_token, refresh_token))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<PublicUser>), ApiError> {
    payload.username = payload.username.trim().to_string();
    payload.email = payload.email.trim().to_lowercase();

    if payload.username.is_empty() {
        return Err(ApiError::BadRequest("Username is required".into()));
    }
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::BadRequest("Invalid email".into()));
    }
    if payload.password != payload.confirm_password {
        return Err(ApiError::BadRequest("Passwords don't match".into()));
    }
    validate_password(&payload.password).map_err(ApiError::BadRequest)?;

    let user = add_user(&state.db, &payload.username, &payload.email, &payload.password)
        .await
        .map_err(|e| {
            error!(error = %e, "add_user failed");
            ApiError::unavailable()
        })?
        .ok_or_else(|| ApiError::Conflict("Username or email already exists".into()))?;

    info!(user_id = user.id, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(PublicUser {
            id: user.id,
            username: user.username,
            email: user.email,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = match verify_user(&state.db, payload.username.trim(), &payload.password).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!("login rejected");
            return Err(ApiError::Unauthorized("Invalid username or password".into()));
        }
        Err(e) => {
            error!(error = %e, "verify_user failed");
            return Err(ApiError::ServiceUnavailable(
                "Login service temporarily unavailable".into(),
            ));
        }
    };

    let session_id = session::create(&state.db, user.id).await.map_err(|e| {
        error!(error = %e, "session create failed");
        ApiError::ServiceUnavailable("Login service temporarily unavailable".into())
    })?;
    let (access_token, refresh_token) = issue_tokens(&state, user.id, session_id)?;

    info!(user_id = user.id, %session_id, "user logged in");
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: PublicUser {
            id: user.id,
            username: user.username,
            email: user.email,
        },
    }))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|_| ApiError::Unauthorized("Invalid or expired token".into()))?;

    let rotated = session::rotate(&state.db, claims.sid, claims.sub)
        .await
        .map_err(|e| {
            error!(error = %e, "session rotation failed");
            ApiError::unavailable()
        })?
        .ok_or_else(|| ApiError::Unauthorized("Session has ended".into()))?;

    let live = session::find(&state.db, rotated, claims.sub)
        .await
        .map_err(|e| {
            error!(error = %e, "session lookup failed");
            ApiError::unavailable()
        })?
        .ok_or_else(|| ApiError::Unauthorized("Session has ended".into()))?;

    let (access_token, refresh_token) = issue_tokens(&state, live.user_id, live.id)?;
    info!(user_id = live.user_id, session_id = %live.id, "session rotated");
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: PublicUser {
            id: live.user_id,
            username: live.username,
            email: live.email,
        },
    }))
}

#[instrument(skip(state, session), fields(user_id = session.user_id))]
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<StatusCode, ApiError> {
    session::destroy(&state.db, session.id).await.map_err(|e| {
        error!(error = %e, "session destroy failed");
        ApiError::unavailable()
    })?;
    info!(session_id = %session.id, "user logged out");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, session), fields(user_id = session.user_id))]
pub async fn get_me(State(state): State<AppState>, session: Session) -> Result<Json<PublicUser>, ApiError> {
    let user = User::find_by_id(&state.db, session.user_id)
        .await
        .map_err(|e| {
            error!(error = %e, "user lookup failed");
            ApiError::unavailable()
        })?
        .ok_or_else(|| ApiError::Unauthorized("User not found".into()))?;

    Ok(Json(PublicUser {
        id: user.id,
        username: user.username,
        email: user.email,
    }))
}

#[cfg(test)]
mod me_tests {
    use super::*;

    #[test]
    fn public_user_serialization_has_no_secret_fields() {
        let response = PublicUser {
            id: 3,
            username: "ada".into(),
            email: "test@example.com".to_string(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("test@example.com"));
        assert!(json.contains("\"id\":3"));
        assert!(!json.contains("password"));
    }
}
