use anyhow::Context;
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use sqlx::{FromRow, SqlitePool};
use time::OffsetDateTime;
use tracing::{error, warn};
use uuid::Uuid;

use super::jwt::JwtKeys;
use crate::{error::ApiError, state::AppState};

/// The authenticated caller of one request: a live login session and its user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: Uuid,
    pub user_id: i64,
    pub username: String,
    pub email: String,
}

#[derive(Debug, FromRow)]
struct SessionRow {
    id: String,
    user_id: i64,
    username: String,
    email: String,
}

impl TryFrom<SessionRow> for Session {
    type Error = anyhow::Error;

    fn try_from(r: SessionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&r.id).context("stored session id")?,
            user_id: r.user_id,
            username: r.username,
            email: r.email,
        })
    }
}

pub async fn create(db: &SqlitePool, user_id: i64) -> anyhow::Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO sessions (id, user_id, created_at) VALUES (?, ?, ?)")
        .bind(id.to_string())
        .bind(user_id)
        .bind(OffsetDateTime::now_utc())
        .execute(db)
        .await
        .context("insert session")?;
    Ok(id)
}

/// Load a session owned by `user_id`, joined with its user.
pub async fn find(db: &SqlitePool, id: Uuid, user_id: i64) -> anyhow::Result<Option<Session>> {
    let row = sqlx::query_as::<_, SessionRow>(
        r#"
        SELECT s.id, s.user_id, u.username, u.email
          FROM sessions s
          JOIN users u ON u.id = s.user_id
         WHERE s.id = ? AND s.user_id = ?
        "#,
    )
    .bind(id.to_string())
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("find session")?;

    row.map(Session::try_from).transpose()
}

/// Swap a live session for a fresh id in one transaction, so tokens that
/// carry the old id stop working. `None` when the old session is gone.
pub async fn rotate(db: &SqlitePool, id: Uuid, user_id: i64) -> anyhow::Result<Option<Uuid>> {
    let mut tx = db.begin().await.context("begin session rotation")?;

    let removed = sqlx::query("DELETE FROM sessions WHERE id = ? AND user_id = ?")
        .bind(id.to_string())
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .context("retire session")?;
    if removed.rows_affected() == 0 {
        return Ok(None);
    }

    let next = Uuid::new_v4();
    sqlx::query("INSERT INTO sessions (id, user_id, created_at) VALUES (?, ?, ?)")
        .bind(next.to_string())
        .bind(user_id)
        .bind(OffsetDateTime::now_utc())
        .execute(&mut *tx)
        .await
        .context("insert rotated session")?;

    tx.commit().await.context("commit session rotation")?;
    Ok(Some(next))
}

/// Returns whether a session was actually removed.
pub async fn destroy(db: &SqlitePool, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM sessions WHERE id = ?")
        .bind(id.to_string())
        .execute(db)
        .await
        .context("delete session")?;
    Ok(res.rows_affected() > 0)
}

fn bearer_token(parts: &Parts) -> Option<Result<&str, ApiError>> {
    let header = parts.headers.get(AUTHORIZATION)?;
    let token = header
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer ").or_else(|| v.strip_prefix("bearer ")))
        .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization header".into()));
    Some(token)
}

async fn resolve(state: &AppState, token: &str) -> Result<Session, ApiError> {
    let keys = JwtKeys::from_ref(state);
    let claims = keys.verify_access(token).map_err(|_| {
        warn!("invalid or expired token");
        ApiError::Unauthorized("Invalid or expired token".into())
    })?;

    match find(&state.db, claims.sid, claims.sub).await {
        Ok(Some(session)) => Ok(session),
        Ok(None) => {
            warn!(user_id = claims.sub, session_id = %claims.sid, "session not found");
            Err(ApiError::Unauthorized("Session has ended".into()))
        }
        Err(e) => {
            error!(error = %e, "session lookup failed");
            Err(ApiError::unavailable())
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .unwrap_or_else(|| Err(ApiError::Unauthorized("Missing Authorization header".into())))?;
        resolve(state, token).await
    }
}

/// Session when a bearer token is present; anonymous when the header is absent.
/// A present but invalid token is still rejected.
pub struct MaybeSession(pub Option<Session>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match bearer_token(parts) {
            None => Ok(MaybeSession(None)),
            Some(token) => Ok(MaybeSession(Some(resolve(state, token?).await?))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo::add_user;
    use crate::db::{memory_pool, migrate};

    #[tokio::test]
    async fn session_lifecycle() {
        let db = memory_pool().await;
        migrate(&db).await.unwrap();
        let user = add_user(&db, "ada", "ada@example.com", "Analytic1").await.unwrap().unwrap();

        let sid = create(&db, user.id).await.unwrap();
        let session = find(&db, sid, user.id).await.unwrap().expect("live session");
        assert_eq!(
            session,
            Session {
                id: sid,
                user_id: user.id,
                username: "ada".into(),
                email: "ada@example.com".into(),
            }
        );

        assert!(find(&db, sid, user.id + 1).await.unwrap().is_none());

        assert!(destroy(&db, sid).await.unwrap());
        assert!(find(&db, sid, user.id).await.unwrap().is_none());
        assert!(!destroy(&db, sid).await.unwrap());
    }

    #[tokio::test]
    async fn rotation_retires_the_old_id() {
        let db = memory_pool().await;
        migrate(&db).await.unwrap();
        let user = add_user(&db, "ada", "ada@example.com", "Analytic1").await.unwrap().unwrap();
        let sid = create(&db, user.id).await.unwrap();

        assert!(rotate(&db, sid, user.id + 1).await.unwrap().is_none());
        assert!(find(&db, sid, user.id).await.unwrap().is_some());

        let next = rotate(&db, sid, user.id).await.unwrap().expect("rotated");
        assert_ne!(next, sid);
        assert!(find(&db, sid, user.id).await.unwrap().is_none());
        assert!(find(&db, next, user.id).await.unwrap().is_some());

        assert!(rotate(&db, sid, user.id).await.unwrap().is_none());
    }
}
