use anyhow::Context;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use time::OffsetDateTime;
use tracing::{info, warn};

use super::password::{burn_verification, check_password, hash_password, PasswordCheck};

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 PHC string, or a legacy SHA-256 hex digest
    pub created_at: OffsetDateTime,
}

impl User {
    pub async fn find_by_username(db: &SqlitePool, username: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(db)
        .await
        .context("find user by username")?;
        Ok(user)
    }

    pub async fn find_by_id(db: &SqlitePool, id: i64) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
        .context("find user by id")?;
        Ok(user)
    }

    /// Insert a user. `Ok(None)` when the username or email is already taken.
    pub async fn create(
        db: &SqlitePool,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<Option<User>> {
        let result = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, username, email, password_hash, created_at
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(db)
        .await;

        match result {
            Ok(user) => Ok(Some(user)),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Ok(None),
            Err(e) => Err(e).context("insert user"),
        }
    }

    pub async fn update_password_hash(db: &SqlitePool, id: i64, password_hash: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(db)
            .await
            .context("update password hash")?;
        Ok(())
    }
}

/// Register a new account. `Ok(None)` signals a duplicate username or email.
pub async fn add_user(
    db: &SqlitePool,
    username: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<Option<User>> {
    let hash = hash_password(password)?;
    let user = User::create(db, username, email, &hash).await?;
    match &user {
        Some(u) => info!(user_id = u.id, username = %u.username, "user added"),
        None => warn!(username, "username or email already taken"),
    }
    Ok(user)
}

/// Check credentials. Unknown username and wrong password both yield `Ok(None)`.
pub async fn verify_user(db: &SqlitePool, username: &str, password: &str) -> anyhow::Result<Option<User>> {
    let Some(mut user) = User::find_by_username(db, username).await? else {
        burn_verification(password);
        return Ok(None);
    };

    match check_password(password, &user.password_hash) {
        Ok(PasswordCheck::Valid) => Ok(Some(user)),
        Ok(PasswordCheck::ValidLegacy) => {
            let upgraded = hash_password(password)?;
            User::update_password_hash(db, user.id, &upgraded).await?;
            info!(user_id = user.id, "legacy password digest upgraded");
            user.password_hash = upgraded;
            Ok(Some(user))
        }
        Ok(PasswordCheck::Invalid) => Ok(None),
        Err(e) => {
            // An unreadable stored hash can never match.
            warn!(user_id = user.id, error = %e, "stored password hash is unreadable");
            Ok(None)
        }
    }
}
