use std::str::FromStr;

use anyhow::Context;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use tracing::info;

use crate::config::AppConfig;

macro_rules! placeholder_email {
    () => {
        "unknown@example.com"
    };
}

/// Placeholder carried by rows that predate the `email` column. Never mailed.
pub const PLACEHOLDER_EMAIL: &str = placeholder_email!();

/// Columns renamed since a table first shipped: `(table, old, new)`.
const RENAMED_COLUMNS: &[(&str, &str, &str)] = &[("users", "password", "password_hash")];

/// Columns introduced after a table first shipped, added in place when absent.
const ADDITIVE_COLUMNS: &[(&str, &str, &str)] = &[(
    "users",
    "email",
    concat!("ALTER TABLE users ADD COLUMN email TEXT DEFAULT '", placeholder_email!(), "'"),
)];

pub async fn connect(config: &AppConfig) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.database_url)
        .with_context(|| format!("parse database url {}", config.database_url))?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect_with(options)
        .await
        .context("connect to database")?;

    info!(url = %config.database_url, "database connected");
    Ok(pool)
}

/// Execute a SQL file statement by statement, skipping comment lines.
async fn execute_sql(pool: &SqlitePool, sql: &str) -> anyhow::Result<()> {
    for statement in sql.split(';') {
        let cleaned: String = statement
            .lines()
            .filter(|line| !line.trim().starts_with("--"))
            .collect::<Vec<_>>()
            .join("\n");
        let trimmed = cleaned.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(pool).await?;
        }
    }
    Ok(())
}

async fn has_column(pool: &SqlitePool, table: &str, column: &str) -> anyhow::Result<bool> {
    let found: Option<(String,)> =
        sqlx::query_as("SELECT name FROM pragma_table_info(?) WHERE name = ?")
            .bind(table)
            .bind(column)
            .fetch_optional(pool)
            .await
            .with_context(|| format!("inspect columns of {table}"))?;
    Ok(found.is_some())
}

/// Bring the schema up to date. Safe to call on every start.
pub async fn migrate(pool: &SqlitePool) -> anyhow::Result<()> {
    info!("running database migrations");

    execute_sql(pool, include_str!("../migrations/001_users.sql"))
        .await
        .context("migration 001_users")?;
    execute_sql(pool, include_str!("../migrations/002_user_history.sql"))
        .await
        .context("migration 002_user_history")?;
    execute_sql(pool, include_str!("../migrations/003_sessions.sql"))
        .await
        .context("migration 003_sessions")?;

    for (table, old, new) in RENAMED_COLUMNS {
        if has_column(pool, table, old).await? && !has_column(pool, table, new).await? {
            info!(table, from = old, to = new, "renaming column");
            sqlx::query(&format!("ALTER TABLE {table} RENAME COLUMN {old} TO {new}"))
                .execute(pool)
                .await
                .with_context(|| format!("rename column {table}.{old}"))?;
        }
    }

    for (table, column, ddl) in ADDITIVE_COLUMNS {
        if !has_column(pool, table, column).await? {
            info!(table, column, "adding missing column");
            sqlx::query(ddl)
                .execute(pool)
                .await
                .with_context(|| format!("add column {table}.{column}"))?;
        }
    }

    info!("database schema is current");
    Ok(())
}

#[cfg(test)]
pub(crate) async fn memory_pool() -> SqlitePool {
    // One connection, never recycled: each in-memory connection is its own database.
    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(
            SqliteConnectOptions::from_str("sqlite::memory:")
                .expect("memory url")
                .foreign_keys(true),
        )
        .await
        .expect("in-memory sqlite")
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn table_count(pool: &SqlitePool, table: &str) -> i64 {
        let (n,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(pool)
            .await
            .expect("count");
        n
    }

    #[tokio::test]
    async fn migrate_creates_all_tables() {
        let pool = memory_pool().await;
        migrate(&pool).await.expect("migrate");

        for table in ["users", "user_history", "sessions"] {
            assert_eq!(table_count(&pool, table).await, 0, "{table} should exist");
        }
        assert!(has_column(&pool, "users", "email").await.unwrap());
        assert!(has_column(&pool, "user_history", "stress_level").await.unwrap());
    }

    #[tokio::test]
    async fn second_migration_is_a_no_op_and_keeps_rows() {
        let pool = memory_pool().await;
        migrate(&pool).await.expect("first migrate");

        sqlx::query("INSERT INTO users (username, email, password_hash) VALUES ('ada', 'ada@example.com', 'h')")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO user_history (user_id, sleep_hours, burnout_score) VALUES (1, 7.0, 42.0)")
            .execute(&pool)
            .await
            .unwrap();

        migrate(&pool).await.expect("second migrate");

        assert_eq!(table_count(&pool, "users").await, 1);
        assert_eq!(table_count(&pool, "user_history").await, 1);
    }

    #[tokio::test]
    async fn legacy_users_table_gains_email_column() {
        let pool = memory_pool().await;
        sqlx::query(
            r#"
            CREATE TABLE users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query("INSERT INTO users (username, password_hash) VALUES ('old-timer', 'abc')")
            .execute(&pool)
            .await
            .unwrap();

        migrate(&pool).await.expect("migrate legacy");
        migrate(&pool).await.expect("migrate again");

        let (username, email): (String, String) =
            sqlx::query_as("SELECT username, email FROM users WHERE username = 'old-timer'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(username, "old-timer");
        assert_eq!(email, PLACEHOLDER_EMAIL);
    }

    #[tokio::test]
    async fn fresh_rows_default_to_the_placeholder_email() {
        let pool = memory_pool().await;
        migrate(&pool).await.expect("migrate");
        sqlx::query("INSERT INTO users (username, password_hash) VALUES ('quiet', 'h')")
            .execute(&pool)
            .await
            .unwrap();

        let (email,): (String,) = sqlx::query_as("SELECT email FROM users WHERE username = 'quiet'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(email, PLACEHOLDER_EMAIL);
    }

    #[tokio::test]
    async fn first_generation_store_keeps_its_logins() {
        use crate::auth::repo::{add_user, verify_user};
        use sha2::{Digest, Sha256};

        let pool = memory_pool().await;
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT UNIQUE NOT NULL,
                email TEXT UNIQUE NOT NULL DEFAULT 'unknown@example.com',
                password TEXT NOT NULL,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();
        let digest = hex::encode(Sha256::digest(b"Original1"));
        sqlx::query("INSERT INTO users (username, email, password) VALUES ('ada', 'ada@example.com', ?)")
            .bind(&digest)
            .execute(&pool)
            .await
            .unwrap();

        migrate(&pool).await.expect("migrate first-generation store");
        migrate(&pool).await.expect("migrate again");
        assert!(has_column(&pool, "users", "password_hash").await.unwrap());
        assert!(!has_column(&pool, "users", "password").await.unwrap());

        let user = verify_user(&pool, "ada", "Original1").await.unwrap().expect("legacy login");
        assert_eq!(user.email, "ada@example.com");
        assert!(user.password_hash.starts_with("$argon2"));
        assert!(verify_user(&pool, "ada", "Original1").await.unwrap().is_some());

        let grace = add_user(&pool, "grace", "grace@example.com", "Compiler1").await.unwrap();
        assert!(grace.is_some());
    }

    #[tokio::test]
    async fn execute_sql_skips_comments_and_blank_statements() {
        let pool = memory_pool().await;
        execute_sql(&pool, "-- nothing here\n;\nCREATE TABLE t (x INTEGER);\n-- trailing\n;")
            .await
            .expect("execute");
        assert_eq!(table_count(&pool, "t").await, 0);
    }
}
