use crate::assessment::ScoringEngine;
use crate::config::AppConfig;
use crate::db;
use crate::notify::{Mailer, SmtpMailer};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub scoring: ScoringEngine,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = db::connect(&config).await?;

        let scoring = ScoringEngine::from_artifact(&config.model_path);

        let smtp = SmtpMailer::new(config.smtp.clone());
        if !smtp.is_enabled() {
            warn!("SMTP is not configured; result emails will fail");
        }
        let mailer = Arc::new(smtp) as Arc<dyn Mailer>;

        Ok(Self {
            db,
            config,
            scoring,
            mailer,
        })
    }

    pub fn from_parts(
        db: SqlitePool,
        config: Arc<AppConfig>,
        scoring: ScoringEngine,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            db,
            config,
            scoring,
            mailer,
        }
    }

    /// Migrated in-memory database and a fixed test config.
    #[cfg(test)]
    pub async fn for_tests(scoring: ScoringEngine, mailer: Arc<dyn Mailer>) -> Self {
        let db = db::memory_pool().await;
        db::migrate(&db).await.expect("migrate test db");

        let config = AppConfig::from_lookup(|key| match key {
            "JWT_SECRET" => Some("test".into()),
            "JWT_ISSUER" => Some("test-issuer".into()),
            "JWT_AUDIENCE" => Some("test-aud".into()),
            _ => None,
        })
        .expect("test config");

        Self::from_parts(db, Arc::new(config), scoring, mailer)
    }
}
