use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Outbound mail settings. `server == None` means mail is not configured.
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub server: Option<String>,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from_email: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt: JwtConfig,
    pub smtp: SmtpConfig,
    pub model_path: PathBuf,
    pub public_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let parsed = |key: &str| lookup(key).and_then(|v| v.trim().parse::<i64>().ok());
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt = JwtConfig {
            secret: non_empty("JWT_SECRET").ok_or_else(|| anyhow::anyhow!("JWT_SECRET is not set"))?,
            issuer: lookup("JWT_ISSUER").unwrap_or_else(|| "burnmeter".into()),
            audience: lookup("JWT_AUDIENCE").unwrap_or_else(|| "burnmeter-users".into()),
            ttl_minutes: parsed("JWT_TTL_MINUTES").unwrap_or(60),
            refresh_ttl_minutes: parsed("JWT_REFRESH_TTL_MINUTES").unwrap_or(60 * 24 * 14),
        };

        let username = non_empty("SMTP_USERNAME");
        let smtp = SmtpConfig {
            server: non_empty("SMTP_SERVER"),
            port: lookup("SMTP_PORT")
                .and_then(|v| v.trim().parse::<u16>().ok())
                .unwrap_or(587),
            password: non_empty("SMTP_PASSWORD"),
            from_email: non_empty("FROM_EMAIL").or_else(|| username.clone()),
            username,
            timeout_secs: lookup("SMTP_TIMEOUT_SECS")
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(10),
        };

        Ok(Self {
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://burnout_users.db".into()),
            database_max_connections: lookup("DATABASE_MAX_CONNECTIONS")
                .and_then(|v| v.trim().parse::<u32>().ok())
                .unwrap_or(5),
            jwt,
            smtp,
            model_path: lookup("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("burnout_model.json")),
            public_url: non_empty("PUBLIC_URL"),
        })
    }
}
