//! Outbound email of assessment results.
//!
//! Sending is best-effort: callers report a failure to the user and carry on.

mod report;
mod smtp;

pub use report::{result_email, should_notify, ResultEmail, EMAIL_SUBJECT, NOTIFY_ABOVE};
pub use smtp::SmtpMailer;

use async_trait::async_trait;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}
