use crate::errors::ServiceError;
use async_trait::async_trait;
use tracing::{debug, info};

/// Outbound email
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_password_reset(&self, email: &str, token: &str) -> Result<(), ServiceError>;
}

/// Writes messages to the log instead of delivering them
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_password_reset(&self, email: &str, token: &str) -> Result<(), ServiceError> {
        info!(email = %email, "Password reset email queued");
        debug!(email = %email, token = %token, "Password reset token");
        Ok(())
    }
}
