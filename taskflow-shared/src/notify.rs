/// Outbound notifications
///
/// Board invitations and comment notices are handed to a [`Notifier`] after
/// the triggering transaction commits. Delivery is best effort: a failed send
/// is logged and never undoes or fails the operation that caused it.
///
/// # Example
///
/// ```
/// use taskflow_shared::notify::{MemoryNotifier, Notifier};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let notifier = MemoryNotifier::new();
/// notifier.send_message("ada@example.com", "Hello", "Welcome aboard").await?;
/// assert_eq!(notifier.sent().await.len(), 1);
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Error type for notification delivery
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// Transport refused or failed to deliver
    #[error("Delivery failed: {0}")]
    Delivery(String),
}

/// Message transport
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends a plain-text message to `to`
    async fn send_message(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// Notifier that only writes the message to the log
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_message(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        tracing::info!(to = %to, subject = %subject, body_len = body.len(), "Notification sent");
        Ok(())
    }
}

/// A message captured by [`MemoryNotifier`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Notifier that records every message, for tests
#[derive(Debug, Clone, Default)]
pub struct MemoryNotifier {
    sent: Arc<Mutex<Vec<SentMessage>>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages sent so far, oldest first
    pub async fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn send_message(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        self.sent.lock().await.push(SentMessage {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
