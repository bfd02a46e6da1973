use crate::domain::ports::Notifier;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Simulation-mode delivery: logs the message instead of speaking SMTP.
/// Useful for local development and the batch CLI, where no mail relay is
/// configured.
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> bool {
        tracing::info!(to, subject, %body, "simulated email delivery");
        true
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl SentMessage {
    /// Extracts the one-time code from the message body: the digits on the
    /// line that announces it ("… is: 123456").
    pub fn code(&self) -> Option<String> {
        let line = self.body.lines().find(|line| line.contains("is:"))?;
        let code: String = line.chars().filter(char::is_ascii_digit).collect();
        if code.is_empty() { None } else { Some(code) }
    }
}

/// Captures outgoing messages for assertions. Clones share the same
/// mailbox; `failing()` builds one that reports every delivery as failed,
/// while still recording it.
#[derive(Default, Clone)]
pub struct RecordingNotifier {
    sent: Arc<RwLock<Vec<SentMessage>>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub async fn sent(&self) -> Vec<SentMessage> {
        self.sent.read().await.clone()
    }

    pub async fn last(&self) -> Option<SentMessage> {
        self.sent.read().await.last().cloned()
    }

    pub async fn last_code(&self) -> Option<String> {
        self.last().await.and_then(|message| message.code())
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> bool {
        self.sent.write().await.push(SentMessage {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        !self.fail
    }
}
