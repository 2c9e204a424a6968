use std::time::Duration;

use tokio::time::Instant;

pub const DEFAULT_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
    raised_at: Instant,
}

/// Holds at most one message and hides it once its time-to-live has passed.
#[derive(Debug, Clone)]
pub struct Notifier {
    current: Option<Notification>,
    ttl: Duration,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl Notifier {
    pub fn new(ttl: Duration) -> Self {
        Self { current: None, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Replaces whatever is showing.
    pub fn show(&mut self, message: impl Into<String>, kind: NotificationKind) {
        self.current = Some(Notification {
            message: message.into(),
            kind,
            raised_at: Instant::now(),
        });
    }

    pub fn current(&self) -> Option<&Notification> {
        self.current_at(Instant::now())
    }

    pub fn current_at(&self, now: Instant) -> Option<&Notification> {
        self.current
            .as_ref()
            .filter(|n| now.saturating_duration_since(n.raised_at) < self.ttl)
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }
}
