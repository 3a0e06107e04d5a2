use std::time::{Duration, Instant};

/// Default display time for a transient notice
pub const NOTICE_TTL: Duration = Duration::from_millis(2000);

/// A transient, user-facing message that expires on its own
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub deadline: Instant,
}

/// Queue of notices waiting to be shown. Expired ones are dropped as time passes.
#[derive(Debug, Clone)]
pub struct NoticeBoard {
    ttl: Duration,
    notices: Vec<Notice>,
}

impl NoticeBoard {
    pub fn new(ttl: Duration) -> Self {
        NoticeBoard {
            ttl,
            notices: Vec::new(),
        }
    }

    pub fn push(&mut self, message: impl Into<String>, now: Instant) {
        self.notices.push(Notice {
            message: message.into(),
            deadline: now + self.ttl,
        });
    }

    /// Messages still on screen at `now`, oldest first.
    pub fn active(&mut self, now: Instant) -> Vec<&str> {
        self.notices.retain(|n| n.deadline > now);
        self.notices.iter().map(|n| n.message.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }
}
