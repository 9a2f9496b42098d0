//! Time-limited user-visible notices (the toast queue).

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Default lifetime of a notice.
pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_secs(5);
/// Lifetime used for authentication/authorization notices.
pub const AUTH_NOTICE_TTL: Duration = Duration::from_secs(7);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub id: String,
    pub message: String,
    pub level: NoticeLevel,
    deadline: Option<Instant>,
}

impl Notice {
    fn expired(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

#[derive(Debug, Default)]
struct State {
    notices: Vec<Notice>,
    counter: u64,
}

/// Queue of notices consumed by whatever renders user feedback. A zero
/// duration pins the notice until it is removed explicitly.
#[derive(Debug, Default)]
pub struct NoticeCenter {
    state: Mutex<State>,
}

impl NoticeCenter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&self, message: &str, level: NoticeLevel, ttl: Option<Duration>) -> String {
        let ttl = ttl.unwrap_or(DEFAULT_NOTICE_TTL);
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        state.counter += 1;
        let id = format!("notice-{}", state.counter);
        state.notices.push(Notice {
            id: id.clone(),
            message: message.to_string(),
            level,
            deadline: (!ttl.is_zero()).then(|| Instant::now() + ttl),
        });

        id
    }

    pub fn success(&self, message: &str, ttl: Option<Duration>) -> String {
        self.show(message, NoticeLevel::Success, ttl)
    }

    pub fn error(&self, message: &str, ttl: Option<Duration>) -> String {
        self.show(message, NoticeLevel::Error, ttl)
    }

    pub fn warning(&self, message: &str, ttl: Option<Duration>) -> String {
        self.show(message, NoticeLevel::Warning, ttl)
    }

    pub fn info(&self, message: &str, ttl: Option<Duration>) -> String {
        self.show(message, NoticeLevel::Info, ttl)
    }

    /// Currently visible notices; expired ones are pruned on the way out.
    pub fn active(&self) -> Vec<Notice> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.notices.retain(|notice| !notice.expired());
        state.notices.clone()
    }

    pub fn remove(&self, id: &str) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.notices.retain(|notice| notice.id != id);
    }

    pub fn clear(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.notices.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notices_queue_in_order_with_sequential_ids() {
        let center = NoticeCenter::new();
        let first = center.info("one", None);
        let second = center.error("two", None);

        let active = center.active();
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].id, first);
        assert_eq!(active[1].id, second);
        assert_eq!(active[1].level, NoticeLevel::Error);
    }

    #[test]
    fn expired_notices_are_pruned() {
        let center = NoticeCenter::new();
        center.warning("gone", Some(Duration::from_millis(1)));
        let kept = center.success("kept", Some(Duration::from_secs(60)));

        std::thread::sleep(Duration::from_millis(5));

        let active = center.active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, kept);
    }

    #[test]
    fn zero_ttl_pins_until_removed() {
        let center = NoticeCenter::new();
        let id = center.error("pinned", Some(Duration::ZERO));

        std::thread::sleep(Duration::from_millis(2));
        assert_eq!(center.active().len(), 1);

        center.remove(&id);
        assert!(center.active().is_empty());
    }

    #[test]
    fn clear_empties_the_queue() {
        let center = NoticeCenter::new();
        center.info("a", None);
        center.info("b", None);

        center.clear();
        assert!(center.active().is_empty());
    }
}
