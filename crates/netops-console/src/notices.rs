use std::collections::VecDeque;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub(crate) struct Notice {
    pub(crate) level: NoticeLevel,
    pub(crate) title: String,
    pub(crate) body: String,
    expires_at: Instant,
}

/// Transient toast queue. Notices expire after a fixed TTL and are pruned on
/// every UI tick; the newest one is shown in the footer.
pub(crate) struct NoticeBoard {
    items: VecDeque<Notice>,
    ttl: Duration,
}

impl NoticeBoard {
    pub(crate) fn new(ttl: Duration) -> Self {
        Self {
            items: VecDeque::new(),
            ttl,
        }
    }

    pub(crate) fn push_at(
        &mut self,
        now: Instant,
        level: NoticeLevel,
        title: impl Into<String>,
        body: impl Into<String>,
    ) {
        self.items.push_back(Notice {
            level,
            title: title.into(),
            body: body.into(),
            expires_at: now + self.ttl,
        });
    }

    pub(crate) fn prune(&mut self, now: Instant) {
        self.items.retain(|notice| notice.expires_at > now);
    }

    /// Most recent live notice.
    pub(crate) fn current(&self) -> Option<&Notice> {
        self.items.back()
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_notice_wins() {
        let now = Instant::now();
        let mut board = NoticeBoard::new(Duration::from_secs(3));
        board.push_at(now, NoticeLevel::Info, "first", "a");
        board.push_at(now, NoticeLevel::Error, "second", "b");
        assert_eq!(board.current().map(|n| n.title.as_str()), Some("second"));
    }

    #[test]
    fn notices_expire_after_ttl() {
        let now = Instant::now();
        let mut board = NoticeBoard::new(Duration::from_secs(3));
        board.push_at(now, NoticeLevel::Success, "saved", "device saved");

        board.prune(now + Duration::from_secs(2));
        assert!(board.current().is_some());

        board.prune(now + Duration::from_secs(4));
        assert!(board.current().is_none());
    }

    #[test]
    fn clear_drops_everything() {
        let now = Instant::now();
        let mut board = NoticeBoard::new(Duration::from_secs(3));
        board.push_at(now, NoticeLevel::Warning, "slow", "backend lagging");
        board.clear();
        assert!(board.current().is_none());
    }
}
