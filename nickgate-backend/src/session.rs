use scc::hash_map::Entry;

/// Default pause between repeated out-of-band notifications (2 minutes).
pub const DEFAULT_NOTIFY_COOLDOWN_MS: i64 = 120_000;

/// Per-session last-notification timestamps, used only for the cooldown.
///
/// Sessions are created lazily on first check and live for the process
/// lifetime.
pub struct SessionTracker {
    last_notify_ms: scc::HashMap<String, i64>,
    cooldown_ms: i64,
}

impl SessionTracker {
    pub fn new(cooldown_ms: i64) -> Self {
        Self {
            last_notify_ms: scc::HashMap::new(),
            cooldown_ms,
        }
    }

    /// Whether a notification may be sent for this session right now.
    ///
    /// True on the first check for a key, or when more than the cooldown has
    /// elapsed since the previous check. The timestamp is recorded on every
    /// call regardless of the verdict, so rapid re-checks inside the window
    /// keep pushing the window's start forward.
    pub async fn should_notify(&self, session_key: &str, now_ms: i64) -> bool {
        match self.last_notify_ms.entry_async(session_key.to_string()).await {
            Entry::Occupied(mut entry) => {
                let last = *entry.get();
                *entry.get_mut() = now_ms;
                now_ms - last > self.cooldown_ms
            }
            Entry::Vacant(entry) => {
                entry.insert_entry(now_ms);
                true
            }
        }
    }
}

impl Default for SessionTracker {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFY_COOLDOWN_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_check_notifies() {
        let tracker = SessionTracker::default();
        assert!(tracker.should_notify("uuid-1", 1_000).await);
    }

    #[tokio::test]
    async fn test_check_inside_window_is_suppressed() {
        let tracker = SessionTracker::default();
        assert!(tracker.should_notify("uuid-1", 0).await);
        assert!(!tracker.should_notify("uuid-1", 120_000).await); // boundary: not strictly greater
        assert!(tracker.should_notify("uuid-1", 240_001).await);
    }

    #[tokio::test]
    async fn test_check_after_window_notifies_again() {
        let tracker = SessionTracker::default();
        assert!(tracker.should_notify("uuid-1", 0).await);
        assert!(tracker.should_notify("uuid-1", 120_001).await);
    }

    #[tokio::test]
    async fn test_every_check_resets_the_window() {
        let tracker = SessionTracker::default();
        assert!(tracker.should_notify("uuid-1", 0).await);

        // The 60s check was suppressed but still moved the window start, so
        // 130s is only 70s after the last check and stays suppressed.
        assert!(!tracker.should_notify("uuid-1", 60_000).await);
        assert!(!tracker.should_notify("uuid-1", 130_000).await);
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let tracker = SessionTracker::default();
        assert!(tracker.should_notify("uuid-1", 0).await);
        assert!(tracker.should_notify("uuid-2", 1).await);
        assert!(!tracker.should_notify("uuid-1", 2).await);
    }
}
