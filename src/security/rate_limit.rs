//! Rate limiting for bot replies.
//!
//! The bot answers at most once per restriction window. The window starts
//! at the bot's last channel message and applies to every non-admin; admins
//! are never limited. A window of zero disables the limiter.

use tracing::debug;

/// Send-window gate.
#[derive(Debug, Clone, Default)]
pub struct RateLimiter {
    /// Unix time of the last channel message, 0 before the first one.
    last_send: i64,
    /// Window length in seconds.
    restriction_seconds: u64,
}

impl RateLimiter {
    /// Create a limiter with the given window (0 disables it).
    pub fn new(restriction_seconds: u64) -> Self {
        Self {
            last_send: 0,
            restriction_seconds,
        }
    }

    /// Check whether `username` may trigger the bot at unix time `now`.
    ///
    /// Open once the full window has elapsed since the last send; blocked
    /// strictly inside it.
    pub fn permits_at(&self, username: &str, is_admin: bool, now: i64) -> bool {
        if self.restriction_seconds == 0 || is_admin || self.last_send == 0 {
            return true;
        }
        let elapsed = now.saturating_sub(self.last_send);
        let window = i64::try_from(self.restriction_seconds).unwrap_or(i64::MAX);
        let open = elapsed >= window;
        if !open {
            debug!(user = %username, remaining = window - elapsed, "rate limited");
        }
        open
    }

    /// Record a channel message sent at unix time `epoch`.
    pub fn record_send(&mut self, epoch: i64) {
        self.last_send = epoch;
    }

    #[cfg(test)]
    pub fn last_send(&self) -> i64 {
        self.last_send
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: i64 = 1_700_000_000;

    #[test]
    fn test_disabled_window_always_permits() {
        let mut limiter = RateLimiter::new(0);
        limiter.record_send(T);
        assert!(limiter.permits_at("viewer", false, T));
    }

    #[test]
    fn test_no_send_yet_permits() {
        let limiter = RateLimiter::new(30);
        assert!(limiter.permits_at("viewer", false, T));
    }

    #[test]
    fn test_window_blocks_until_fully_elapsed() {
        let mut limiter = RateLimiter::new(30);
        limiter.record_send(T);

        for elapsed in [0, 1, 15, 29] {
            assert!(!limiter.permits_at("viewer", false, T + elapsed), "elapsed {elapsed}");
        }
        assert!(limiter.permits_at("viewer", false, T + 30));
        assert!(limiter.permits_at("viewer", false, T + 3600));
    }

    #[test]
    fn test_admin_bypasses_window() {
        let mut limiter = RateLimiter::new(30);
        limiter.record_send(T);
        for elapsed in [0, 10, 29, 30] {
            assert!(limiter.permits_at("boss", true, T + elapsed));
        }
    }

    #[test]
    fn test_record_send_moves_window() {
        let mut limiter = RateLimiter::new(10);
        limiter.record_send(T);
        assert!(limiter.permits_at("viewer", false, T + 10));

        limiter.record_send(T + 10);
        assert!(!limiter.permits_at("viewer", false, T + 15));
        assert_eq!(limiter.last_send(), T + 10);
    }
}
