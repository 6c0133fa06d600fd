//! Application state and the per-origin submission rate limiter.

use std::collections::HashMap;
use std::net::IpAddr;
use std::time::Instant;

use intake_schema::FormSchema;
use intake_storage::MemorySubmissionStore;
use tokio::sync::{Mutex, RwLock};

use super::RATE_LIMIT_WINDOW_SECS;

/// Cap on tracked (origin, form) pairs. Expired entries are purged
/// lazily once the tracker grows past this, keeping the map bounded.
const MAX_TRACKED_ORIGINS: usize = 1024;

/// Per-origin submission tracker: (count, window start) keyed by
/// (client IP, form id).
type OriginTracker = HashMap<(IpAddr, String), (u64, Instant)>;

/// In-memory sliding-window rate limiter for submissions.
///
/// The window is per origin+form, so a burst against one form does not
/// lock the same client out of another.
pub(crate) struct RateLimiter {
    tracker: Mutex<OriginTracker>,
    /// Maximum submissions per window.
    pub(crate) max_submissions: u64,
}

impl RateLimiter {
    pub(crate) fn new(max_submissions: u64) -> Self {
        Self {
            tracker: Mutex::new(HashMap::new()),
            max_submissions,
        }
    }

    /// Check if a submission from the given origin+form is allowed.
    /// Returns Ok(()) if allowed, Err(retry_after_secs) if rate limited.
    pub(crate) async fn check(&self, ip: IpAddr, form_id: &str) -> Result<(), u64> {
        self.check_at(ip, form_id, Instant::now()).await
    }

    /// Clock-injected variant of [`check`](Self::check), so window expiry
    /// is testable without sleeping.
    pub(crate) async fn check_at(
        &self,
        ip: IpAddr,
        form_id: &str,
        now: Instant,
    ) -> Result<(), u64> {
        let mut tracker = self.tracker.lock().await;

        if tracker.len() > MAX_TRACKED_ORIGINS {
            tracker.retain(|_, (_, start)| {
                now.duration_since(*start).as_secs() < RATE_LIMIT_WINDOW_SECS
            });
        }

        let entry = tracker.entry((ip, form_id.to_string())).or_insert((0, now));

        // Reset window if expired
        let elapsed = now.duration_since(entry.1).as_secs();
        if elapsed >= RATE_LIMIT_WINDOW_SECS {
            entry.0 = 0;
            entry.1 = now;
        }

        entry.0 += 1;
        if entry.0 > self.max_submissions {
            Err(RATE_LIMIT_WINDOW_SECS.saturating_sub(elapsed))
        } else {
            Ok(())
        }
    }
}

/// One form exposed by the server.
pub(crate) struct LoadedForm {
    pub(crate) schema: FormSchema,
    pub(crate) token: String,
    pub(crate) active: bool,
    /// SHA-256 of the compact schema JSON, served alongside the document.
    pub(crate) etag: String,
}

/// Application state shared across request handlers.
pub(crate) struct AppState {
    /// Loaded forms keyed by form id.
    pub(crate) forms: RwLock<HashMap<String, LoadedForm>>,
    /// Accepted submissions.
    pub(crate) submissions: MemorySubmissionStore,
    /// Per-origin+form submission limiter.
    pub(crate) rate_limiter: RateLimiter,
    /// Optional admin key for the /admin routes. None = no auth required.
    pub(crate) admin_key: Option<String>,
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn ip(last: u8) -> IpAddr {
        IpAddr::from([10, 0, 0, last])
    }

    #[tokio::test]
    async fn eleventh_submission_in_window_is_rejected() {
        let limiter = RateLimiter::new(10);
        let now = Instant::now();

        for i in 0..10 {
            assert!(
                limiter.check_at(ip(1), "fleet", now).await.is_ok(),
                "submission {} should be allowed",
                i + 1
            );
        }
        let retry_after = limiter.check_at(ip(1), "fleet", now).await.unwrap_err();
        assert!(retry_after <= RATE_LIMIT_WINDOW_SECS);
    }

    #[tokio::test]
    async fn limit_is_scoped_per_origin_and_form() {
        let limiter = RateLimiter::new(10);
        let now = Instant::now();

        for _ in 0..10 {
            limiter.check_at(ip(1), "fleet", now).await.unwrap();
        }
        assert!(limiter.check_at(ip(1), "fleet", now).await.is_err());
        // Same origin, different form: independent window.
        assert!(limiter.check_at(ip(1), "liability", now).await.is_ok());
        // Different origin, same form: independent window.
        assert!(limiter.check_at(ip(2), "fleet", now).await.is_ok());
    }

    #[tokio::test]
    async fn window_expiry_resets_the_count() {
        let limiter = RateLimiter::new(10);
        let start = Instant::now();

        for _ in 0..10 {
            limiter.check_at(ip(1), "fleet", start).await.unwrap();
        }
        assert!(limiter.check_at(ip(1), "fleet", start).await.is_err());

        let later = start + Duration::from_secs(RATE_LIMIT_WINDOW_SECS + 1);
        assert!(limiter.check_at(ip(1), "fleet", later).await.is_ok());
    }
}
