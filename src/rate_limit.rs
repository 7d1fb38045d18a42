use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

const MAX_REQUESTS_PER_WINDOW: u32 = 30;
const WINDOW: Duration = Duration::from_secs(60);
const CLEANUP_THRESHOLD: usize = 1000;
const STALE_AFTER: Duration = Duration::from_secs(3600);

/// Gate in front of vote submission. The in-memory implementation below is
/// single-process and best-effort; a scaled deployment would put a
/// shared-store implementation behind this same trait.
pub trait RateLimiter: Send + Sync {
    /// Returns `true` when the request may proceed.
    fn admit(&self, ip: &str) -> bool;
}

struct Window {
    count: u32,
    started: Instant,
}

/// Per-IP fixed-window counter. State resets on process restart.
pub struct MemoryRateLimiter {
    windows: Mutex<HashMap<String, Window>>,
}

impl MemoryRateLimiter {
    pub fn new() -> Self {
        MemoryRateLimiter {
            windows: Mutex::new(HashMap::new()),
        }
    }

    fn admit_at(&self, ip: &str, now: Instant) -> bool {
        let mut windows = self.windows.lock().unwrap();
        let admitted = match windows.get_mut(ip) {
            None => {
                windows.insert(ip.to_string(), Window { count: 1, started: now });
                true
            }
            Some(window) if now.duration_since(window.started) > WINDOW => {
                window.count = 1;
                window.started = now;
                true
            }
            Some(window) => {
                window.count += 1;
                window.count <= MAX_REQUESTS_PER_WINDOW
            }
        };
        if windows.len() > CLEANUP_THRESHOLD {
            windows.retain(|_, w| now.duration_since(w.started) < STALE_AFTER);
        }
        admitted
    }
}

impl Default for MemoryRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiter for MemoryRateLimiter {
    fn admit(&self, ip: &str) -> bool {
        self.admit_at(ip, Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thirty_first_request_in_window_is_rejected() {
        let limiter = MemoryRateLimiter::new();
        let now = Instant::now();
        for _ in 0..30 {
            assert!(limiter.admit_at("203.0.113.9", now));
        }
        assert!(!limiter.admit_at("203.0.113.9", now));
    }

    #[test]
    fn window_expiry_resets_the_count() {
        let limiter = MemoryRateLimiter::new();
        let now = Instant::now();
        for _ in 0..31 {
            limiter.admit_at("203.0.113.9", now);
        }
        assert!(!limiter.admit_at("203.0.113.9", now));
        let later = now + WINDOW + Duration::from_secs(1);
        assert!(limiter.admit_at("203.0.113.9", later));
        // reset means the count started over at 1
        for _ in 0..29 {
            assert!(limiter.admit_at("203.0.113.9", later));
        }
        assert!(!limiter.admit_at("203.0.113.9", later));
    }

    #[test]
    fn different_ips_do_not_share_a_window() {
        let limiter = MemoryRateLimiter::new();
        let now = Instant::now();
        for _ in 0..30 {
            limiter.admit_at("203.0.113.9", now);
        }
        assert!(!limiter.admit_at("203.0.113.9", now));
        assert!(limiter.admit_at("203.0.113.10", now));
    }

    #[test]
    fn oversized_map_drops_stale_entries() {
        let limiter = MemoryRateLimiter::new();
        let start = Instant::now();
        for i in 0..=CLEANUP_THRESHOLD {
            limiter.admit_at(&format!("10.0.{}.{}", i / 256, i % 256), start);
        }
        // Next admit runs the sweep with everything older than an hour.
        let later = start + STALE_AFTER + Duration::from_secs(1);
        limiter.admit_at("203.0.113.9", later);
        let windows = limiter.windows.lock().unwrap();
        assert_eq!(windows.len(), 1);
        assert!(windows.contains_key("203.0.113.9"));
    }
}
