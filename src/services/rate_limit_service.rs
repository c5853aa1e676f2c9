use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use actix_web::HttpRequest;

struct Bucket {
    count: u32,
    reset_at: Instant,
}

#[derive(Debug, Clone, Copy)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub retry_after: Duration,
}

/// Process-local fixed-window limiter (count then reset, not sliding).
/// Best effort by design: buckets live in this process only, which is
/// acceptable because the generation endpoints do not scale out.
pub struct RateLimiter {
    buckets: Mutex<HashMap<String, Bucket>>,
}

impl RateLimiter {
    pub fn new() -> RateLimiter {
        RateLimiter {
            buckets: Mutex::new(HashMap::new()),
        }
    }

    pub fn check(&self, key: &str, window: Duration, max: u32) -> RateLimitDecision {
        let now = Instant::now();
        let mut buckets = self.buckets.lock().expect("rate limit lock");

        if let Some(bucket) = buckets.get_mut(key) {
            if bucket.reset_at > now {
                if bucket.count >= max {
                    return RateLimitDecision {
                        allowed: false,
                        remaining: 0,
                        retry_after: bucket.reset_at.saturating_duration_since(now),
                    };
                }
                bucket.count += 1;
                return RateLimitDecision {
                    allowed: true,
                    remaining: max - bucket.count,
                    retry_after: bucket.reset_at.saturating_duration_since(now),
                };
            }
        }

        buckets.insert(
            key.to_string(),
            Bucket {
                count: 1,
                reset_at: now + window,
            },
        );
        RateLimitDecision {
            allowed: true,
            remaining: max.saturating_sub(1),
            retry_after: window,
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        RateLimiter::new()
    }
}

/// Client identity for rate-limit keys: first `x-forwarded-for` hop, then
/// `x-real-ip`, else "unknown".
pub fn client_id(req: &HttpRequest) -> String {
    if let Some(forwarded) = req.headers().get("x-forwarded-for") {
        if let Ok(value) = forwarded.to_str() {
            if let Some(first) = value.split(',').next() {
                let first = first.trim();
                if !first.is_empty() {
                    return first.to_string();
                }
            }
        }
    }
    if let Some(real_ip) = req.headers().get("x-real-ip") {
        if let Ok(value) = real_ip.to_str() {
            if !value.trim().is_empty() {
                return value.trim().to_string();
            }
        }
    }
    "unknown".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_down_then_blocks() {
        let limiter = RateLimiter::new();
        let window = Duration::from_secs(60);

        for expected_remaining in [2, 1, 0] {
            let decision = limiter.check("generate:1.2.3.4", window, 3);
            assert!(decision.allowed);
            assert_eq!(decision.remaining, expected_remaining);
        }

        let decision = limiter.check("generate:1.2.3.4", window, 3);
        assert!(!decision.allowed);
        assert_eq!(decision.remaining, 0);
    }

    #[test]
    fn test_window_expiry_resets_the_bucket() {
        let limiter = RateLimiter::new();
        let window = Duration::from_millis(10);

        assert!(limiter.check("k", window, 1).allowed);
        assert!(!limiter.check("k", window, 1).allowed);
        std::thread::sleep(Duration::from_millis(20));
        assert!(limiter.check("k", window, 1).allowed);
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = RateLimiter::new();
        let window = Duration::from_secs(60);
        assert!(limiter.check("share:a", window, 1).allowed);
        assert!(limiter.check("share:b", window, 1).allowed);
        assert!(!limiter.check("share:a", window, 1).allowed);
    }
}
