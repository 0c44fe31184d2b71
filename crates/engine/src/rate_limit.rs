//! Per-account request throttling.
//!
//! Limiter state is process-local and lost on restart; that is an accepted
//! relaxation, not a correctness requirement. The store is never touched on
//! a rejected check.

use std::{
    collections::HashMap,
    fmt,
    sync::{Mutex, PoisonError},
    time::{Duration, Instant},
};

use crate::EngineError;

/// Class of operation throttled independently per account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpClass {
    Transfer,
    Query,
}

impl OpClass {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transfer => "transfer",
            Self::Query => "query",
        }
    }
}

/// Allow at most `max_ops` operations per `window`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowLimit {
    pub max_ops: u32,
    pub window: Duration,
}

/// Limits per operation class. A `None` entry means unlimited.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimits {
    pub transfer: Option<WindowLimit>,
    pub query: Option<WindowLimit>,
}

impl RateLimits {
    #[must_use]
    pub const fn limit_for(&self, class: OpClass) -> Option<WindowLimit> {
        match class {
            OpClass::Transfer => self.transfer,
            OpClass::Query => self.query,
        }
    }
}

impl Default for RateLimits {
    /// 10 transfers per minute, unlimited queries. The app overrides this
    /// from `settings.toml`.
    fn default() -> Self {
        Self {
            transfer: Some(WindowLimit {
                max_ops: 10,
                window: Duration::from_secs(60),
            }),
            query: None,
        }
    }
}

/// Strategy seam for throttling; the engine only sees this trait, so a
/// deployment can swap in a different policy (or a no-op) via the builder.
pub trait RateLimiter: Send + Sync + fmt::Debug {
    /// Fails with [`EngineError::RateLimitExceeded`] when the caller is over
    /// its budget for the class; otherwise records the operation.
    fn check(&self, account_id: &str, class: OpClass) -> Result<(), EngineError>;
}

#[derive(Clone, Copy, Debug)]
struct Window {
    started_at: Instant,
    count: u32,
}

/// Default limiter: fixed window per `(account_id, op class)`.
#[derive(Debug)]
pub struct FixedWindowLimiter {
    limits: RateLimits,
    windows: Mutex<HashMap<(String, OpClass), Window>>,
}

impl FixedWindowLimiter {
    #[must_use]
    pub fn new(limits: RateLimits) -> Self {
        Self {
            limits,
            windows: Mutex::new(HashMap::new()),
        }
    }

    fn check_at(
        &self,
        account_id: &str,
        class: OpClass,
        now: Instant,
    ) -> Result<(), EngineError> {
        let Some(limit) = self.limits.limit_for(class) else {
            return Ok(());
        };

        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let window = windows
            .entry((account_id.to_string(), class))
            .or_insert(Window {
                started_at: now,
                count: 0,
            });

        if now.duration_since(window.started_at) >= limit.window {
            window.started_at = now;
            window.count = 0;
        }

        if window.count >= limit.max_ops {
            return Err(EngineError::RateLimitExceeded(format!(
                "{account_id}: more than {} {} operations per {:?}",
                limit.max_ops,
                class.as_str(),
                limit.window
            )));
        }

        window.count += 1;
        Ok(())
    }
}

impl RateLimiter for FixedWindowLimiter {
    fn check(&self, account_id: &str, class: OpClass) -> Result<(), EngineError> {
        self.check_at(account_id, class, Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_ops: u32, window_secs: u64) -> FixedWindowLimiter {
        FixedWindowLimiter::new(RateLimits {
            transfer: Some(WindowLimit {
                max_ops,
                window: Duration::from_secs(window_secs),
            }),
            query: None,
        })
    }

    #[test]
    fn allows_up_to_max_then_rejects() {
        let limiter = limiter(3, 60);
        let now = Instant::now();

        for _ in 0..3 {
            limiter.check_at("a", OpClass::Transfer, now).unwrap();
        }
        let err = limiter.check_at("a", OpClass::Transfer, now).unwrap_err();
        assert!(matches!(err, EngineError::RateLimitExceeded(_)));
    }

    #[test]
    fn window_resets_after_elapsing() {
        let limiter = limiter(1, 60);
        let now = Instant::now();

        limiter.check_at("a", OpClass::Transfer, now).unwrap();
        assert!(limiter.check_at("a", OpClass::Transfer, now).is_err());

        let later = now + Duration::from_secs(61);
        limiter.check_at("a", OpClass::Transfer, later).unwrap();
    }

    #[test]
    fn accounts_and_classes_are_independent() {
        let limiter = FixedWindowLimiter::new(RateLimits {
            transfer: Some(WindowLimit {
                max_ops: 1,
                window: Duration::from_secs(60),
            }),
            query: Some(WindowLimit {
                max_ops: 1,
                window: Duration::from_secs(60),
            }),
        });
        let now = Instant::now();

        limiter.check_at("a", OpClass::Transfer, now).unwrap();
        limiter.check_at("b", OpClass::Transfer, now).unwrap();
        limiter.check_at("a", OpClass::Query, now).unwrap();
        assert!(limiter.check_at("a", OpClass::Transfer, now).is_err());
    }

    #[test]
    fn unlimited_class_never_rejects() {
        let limiter = limiter(1, 60);
        let now = Instant::now();

        for _ in 0..100 {
            limiter.check_at("a", OpClass::Query, now).unwrap();
        }
    }
}
