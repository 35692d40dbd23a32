//! Local limiter for operator-requested refreshes
//!
//! Separate from upstream rate limiting: this caps how often a person can
//! force a full repopulation, with an escalating wait inside a rolling
//! window.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;

use crate::config::RefreshPolicy;

/// Outcome of a manual refresh request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum RefreshDecision {
    Allowed,
    Denied {
        #[serde(with = "duration_secs")]
        retry_after: Duration,
    },
}

impl RefreshDecision {
    #[cfg(test)]
    pub fn is_allowed(&self) -> bool {
        matches!(self, RefreshDecision::Allowed)
    }
}

mod duration_secs {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }
}

/// Refresh bookkeeping, guarded alongside the catalog index.
#[derive(Debug, Clone, Default)]
pub struct RefreshState {
    last_refresh: Option<Instant>,
    last_refresh_at: Option<DateTime<Utc>>,
    calls_in_window: u32,
    window_start: Option<Instant>,
}

impl RefreshState {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the catalog is fresh as of `now` without counting a
    /// manual call.
    pub fn mark_refreshed(&mut self, now: Instant) {
        self.last_refresh = Some(now);
        self.last_refresh_at = Some(Utc::now());
    }

    pub fn last_refresh_at(&self) -> Option<DateTime<Utc>> {
        self.last_refresh_at
    }

    pub fn calls_in_window(&self) -> u32 {
        self.calls_in_window
    }

    /// Decide a manual refresh request at `now`.
    ///
    /// An expired window is rolled first. A denial leaves the counter and
    /// the last refresh time untouched; an approval bumps both.
    pub fn evaluate(&mut self, policy: &RefreshPolicy, now: Instant) -> RefreshDecision {
        let window_expired = self
            .window_start
            .is_none_or(|start| now.saturating_duration_since(start) > policy.window);
        if window_expired {
            self.calls_in_window = 0;
            self.window_start = Some(now);
        }

        let min_wait = policy.base_wait + policy.step_wait * self.calls_in_window;
        let remaining_wait = self
            .last_refresh
            .map(|last| min_wait.saturating_sub(now.saturating_duration_since(last)))
            .unwrap_or(Duration::ZERO);
        let capped = self.calls_in_window >= policy.max_calls;

        if !remaining_wait.is_zero() || capped {
            let window_left = if capped {
                self.window_start
                    .map(|start| policy.window.saturating_sub(now.saturating_duration_since(start)))
                    .unwrap_or(Duration::ZERO)
            } else {
                Duration::ZERO
            };
            let retry_after = match remaining_wait.max(window_left) {
                d if d.is_zero() => policy.base_wait,
                d => d,
            };
            return RefreshDecision::Denied { retry_after };
        }

        self.calls_in_window += 1;
        self.mark_refreshed(now);
        RefreshDecision::Allowed
    }
}
