use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// How many times an operation may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxAttempts {
    /// Run at most this many times (including the first). Zero never runs.
    Bounded(u32),
    /// Run until success or cancellation.
    Unbounded,
}

impl MaxAttempts {
    /// Map a signed count, where any negative value means unbounded.
    pub fn from_count(count: i64) -> Self {
        if count < 0 {
            MaxAttempts::Unbounded
        } else {
            MaxAttempts::Bounded(u32::try_from(count).unwrap_or(u32::MAX))
        }
    }

    /// The attempt cap, or `None` when unbounded.
    pub fn limit(&self) -> Option<u32> {
        match self {
            MaxAttempts::Bounded(n) => Some(*n),
            MaxAttempts::Unbounded => None,
        }
    }
}

/// Shared flag that stops a retry sequence between attempts.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Fixed-interval retry policy.
///
/// Read-only to the harness; one policy can drive any number of `execute`
/// calls.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    interval: Duration,
    max_attempts: MaxAttempts,
    suppress_final_panic: bool,
    label: Option<String>,
    cancel: Option<CancelToken>,
}

impl RetryPolicy {
    /// New policy. Panics are converted to failures on every attempt,
    /// including the last, until `suppress_final_panic(false)` is set.
    pub fn new(interval: Duration, max_attempts: MaxAttempts) -> Self {
        Self {
            interval,
            max_attempts,
            suppress_final_panic: true,
            label: None,
            cancel: None,
        }
    }

    /// Bounded policy with `attempts` tries spaced `interval_secs` apart.
    pub fn fixed(interval_secs: u64, attempts: u32) -> Self {
        Self::new(Duration::from_secs(interval_secs), MaxAttempts::Bounded(attempts))
    }

    /// Retry forever, `interval_secs` apart.
    pub fn forever(interval_secs: u64) -> Self {
        Self::new(Duration::from_secs(interval_secs), MaxAttempts::Unbounded)
    }

    /// When false, a panic on the last bounded attempt propagates out of
    /// `execute` instead of being reported as a failure.
    pub fn suppress_final_panic(mut self, suppress: bool) -> Self {
        self.suppress_final_panic = suppress;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn max_attempts(&self) -> MaxAttempts {
        self.max_attempts
    }

    pub fn suppresses_final_panic(&self) -> bool {
        self.suppress_final_panic
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_counts_are_unbounded() {
        assert_eq!(MaxAttempts::from_count(-1), MaxAttempts::Unbounded);
        assert_eq!(MaxAttempts::from_count(i64::MIN), MaxAttempts::Unbounded);
        assert_eq!(MaxAttempts::from_count(0), MaxAttempts::Bounded(0));
        assert_eq!(MaxAttempts::from_count(7), MaxAttempts::Bounded(7));
    }

    #[test]
    fn limit_is_none_only_when_unbounded() {
        assert_eq!(MaxAttempts::Unbounded.limit(), None);
        assert_eq!(MaxAttempts::Bounded(0).limit(), Some(0));
        assert_eq!(MaxAttempts::from_count(3).limit(), Some(3));
    }

    #[test]
    fn huge_counts_saturate() {
        assert_eq!(
            MaxAttempts::from_count(i64::MAX),
            MaxAttempts::Bounded(u32::MAX)
        );
    }

    #[test]
    fn cancel_token_is_shared_between_clones() {
        let token = CancelToken::new();
        let policy = RetryPolicy::forever(0).with_cancel_token(token.clone());
        assert!(!policy.is_cancelled());
        token.cancel();
        assert!(policy.is_cancelled());
    }

    #[test]
    fn builder_sets_fields() {
        let policy = RetryPolicy::fixed(3, 4)
            .suppress_final_panic(false)
            .with_label("deploying");
        assert_eq!(policy.interval(), Duration::from_secs(3));
        assert_eq!(policy.max_attempts(), MaxAttempts::Bounded(4));
        assert!(!policy.suppresses_final_panic());
        assert_eq!(policy.label(), Some("deploying"));
    }
}
