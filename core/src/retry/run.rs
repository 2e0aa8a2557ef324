//! Retry loop: run an operation until it succeeds or the policy says stop.

use std::backtrace::Backtrace;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use super::failure::{payload_message, Attempt, AttemptOutcome, FailureDetail};
use super::policy::RetryPolicy;

/// Terminal state of a retry sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    /// An attempt reported success.
    Succeeded,
    /// Every allowed attempt failed.
    Exhausted,
    /// The policy's cancel token fired before success.
    Cancelled,
}

/// What `RetryPolicy::execute` hands back.
#[derive(Debug)]
pub struct RetryOutcome {
    pub state: RetryState,
    /// Number of times the operation ran.
    pub attempts: u64,
    /// Failure payload of the last attempt, if it aborted.
    pub last_failure: Option<FailureDetail>,
}

impl RetryOutcome {
    pub fn succeeded(&self) -> bool {
        self.state == RetryState::Succeeded
    }

    /// `(success, last failure)` pair.
    pub fn into_parts(self) -> (bool, Option<FailureDetail>) {
        (self.succeeded(), self.last_failure)
    }
}

impl RetryPolicy {
    /// Run `operation` under this policy, blocking between attempts.
    ///
    /// # Panics
    /// Re-raises the operation's panic from the last bounded attempt when
    /// the policy does not suppress it.
    pub fn execute<F, A>(&self, operation: F) -> RetryOutcome
    where
        F: FnMut() -> A,
        A: Attempt,
    {
        self.execute_with_sleep(std::thread::sleep, operation)
    }

    /// Like [`execute`](Self::execute) with a caller-supplied sleep.
    pub fn execute_with_sleep<S, F, A>(&self, mut sleep: S, mut operation: F) -> RetryOutcome
    where
        S: FnMut(Duration),
        F: FnMut() -> A,
        A: Attempt,
    {
        let mut remaining = self.max_attempts().limit();
        let mut attempts: u64 = 0;
        let mut last_failure = None;

        while remaining.map_or(true, |n| n > 0) {
            if self.is_cancelled() {
                return self.finish(RetryState::Cancelled, attempts, last_failure);
            }
            attempts += 1;
            self.log_attempt(attempts, remaining);

            let is_final = remaining == Some(1);
            let outcome = match panic::catch_unwind(AssertUnwindSafe(&mut operation)) {
                Ok(result) => result.into_outcome(),
                Err(payload) => {
                    if is_final && !self.suppresses_final_panic() {
                        tracing::error!(
                            backtrace = %Backtrace::force_capture(),
                            "panic while {} on final attempt: {}",
                            self.describe(),
                            payload_message(payload.as_ref())
                        );
                        panic::resume_unwind(payload);
                    }
                    AttemptOutcome::aborted(FailureDetail::Panic(payload))
                }
            };

            if outcome.succeeded {
                return self.finish(RetryState::Succeeded, attempts, None);
            }
            if let Some(detail) = &outcome.failure {
                tracing::warn!(attempt = attempts, "failure while {}: {}", self.describe(), detail);
            }
            last_failure = outcome.failure;

            if let Some(n) = remaining.as_mut() {
                *n -= 1;
            }
            if remaining.map_or(true, |n| n > 0) {
                if self.is_cancelled() {
                    return self.finish(RetryState::Cancelled, attempts, last_failure);
                }
                sleep(self.interval());
            }
        }

        self.finish(RetryState::Exhausted, attempts, last_failure)
    }

    fn describe(&self) -> &str {
        self.label().unwrap_or("running operation")
    }

    fn log_attempt(&self, attempt: u64, remaining: Option<u32>) {
        let Some(label) = self.label() else {
            return;
        };
        match remaining {
            Some(left) => tracing::info!(attempt, "{label} ({left} attempts left)"),
            None => tracing::info!(attempt, "{label} (try {attempt})"),
        }
    }

    fn finish(
        &self,
        state: RetryState,
        attempts: u64,
        last_failure: Option<FailureDetail>,
    ) -> RetryOutcome {
        tracing::debug!(?state, attempts, "retry sequence finished");
        RetryOutcome {
            state,
            attempts,
            last_failure,
        }
    }
}
