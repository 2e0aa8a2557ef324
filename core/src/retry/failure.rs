//! Per-attempt results and failure payloads.

use std::any::Any;
use std::error::Error;
use std::fmt;

/// Why the most recent attempt aborted.
pub enum FailureDetail {
    /// The operation panicked; holds the panic payload.
    Panic(Box<dyn Any + Send + 'static>),
    /// The operation returned `Err`.
    Error(Box<dyn Error + Send + Sync + 'static>),
}

impl FailureDetail {
    /// Human-readable description of the failure.
    pub fn message(&self) -> String {
        match self {
            FailureDetail::Panic(payload) => payload_message(payload.as_ref()),
            FailureDetail::Error(e) => e.to_string(),
        }
    }

    pub fn is_panic(&self) -> bool {
        matches!(self, FailureDetail::Panic(_))
    }

    /// Borrow the panic payload as a concrete type.
    pub fn panic_payload<T: Any>(&self) -> Option<&T> {
        match self {
            FailureDetail::Panic(payload) => payload.downcast_ref::<T>(),
            FailureDetail::Error(_) => None,
        }
    }

    /// Borrow the returned error as a concrete type.
    pub fn error_ref<E: Error + 'static>(&self) -> Option<&E> {
        match self {
            FailureDetail::Panic(_) => None,
            FailureDetail::Error(e) => e.downcast_ref::<E>(),
        }
    }
}

impl fmt::Debug for FailureDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureDetail::Panic(_) => f.debug_tuple("Panic").field(&self.message()).finish(),
            FailureDetail::Error(e) => f.debug_tuple("Error").field(e).finish(),
        }
    }
}

impl fmt::Display for FailureDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureDetail::Panic(_) => write!(f, "panic: {}", self.message()),
            FailureDetail::Error(e) => write!(f, "{e}"),
        }
    }
}

/// Text of a panic raised with `panic!("...")` or `panic!("{}", ..)`.
pub(crate) fn payload_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Result of one attempt.
#[derive(Debug)]
pub struct AttemptOutcome {
    pub succeeded: bool,
    pub failure: Option<FailureDetail>,
}

impl AttemptOutcome {
    pub fn success() -> Self {
        Self {
            succeeded: true,
            failure: None,
        }
    }

    pub fn failed() -> Self {
        Self {
            succeeded: false,
            failure: None,
        }
    }

    pub fn aborted(detail: FailureDetail) -> Self {
        Self {
            succeeded: false,
            failure: Some(detail),
        }
    }
}

/// Anything an operation may return to report how an attempt went.
pub trait Attempt {
    fn into_outcome(self) -> AttemptOutcome;
}

impl Attempt for bool {
    fn into_outcome(self) -> AttemptOutcome {
        if self {
            AttemptOutcome::success()
        } else {
            AttemptOutcome::failed()
        }
    }
}

impl<E> Attempt for Result<bool, E>
where
    E: Error + Send + Sync + 'static,
{
    fn into_outcome(self) -> AttemptOutcome {
        match self {
            Ok(ok) => ok.into_outcome(),
            Err(e) => AttemptOutcome::aborted(FailureDetail::Error(Box::new(e))),
        }
    }
}

impl Attempt for AttemptOutcome {
    fn into_outcome(self) -> AttemptOutcome {
        self
    }
}
