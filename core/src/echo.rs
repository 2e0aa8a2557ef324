//! Structural equality used to detect echoed resources.
//!
//! # Design
//! Many REST backends answer a write with the stored resource. Comparing the
//! submitted value with the decoded response tells a caller whether the
//! write was accepted as-is. The comparison is type-directed: it runs on
//! decoded values through `PartialEq`, never on bytes, so field order,
//! number formatting and map ordering in the payload do not matter.

use std::fmt;

/// Deep structural equality of two values of the same type.
pub fn equal<T: PartialEq + ?Sized>(a: &T, b: &T) -> bool {
    a == b
}

/// A failed expectation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub name: String,
    pub expected: String,
    pub actual: String,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Expected {} to be {}, got {}",
            self.name, self.expected, self.actual
        )
    }
}

impl std::error::Error for Mismatch {}

/// Compare `actual` against `expected`, describing any difference.
pub fn check<T>(expected: &T, actual: &T, name: &str) -> Result<(), Mismatch>
where
    T: PartialEq + fmt::Debug + ?Sized,
{
    if equal(expected, actual) {
        return Ok(());
    }
    Err(Mismatch {
        name: name.to_string(),
        expected: format!("{expected:?}"),
        actual: format!("{actual:?}"),
    })
}

/// Like [`check`], but panics on mismatch.
///
/// Meant for operations run under a `RetryPolicy`, where the panic becomes a
/// failed attempt carrying the mismatch message.
#[track_caller]
pub fn expect<T>(expected: &T, actual: &T, name: &str)
where
    T: PartialEq + fmt::Debug + ?Sized,
{
    if let Err(mismatch) = check(expected, actual, name) {
        panic!("{mismatch}");
    }
}
