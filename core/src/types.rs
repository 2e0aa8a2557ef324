//! Result and option types for REST calls.

/// Outcome of a completed REST call.
///
/// `echo` is only ever true when the call carried an input value and the
/// decoded response was structurally equal to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallResult {
    pub status: u16,
    pub echo: bool,
}

impl CallResult {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// How a call with an input but no output slot checks for an echo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EchoCheck {
    /// Decode the response into a scratch value of the input's type and
    /// compare. A response of a different shape fails the call with a
    /// decoding error.
    #[default]
    AgainstInputShape,
    /// Skip the scratch decode; `echo` stays false.
    Disabled,
}
