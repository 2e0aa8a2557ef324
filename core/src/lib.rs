//! Blocking REST calls with echo detection, plus a retry harness.
//!
//! # Overview
//! `RestClient` performs one typed HTTP exchange over a `Transport`: the
//! input value is sent as JSON, the response is decoded into the caller's
//! output type, and the result reports the status and whether the server
//! echoed the input back. `RetryPolicy` re-runs any fallible operation, such
//! as a `RestClient` call, at a fixed interval and treats panics as failed
//! attempts.
//!
//! # Design
//! - The two halves are independent: a client call never retries, and the
//!   harness knows nothing about HTTP.
//! - `Transport` is a trait; `UreqTransport` is the real one, and any
//!   `Fn(&HttpRequest) -> Result<HttpResponse, TransportError>` works as a stub.
//! - Echo detection compares decoded values with `PartialEq`, never bytes.
//! - Everything is synchronous and runs on the caller's thread.

pub mod client;
pub mod codec;
pub mod config;
pub mod echo;
pub mod error;
pub mod http;
pub mod logging;
pub mod retry;
pub mod transport;
pub mod types;

pub use client::RestClient;
pub use config::{Config, RetryConfig, TransportConfig};
pub use error::{CallError, ConfigError, TransportError};
pub use http::{Credentials, Headers, HttpMethod, HttpRequest, HttpResponse};
pub use retry::{
    Attempt, AttemptOutcome, CancelToken, FailureDetail, MaxAttempts, RetryOutcome, RetryPolicy,
    RetryState,
};
pub use transport::{Transport, UreqTransport};
pub use types::{CallResult, EchoCheck};
