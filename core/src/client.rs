//! Typed REST calls over a `Transport`.
//!
//! # Design
//! `RestClient` owns a transport and nothing else that changes between
//! calls. A call marshals the optional input to JSON, fills in the JSON
//! `Content-Type`/`Accept` defaults, runs one exchange and decodes the
//! response into the caller's output slot. When there is an input but no
//! output slot, the response is decoded into a scratch value of the input's
//! own type so that the client can report whether the server echoed the
//! input back. The scratch value is dropped after the comparison.
//!
//! A call fails fast: encoding, decoding and transport errors are returned
//! immediately. Non-2xx statuses are data. Retrying belongs to
//! `RetryPolicy`.

use std::any::Any;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec;
use crate::echo;
use crate::error::CallError;
use crate::http::{HttpRequest, HttpResponse, ACCEPT, APPLICATION_JSON, CONTENT_TYPE};
use crate::transport::Transport;
use crate::types::{CallResult, EchoCheck};

/// Synchronous REST client.
#[derive(Debug, Clone)]
pub struct RestClient<T> {
    transport: T,
    echo_check: EchoCheck,
}

impl<T: Transport> RestClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            echo_check: EchoCheck::default(),
        }
    }

    pub fn with_echo_check(mut self, echo_check: EchoCheck) -> Self {
        self.echo_check = echo_check;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Perform one typed call.
    ///
    /// `input` is sent as the JSON body, replacing any body on `request`.
    /// `output`, when given, receives the decoded response. With an input,
    /// `echo` reports whether the decoded response equals it; an output of a
    /// different type than the input is never considered an echo.
    pub fn call<I, O>(
        &self,
        request: HttpRequest,
        input: Option<&I>,
        output: Option<&mut O>,
    ) -> Result<CallResult, CallError>
    where
        I: Serialize + DeserializeOwned + PartialEq + 'static,
        O: DeserializeOwned + 'static,
    {
        let mut request = request;
        if let Some(value) = input {
            request.body = Some(codec::marshal(value)?);
            request.headers.insert_default(CONTENT_TYPE, APPLICATION_JSON);
        }
        if input.is_some() || output.is_some() {
            request.headers.insert_default(ACCEPT, APPLICATION_JSON);
        }

        let response = self.transport.exchange(&request)?;

        let echo = match (input, output) {
            (None, None) => false,
            (None, Some(slot)) => {
                codec::unmarshal_into(&response.body, slot)?;
                false
            }
            (Some(value), Some(slot)) => {
                codec::unmarshal_into(&response.body, slot)?;
                same_value(value, &*slot)
            }
            (Some(value), None) => match self.echo_check {
                EchoCheck::AgainstInputShape => {
                    let scratch: I = codec::unmarshal(&response.body)?;
                    echo::equal(value, &scratch)
                }
                EchoCheck::Disabled => false,
            },
        };

        tracing::debug!(
            method = %request.method,
            url = %request.url,
            status = response.status,
            echo,
            "call completed"
        );
        Ok(CallResult {
            status: response.status,
            echo,
        })
    }

    /// Send `request` as-is and return the raw response.
    pub fn exchange(&self, request: &HttpRequest) -> Result<HttpResponse, CallError> {
        Ok(self.transport.exchange(request)?)
    }

    /// Call without input and decode the response into a fresh `O`.
    pub fn fetch<O>(&self, request: HttpRequest) -> Result<(CallResult, O), CallError>
    where
        O: DeserializeOwned + Default + 'static,
    {
        let mut output = O::default();
        let result = self.call::<(), O>(request, None, Some(&mut output))?;
        Ok((result, output))
    }

    /// Send `input` and report whether the server echoed it.
    pub fn submit<I>(&self, request: HttpRequest, input: &I) -> Result<CallResult, CallError>
    where
        I: Serialize + DeserializeOwned + PartialEq + 'static,
    {
        self.call::<I, I>(request, Some(input), None)
    }
}

/// Equality across possibly different types: values of different types are
/// never equal.
fn same_value<I, O>(input: &I, output: &O) -> bool
where
    I: PartialEq + 'static,
    O: 'static,
{
    (output as &dyn Any)
        .downcast_ref::<I>()
        .is_some_and(|output| echo::equal(input, output))
}
