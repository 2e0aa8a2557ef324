//! Blocking HTTP transports.
//!
//! # Design
//! `Transport` is the only place network I/O happens. `RestClient` builds an
//! `HttpRequest` and hands it over; the transport applies wire defaults
//! (`HttpRequest::finalize`), performs one exchange and returns the status,
//! headers and body as data. Status codes are never turned into errors here.
//!
//! A transport is used from one thread of control at a time. Sharing one
//! across threads is the caller's business.

use std::time::Duration;

use ureq::Agent;

use crate::config::TransportConfig;
use crate::error::TransportError;
use crate::http::{Headers, HttpRequest, HttpResponse, CONTENT_LENGTH};

/// Performs one request/response exchange.
pub trait Transport {
    fn exchange(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Any matching closure is a transport, which keeps tests and stubs cheap.
impl<F> Transport for F
where
    F: Fn(&HttpRequest) -> Result<HttpResponse, TransportError>,
{
    fn exchange(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self(request)
    }
}

/// Transport backed by a `ureq` agent.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
    persist_cookies: bool,
    user_agent: String,
    max_response_bytes: Option<u64>,
}

impl UreqTransport {
    pub fn open(config: &TransportConfig) -> Self {
        tracing::debug!(
            persist_cookies = config.persist_cookies,
            follow_redirects = config.follow_redirects,
            "opening HTTP transport"
        );

        let mut builder = Agent::config_builder()
            .http_status_as_error(false)
            .allow_non_standard_methods(true);
        if !config.follow_redirects {
            builder = builder.max_redirects(0);
        }
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout_global(Some(Duration::from_secs(secs)));
        }

        Self {
            agent: builder.build().new_agent(),
            persist_cookies: config.persist_cookies,
            user_agent: config.user_agent.clone(),
            max_response_bytes: config.max_response_bytes,
        }
    }

    fn forget_cookies(&self) {
        if !self.persist_cookies {
            self.agent.cookie_jar_lock().clear();
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::open(&TransportConfig::default())
    }
}

impl Transport for UreqTransport {
    fn exchange(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut request = request.clone();
        request.finalize(&self.user_agent);
        tracing::debug!("HTTP {} {}", request.method, request.url);

        let mut builder = ureq::http::Request::builder()
            .method(request.method.as_str())
            .uri(request.url.as_str());
        // ureq derives Content-Length from the sized body itself.
        for (name, value) in request.headers.iter() {
            if !name.eq_ignore_ascii_case(CONTENT_LENGTH) {
                builder = builder.header(name, value);
            }
        }

        let result = match request.body {
            Some(body) => {
                tracing::trace!(body = %String::from_utf8_lossy(&body), "request body");
                let req = builder
                    .body(body)
                    .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
                self.agent.run(req)
            }
            None => {
                let req = builder
                    .body(())
                    .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
                self.agent.run(req)
            }
        };
        let mut response = match result {
            Ok(response) => response,
            Err(e) => {
                self.forget_cookies();
                return Err(e.into());
            }
        };

        let status = response.status().as_u16();
        let mut headers = Headers::new();
        for (name, value) in response.headers() {
            if headers.contains(name.as_str()) {
                continue;
            }
            if let Ok(value) = value.to_str() {
                headers.insert(name.as_str(), value);
            }
        }
        // No cap unless configured; ureq's own default stops at 10 MB.
        let body = response
            .body_mut()
            .with_config()
            .limit(self.max_response_bytes.unwrap_or(u64::MAX))
            .read_to_vec();
        self.forget_cookies();
        let body = body.map_err(|e| TransportError::Body(e.to_string()))?;
        tracing::trace!(status, body = %String::from_utf8_lossy(&body), "response body");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
