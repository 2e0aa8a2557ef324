//! HTTP request and response values exchanged with a `Transport`.
//!
//! # Design
//! These types describe one unary HTTP exchange as plain data. `RestClient`
//! fills in an `HttpRequest`, a `Transport` turns it into network I/O and
//! hands back an `HttpResponse`. Both are owned by the call that created them
//! and are never shared between calls.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// User agent sent when the caller does not provide one.
pub const DEFAULT_USER_AGENT: &str = concat!("restry/", env!("CARGO_PKG_VERSION"));

pub const CONTENT_TYPE: &str = "Content-Type";
pub const ACCEPT: &str = "Accept";
pub const CONTENT_LENGTH: &str = "Content-Length";
pub const USER_AGENT: &str = "User-Agent";
pub const AUTHORIZATION: &str = "Authorization";

pub const APPLICATION_JSON: &str = "application/json";

/// HTTP method for a request.
///
/// The common methods have their own variants; any other valid token
/// (`TRACE`, `PURGE`, WebDAV verbs) travels as `Extension`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Extension(String),
}

impl HttpMethod {
    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Extension(token) => token.as_str(),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// RFC 9110 `tchar`.
fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c)
}

impl std::str::FromStr for HttpMethod {
    type Err = String;

    /// Case-insensitive; the method is always sent upper-cased.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        let known = match upper.as_str() {
            "GET" => Some(HttpMethod::Get),
            "HEAD" => Some(HttpMethod::Head),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "PATCH" => Some(HttpMethod::Patch),
            "DELETE" => Some(HttpMethod::Delete),
            "OPTIONS" => Some(HttpMethod::Options),
            _ => None,
        };
        match known {
            Some(method) => Ok(method),
            None if upper.is_empty() => Err("empty HTTP method".to_string()),
            None if upper.chars().all(is_token_char) => Ok(HttpMethod::Extension(upper)),
            None => Err(format!("invalid HTTP method: {s:?}")),
        }
    }
}

/// Basic-auth credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }

    fn is_empty(&self) -> bool {
        self.user.is_empty() && self.password.is_empty()
    }

    /// Value for the `Authorization` header.
    pub fn basic_auth_value(&self) -> String {
        let token = STANDARD.encode(format!("{}:{}", self.user, self.password));
        format!("Basic {token}")
    }
}

// Keep the password out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

/// Header list with unique, case-insensitive names.
///
/// Insertion order is kept only so that requests are reproducible; lookups
/// never depend on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|(k, _)| k.eq_ignore_ascii_case(name))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|i| self.0[i].1.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Set `name`, replacing any existing value regardless of case.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(i) => self.0[i] = (name, value),
            None => self.0.push((name, value)),
        }
    }

    /// Set `name` only if the caller has not already set it.
    pub fn insert_default(&mut self, name: &str, value: &str) {
        if !self.contains(name) {
            self.0.push((name.to_string(), value.to_string()));
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.position(name).map(|i| self.0.remove(i).1)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut headers = Headers::new();
        for (k, v) in iter {
            headers.insert(k, v);
        }
        headers
    }
}

/// One outgoing HTTP request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub credentials: Option<Credentials>,
    pub headers: Headers,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            credentials: None,
            headers: Headers::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, url)
    }

    pub fn with_basic_auth(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::new(user, password));
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Apply the wire-level defaults every transport sends.
    ///
    /// An empty body counts as no body. `Content-Length` always reflects the
    /// actual body, whatever the caller put there.
    pub fn finalize(&mut self, user_agent: &str) {
        if self.body.as_ref().is_some_and(|b| b.is_empty()) {
            self.body = None;
        }
        self.headers.insert_default(USER_AGENT, user_agent);
        match &self.body {
            Some(body) => self.headers.insert(CONTENT_LENGTH, body.len().to_string()),
            None => {
                self.headers.remove(CONTENT_LENGTH);
            }
        }
        if let Some(credentials) = self.credentials.as_ref().filter(|c| !c.is_empty()) {
            self.headers.insert(AUTHORIZATION, credentials.basic_auth_value());
        }
    }
}

/// One HTTP response. Immutable once produced by a transport.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_lookup_ignores_case() {
        let mut headers = Headers::new();
        headers.insert("content-type", "text/plain");
        assert_eq!(headers.get("Content-Type"), Some("text/plain"));
        assert!(headers.contains("CONTENT-TYPE"));
    }

    #[test]
    fn headers_insert_replaces_existing_name() {
        let mut headers = Headers::new();
        headers.insert("accept", "text/plain");
        headers.insert("Accept", APPLICATION_JSON);
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("accept"), Some(APPLICATION_JSON));
    }

    #[test]
    fn headers_insert_default_keeps_caller_value() {
        let mut headers: Headers = [("accept", "text/xml")].into_iter().collect();
        headers.insert_default(ACCEPT, APPLICATION_JSON);
        assert_eq!(headers.get(ACCEPT), Some("text/xml"));
        headers.insert_default(CONTENT_TYPE, APPLICATION_JSON);
        assert_eq!(headers.get(CONTENT_TYPE), Some(APPLICATION_JSON));
    }

    #[test]
    fn finalize_overrides_content_length() {
        let mut req = HttpRequest::put("http://localhost/users/7")
            .with_header("content-length", "999")
            .with_body("{\"id\":7}");
        req.finalize(DEFAULT_USER_AGENT);
        assert_eq!(req.headers.get(CONTENT_LENGTH), Some("8"));
        assert_eq!(req.headers.len(), 2);
    }

    #[test]
    fn finalize_sets_user_agent_only_when_absent() {
        let mut req = HttpRequest::get("http://localhost/");
        req.finalize(DEFAULT_USER_AGENT);
        assert_eq!(req.headers.get(USER_AGENT), Some(DEFAULT_USER_AGENT));

        let mut req = HttpRequest::get("http://localhost/").with_header("user-agent", "custom/2.0");
        req.finalize(DEFAULT_USER_AGENT);
        assert_eq!(req.headers.get(USER_AGENT), Some("custom/2.0"));
    }

    #[test]
    fn finalize_drops_empty_body() {
        let mut req = HttpRequest::post("http://localhost/").with_body(Vec::new());
        req.finalize(DEFAULT_USER_AGENT);
        assert!(req.body.is_none());
        assert!(!req.headers.contains(CONTENT_LENGTH));
    }

    #[test]
    fn finalize_strips_content_length_without_body() {
        let mut req = HttpRequest::delete("http://localhost/users/1").with_header("content-length", "12");
        req.finalize(DEFAULT_USER_AGENT);
        assert!(!req.headers.contains(CONTENT_LENGTH));
        assert_eq!(req.headers.len(), 1);
    }

    #[test]
    fn headers_remove_is_case_insensitive() {
        let mut headers: Headers = [("X-Trace", "abc")].into_iter().collect();
        assert_eq!(headers.remove("x-trace").as_deref(), Some("abc"));
        assert_eq!(headers.remove("x-trace"), None);
        assert!(headers.is_empty());
    }

    #[test]
    fn finalize_adds_basic_auth() {
        let mut req = HttpRequest::get("http://localhost/").with_basic_auth("Aladdin", "open sesame");
        req.finalize(DEFAULT_USER_AGENT);
        assert_eq!(
            req.headers.get(AUTHORIZATION),
            Some("Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ==")
        );
    }

    #[test]
    fn finalize_skips_empty_credentials() {
        let mut req = HttpRequest::get("http://localhost/").with_basic_auth("", "");
        req.finalize(DEFAULT_USER_AGENT);
        assert!(!req.headers.contains(AUTHORIZATION));
    }

    #[test]
    fn credentials_debug_hides_password() {
        let debug = format!("{:?}", Credentials::new("bob", "hunter2"));
        assert!(debug.contains("bob"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn method_parses_case_insensitively() {
        assert_eq!("put".parse::<HttpMethod>().unwrap(), HttpMethod::Put);
        assert_eq!("Options".parse::<HttpMethod>().unwrap(), HttpMethod::Options);
    }

    #[test]
    fn other_method_tokens_are_extensions() {
        let method: HttpMethod = "purge".parse().unwrap();
        assert_eq!(method, HttpMethod::Extension("PURGE".to_string()));
        assert_eq!(method.to_string(), "PURGE");
        assert_eq!("TRACE".parse::<HttpMethod>().unwrap().as_str(), "TRACE");
    }

    #[test]
    fn method_rejects_non_tokens() {
        assert!("".parse::<HttpMethod>().is_err());
        assert!("GET /".parse::<HttpMethod>().is_err());
        assert!("BR(E)W".parse::<HttpMethod>().is_err());
    }
}
