use anyhow::{Context, Result};
use clap::Args;
use restry_core::{
    CallError, Config, HttpMethod, HttpRequest, RestClient, RetryConfig, RetryOutcome,
    RetryPolicy, TransportConfig, UreqTransport,
};
use serde_json::Value;

/// Exit code when every attempt failed.
const EXIT_EXHAUSTED: i32 = 2;

#[derive(Debug, Args)]
pub struct CallArgs {
    /// HTTP method (GET, PUT, POST, ...).
    pub method: HttpMethod,

    /// Target URL.
    pub url: String,

    /// JSON request body; enables echo detection. Without it the response
    /// body is passed through as-is.
    #[arg(long, value_name = "JSON")]
    pub data: Option<String>,

    /// Extra request header, `Name: value`. Repeatable.
    #[arg(short = 'H', long = "header", value_name = "HEADER", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Basic-auth user.
    #[arg(long)]
    pub user: Option<String>,

    /// Basic-auth password.
    #[arg(long)]
    pub password: Option<String>,

    /// Attempts including the first; negative retries forever.
    #[arg(long, allow_negative_numbers = true, value_name = "N")]
    pub attempts: Option<i64>,

    /// Seconds between attempts.
    #[arg(long, value_name = "SECS")]
    pub interval: Option<u64>,

    /// Label for per-attempt log lines (default: method and URL).
    #[arg(long)]
    pub label: Option<String>,

    /// Status that counts as success (default: any 2xx).
    #[arg(long, value_name = "CODE")]
    pub expect_status: Option<u16>,

    /// Return 3xx responses instead of following them.
    #[arg(long)]
    pub no_follow_redirects: bool,

    /// Keep cookies between attempts.
    #[arg(long)]
    pub cookies: bool,
}

fn parse_header(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once(':')
        .ok_or_else(|| format!("expected `Name: value`, got `{s}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty header name in `{s}`"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

impl CallArgs {
    pub fn transport_config(&self, base: &TransportConfig) -> TransportConfig {
        let mut cfg = base.clone();
        if self.no_follow_redirects {
            cfg.follow_redirects = false;
        }
        if self.cookies {
            cfg.persist_cookies = true;
        }
        cfg
    }

    pub fn retry_policy(&self, base: &RetryConfig) -> RetryPolicy {
        let mut cfg = base.clone();
        if let Some(attempts) = self.attempts {
            cfg.max_attempts = attempts;
        }
        if let Some(interval) = self.interval {
            cfg.interval_secs = interval;
        }
        cfg.label = self
            .label
            .clone()
            .or(cfg.label)
            .or_else(|| Some(format!("{} {}", self.method, self.url)));
        RetryPolicy::from(&cfg)
    }

    pub fn request(&self) -> HttpRequest {
        let mut request = HttpRequest::new(self.method.clone(), &self.url);
        for (name, value) in &self.headers {
            request.headers.insert(name.as_str(), value.as_str());
        }
        if self.user.is_some() || self.password.is_some() {
            request = request.with_basic_auth(
                self.user.clone().unwrap_or_default(),
                self.password.clone().unwrap_or_default(),
            );
        }
        request
    }

    pub fn accepts(&self, status: u16) -> bool {
        match self.expect_status {
            Some(expected) => status == expected,
            None => (200..300).contains(&status),
        }
    }
}

/// Body of the last completed exchange.
#[derive(Debug, PartialEq)]
pub enum ReplyBody {
    Json(Value),
    /// Empty or not JSON; passed through untouched.
    Raw(Vec<u8>),
}

impl ReplyBody {
    fn from_bytes(bytes: Vec<u8>) -> Self {
        if bytes.is_empty() {
            return ReplyBody::Raw(bytes);
        }
        match serde_json::from_slice(&bytes) {
            Ok(value) => ReplyBody::Json(value),
            Err(_) => ReplyBody::Raw(bytes),
        }
    }
}

#[derive(Debug)]
pub struct Reply {
    pub status: u16,
    /// Only known when `--data` was sent.
    pub echo: Option<bool>,
    pub body: ReplyBody,
}

#[derive(Debug)]
pub struct CallReport {
    pub outcome: RetryOutcome,
    /// The final attempt's reply; `None` when that attempt failed outright.
    pub reply: Option<Reply>,
}

/// Run the call under the retry policy without printing anything.
pub fn perform(cfg: &Config, args: &CallArgs) -> Result<CallReport> {
    let input: Option<Value> = args
        .data
        .as_deref()
        .map(serde_json::from_str::<Value>)
        .transpose()
        .context("--data is not valid JSON")?;

    let client = RestClient::new(UreqTransport::open(&args.transport_config(&cfg.transport)));
    let request = args.request();
    let policy = args.retry_policy(&cfg.retry);

    let mut reply: Option<Reply> = None;
    let outcome = policy.execute(|| -> Result<bool, CallError> {
        reply = None;
        let current = match &input {
            Some(value) => {
                let mut output = Value::Null;
                let result = client.call(request.clone(), Some(value), Some(&mut output))?;
                Reply {
                    status: result.status,
                    echo: Some(result.echo),
                    body: ReplyBody::Json(output),
                }
            }
            None => {
                let response = client.exchange(&request)?;
                Reply {
                    status: response.status,
                    echo: None,
                    body: ReplyBody::from_bytes(response.body),
                }
            }
        };
        let accepted = args.accepts(current.status);
        if !accepted {
            tracing::warn!(status = current.status, "unexpected status");
        }
        reply = Some(current);
        Ok(accepted)
    });

    Ok(CallReport { outcome, reply })
}

pub fn run_call(cfg: &Config, args: &CallArgs) -> Result<i32> {
    let CallReport { outcome, reply } = perform(cfg, args)?;

    if let Some(reply) = &reply {
        println!("status: {}", reply.status);
        if let Some(echo) = reply.echo {
            println!("echo: {echo}");
        }
        match &reply.body {
            ReplyBody::Json(value) => println!("{}", serde_json::to_string_pretty(value)?),
            ReplyBody::Raw(bytes) if bytes.is_empty() => {}
            ReplyBody::Raw(bytes) => println!("{}", String::from_utf8_lossy(bytes)),
        }
    }
    if let Some(detail) = &outcome.last_failure {
        eprintln!("last failure: {detail}");
    }

    if outcome.succeeded() {
        Ok(0)
    } else {
        eprintln!("gave up after {} attempt(s)", outcome.attempts);
        Ok(EXIT_EXHAUSTED)
    }
}
