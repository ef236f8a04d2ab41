//! Client for the key-value relay that backs live mission sharing. The
//! relay speaks webdis-style HTTP: every command is a GET with the command
//! and its arguments as path segments, and every response is a one-key JSON
//! object named after the command. Channel setup, teardown and publishing
//! go through server-side scripts invoked by hash (`EVALSHA`); the hashes
//! themselves are fetched once per session from the `scripts` key.
//!
//! Everything in this module is pure string work so it runs under plain
//! `cargo test`; the actual HTTP transport lives behind the wasm boundary.

use std::error::Error;
use std::fmt;

use serde_json::Value;

/// Channel keys live under this prefix on the relay.
const CHANNEL_PREFIX: &str = "stream:";

/// The relay reported a failure or returned something unreadable. Never
/// affects local mission state; the shell shows it as a transient error.
#[derive(Clone, PartialEq, Debug)]
pub struct RelayError(pub String);

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "relay error: {}", self.0)
    }
}

impl Error for RelayError {}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Status {
    Success,
    Failure,
}

/// Result of one relay script call: `["SUCCESS"|"FAILURE", message?, payload?]`.
#[derive(Clone, PartialEq, Debug)]
pub struct Outcome {
    pub status: Status,
    pub message: Option<String>,
    pub payload: Option<String>,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}

/// Server-side script hashes, fetched once per session via HMGET.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Scripts {
    pub get_channel: String,
    pub publish_state: String,
    pub new_stream: String,
    pub get_reconnect: String,
}

impl Scripts {
    /// Field names on the relay's `scripts` hash, in HMGET order.
    pub const FIELDS: [&'static str; 4] =
        ["getChannel", "publishState", "newStream", "getReconnect"];

    /// Values come back in [`Scripts::FIELDS`] order; any missing hash fails
    /// the whole handshake.
    pub fn from_values(values: Vec<Option<String>>) -> Result<Scripts, RelayError> {
        match <[Option<String>; 4]>::try_from(values) {
            Ok([Some(get_channel), Some(publish_state), Some(new_stream), Some(get_reconnect)]) => {
                Ok(Scripts {
                    get_channel,
                    publish_state,
                    new_stream,
                    get_reconnect,
                })
            }
            _ => Err(RelayError("script hashes missing from relay".to_string())),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Relay {
    host: String,
    pub scripts: Scripts,
}

impl Relay {
    pub fn new(host: &str) -> Relay {
        Relay {
            host: host.trim_end_matches('/').to_string(),
            scripts: Scripts::default(),
        }
    }

    /// Arguments are appended verbatim; callers [`escape`] anything that is
    /// not already URL-safe.
    pub fn evalsha_url(&self, script: &str, args: &[&str]) -> String {
        let mut url = format!("{}/EVALSHA/{}/0", self.host, script);
        for arg in args {
            url.push('/');
            url.push_str(arg);
        }
        url
    }

    pub fn hmget_url(&self, key: &str, fields: &[&str]) -> String {
        let mut url = format!("{}/HMGET/{}", self.host, key);
        for field in fields {
            url.push('/');
            url.push_str(field);
        }
        url
    }

    pub fn keys_url(&self, pattern: &str) -> String {
        format!("{}/KEYS/{}", self.host, pattern)
    }

    pub fn channel_list_url(&self) -> String {
        self.keys_url(&format!("{}*", CHANNEL_PREFIX))
    }

    pub fn subscribe_url(&self, channel: &str) -> String {
        format!("{}/SUBSCRIBE/{}", self.host, channel)
    }

    pub fn unsubscribe_url(&self, channel: &str) -> String {
        format!("{}/UNSUBSCRIBE/{}", self.host, channel)
    }
}

/// Percent-encode everything outside the RFC 3986 unreserved set, so a
/// serialized mission can ride in a URL path segment. The relay decodes
/// segments before storing them.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// Channel keys are listed as `stream:<name>`; the UI shows just the name.
pub fn display_name(key: &str) -> &str {
    key.strip_prefix(CHANNEL_PREFIX).unwrap_or(key)
}

fn reply_array<'a>(body: &'a Value, command: &str) -> Result<&'a Vec<Value>, RelayError> {
    body.get(command)
        .and_then(Value::as_array)
        .ok_or_else(|| RelayError(format!("no {} reply", command)))
}

fn parse_body(body: &str) -> Result<Value, RelayError> {
    serde_json::from_str(body).map_err(|err| RelayError(err.to_string()))
}

/// `{"EVALSHA": ["SUCCESS"|"FAILURE", message?, payload?]}`.
pub fn parse_evalsha(body: &str) -> Result<Outcome, RelayError> {
    let body = parse_body(body)?;
    let reply = reply_array(&body, "EVALSHA")?;
    let status = match reply.first().and_then(Value::as_str) {
        Some("SUCCESS") => Status::Success,
        _ => Status::Failure,
    };
    Ok(Outcome {
        status,
        message: reply.get(1).and_then(Value::as_str).map(str::to_string),
        payload: reply.get(2).and_then(Value::as_str).map(str::to_string),
    })
}

/// `{"KEYS": ["stream:a", ...]}` — the raw channel keys.
pub fn parse_keys(body: &str) -> Result<Vec<String>, RelayError> {
    let body = parse_body(body)?;
    let reply = reply_array(&body, "KEYS")?;
    Ok(reply
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect())
}

/// `{"HMGET": [...]}` — one value per requested field, null when missing.
pub fn parse_hmget(body: &str) -> Result<Vec<Option<String>>, RelayError> {
    let body = parse_body(body)?;
    let reply = reply_array(&body, "HMGET")?;
    Ok(reply
        .iter()
        .map(|value| value.as_str().map(str::to_string))
        .collect())
}

/// One chunk of a SUBSCRIBE stream: `{"SUBSCRIBE": [kind, channel, payload]}`.
/// The payload is the published state, except for the integer handshake that
/// acknowledges the subscription — that yields `None`.
pub fn parse_subscribe_chunk(body: &str) -> Result<Option<String>, RelayError> {
    let body = parse_body(body)?;
    let reply = reply_array(&body, "SUBSCRIBE")?;
    Ok(reply.get(2).and_then(Value::as_str).map(str::to_string))
}
