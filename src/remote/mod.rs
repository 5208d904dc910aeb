//! Failure taxonomy for remote model services.
//!
//! Every backend converts its transport/provider errors into a [`RemoteError`] at the call
//! boundary. Callers then dispatch on [`RemoteError::class`] only.

use std::time::Duration;
use thiserror::Error;

#[cfg(test)]
mod tests;

/// Retry class of a remote failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Request or deployment is wrong; retrying the same model cannot help.
    Config,
    /// Expected to clear up on retry (timeouts, rate limits, server faults).
    Transient,
}

impl ErrorClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorClass::Config => "config_error",
            ErrorClass::Transient => "transient_error",
        }
    }

    #[inline]
    pub fn is_transient(&self) -> bool {
        matches!(self, ErrorClass::Transient)
    }
}

impl std::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything that can report its [`ErrorClass`].
pub trait Classify {
    fn class(&self) -> ErrorClass;
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    #[error("model not found: {model}")]
    ModelNotFound { model: String },

    #[error("unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("rate limited: {reason}")]
    RateLimited { reason: String },

    #[error("request timed out after {}ms", .after.as_millis())]
    Timeout { after: Duration },

    #[error("server error (status {status}): {reason}")]
    Server { status: u16, reason: String },

    #[error("transport error: {reason}")]
    Transport { reason: String },

    #[error("malformed response: {reason}")]
    MalformedResponse { reason: String },
}

impl Classify for RemoteError {
    fn class(&self) -> ErrorClass {
        match self {
            RemoteError::ModelNotFound { .. }
            | RemoteError::Unauthorized { .. }
            | RemoteError::InvalidRequest { .. } => ErrorClass::Config,
            RemoteError::RateLimited { .. }
            | RemoteError::Timeout { .. }
            | RemoteError::Server { .. }
            | RemoteError::Transport { .. }
            | RemoteError::MalformedResponse { .. } => ErrorClass::Transient,
        }
    }
}

impl RemoteError {
    /// Maps a non-success HTTP status to a variant.
    pub fn from_status(status: u16, model: &str, body: &str) -> Self {
        let reason = truncate_reason(body);
        match status {
            404 => RemoteError::ModelNotFound {
                model: model.to_string(),
            },
            401 | 403 => RemoteError::Unauthorized { reason },
            408 => RemoteError::Timeout {
                after: Duration::ZERO,
            },
            429 => RemoteError::RateLimited { reason },
            400..=499 => RemoteError::InvalidRequest { reason },
            _ => RemoteError::Server { status, reason },
        }
    }

    /// Maps a provider error message to a variant.
    ///
    /// Used where a provider SDK only exposes its failure as text. Unknown messages map to
    /// [`RemoteError::Transport`].
    pub fn from_message(message: &str, model: &str) -> Self {
        let lower = message.to_lowercase();
        let reason = truncate_reason(message);

        if let Some(status) = extract_status(&lower) {
            return Self::from_status(status, model, message);
        }

        let has = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

        if has(&["not found", "not_found", "unknown model", "does not exist", "unsupported model"]) {
            RemoteError::ModelNotFound {
                model: model.to_string(),
            }
        } else if has(&[
            "unauthorized",
            "permission denied",
            "permission_denied",
            "invalid api key",
            "api key not valid",
            "api_key",
            "missing api key",
            "unauthenticated",
        ]) {
            RemoteError::Unauthorized { reason }
        } else if has(&["rate limit", "rate_limit", "resource exhausted", "resource_exhausted", "quota"]) {
            RemoteError::RateLimited { reason }
        } else if has(&["timed out", "timeout", "deadline exceeded", "deadline_exceeded"]) {
            RemoteError::Timeout {
                after: Duration::ZERO,
            }
        } else if has(&["invalid argument", "invalid_argument", "bad request", "malformed request"]) {
            RemoteError::InvalidRequest { reason }
        } else if has(&["unavailable", "internal error", "overloaded", "bad gateway"]) {
            RemoteError::Server { status: 0, reason }
        } else {
            RemoteError::Transport { reason }
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RemoteError::Timeout {
                after: Duration::ZERO,
            }
        } else if let Some(status) = err.status() {
            RemoteError::from_status(status.as_u16(), "", &err.to_string())
        } else if err.is_decode() {
            RemoteError::MalformedResponse {
                reason: err.to_string(),
            }
        } else {
            RemoteError::Transport {
                reason: err.to_string(),
            }
        }
    }
}

const MAX_REASON_CHARS: usize = 200;

fn truncate_reason(text: &str) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(MAX_REASON_CHARS) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

/// Words that introduce a status number in provider messages.
const STATUS_CUES: &[&str] = &["status", "code", "http", "error"];

/// Finds a three-digit HTTP status (4xx/5xx) in a lowercased message.
///
/// A number counts only at the start of the message or right after a status cue, so digits
/// inside model ids (`llama-3.1-405b`) are ignored.
fn extract_status(lower: &str) -> Option<u16> {
    let bytes = lower.as_bytes();
    let mut idx = 0;

    while idx < bytes.len() {
        if !bytes[idx].is_ascii_digit() {
            idx += 1;
            continue;
        }
        let start = idx;
        while idx < bytes.len() && bytes[idx].is_ascii_digit() {
            idx += 1;
        }
        if idx - start != 3 || bytes.get(idx).is_some_and(u8::is_ascii_alphabetic) {
            continue;
        }
        let Ok(status) = lower[start..idx].parse::<u16>() else {
            continue;
        };
        if !(400..=599).contains(&status) {
            continue;
        }

        let before = lower[..start]
            .trim_end_matches(|c: char| c.is_whitespace() || matches!(c, '\'' | '"' | ':' | '=' | '(' | '['));
        if before.is_empty() || STATUS_CUES.iter().any(|cue| before.ends_with(cue)) {
            return Some(status);
        }
    }
    None
}
