//! Provider failure classification
//!
//! Backends report what went wrong as a [`ProviderError`]; [`classify`] maps
//! that onto the crate's closed error set. Rules are checked in order and the
//! first match wins.

use serde_json::Value;

use crate::error::Error;

/// Error codes providers use for rate limiting
pub const RATE_LIMIT_CODES: &[&str] = &["rate_limit_exceeded", "rate_limit_error"];

/// Low-level socket and resolver codes treated as network failures
pub const NETWORK_CODES: &[&str] = &[
    "ECONNREFUSED",
    "ECONNRESET",
    "ENOTFOUND",
    "ETIMEDOUT",
    "EAI_AGAIN",
    "ECONNABORTED",
    "EHOSTUNREACH",
    "ENETUNREACH",
    "EPIPE",
];

/// Class of a failed connection attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionKind {
    Connect,
    Timeout,
}

/// A failure as reported by a provider or its transport
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// The provider answered with a non-success status
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },
    /// The request never got a response
    Connection {
        kind: ConnectionKind,
        code: Option<String>,
        message: String,
    },
    /// The response body could not be decoded
    Malformed { body: String, message: String },
    /// Anything else
    Other {
        code: Option<String>,
        message: String,
    },
}

impl ProviderError {
    /// Build from a non-success HTTP response
    ///
    /// Reads `error.code` (or `error.type`) and `error.message` from the
    /// usual `{"error": {...}}` envelope; unreadable bodies become the message.
    pub fn from_response(status: u16, body: &str) -> Self {
        let envelope = serde_json::from_str::<Value>(body).ok();
        let error = envelope.as_ref().and_then(|v| v.get("error"));

        let code = error
            .and_then(|e| e.get("code").and_then(Value::as_str))
            .or_else(|| error.and_then(|e| e.get("type").and_then(Value::as_str)))
            .map(str::to_string);

        let message = error
            .and_then(|e| e.get("message").and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    format!("HTTP {}", status)
                } else {
                    body.to_string()
                }
            });

        ProviderError::Api {
            status,
            code,
            message,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            ProviderError::Api { code, .. }
            | ProviderError::Connection { code, .. }
            | ProviderError::Other { code, .. } => code.as_deref(),
            ProviderError::Malformed { .. } => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ProviderError::Api { message, .. }
            | ProviderError::Connection { message, .. }
            | ProviderError::Malformed { message, .. }
            | ProviderError::Other { message, .. } => message,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        let message = err.to_string();

        if err.is_timeout() {
            return ProviderError::Connection {
                kind: ConnectionKind::Timeout,
                code: Some("ETIMEDOUT".to_string()),
                message,
            };
        }
        if err.is_connect() {
            return ProviderError::Connection {
                kind: ConnectionKind::Connect,
                code: socket_code(&err).map(str::to_string),
                message,
            };
        }
        if err.is_decode() {
            return ProviderError::Malformed {
                body: String::new(),
                message,
            };
        }
        if let Some(status) = err.status() {
            return ProviderError::Api {
                status: status.as_u16(),
                code: None,
                message,
            };
        }

        ProviderError::Other {
            code: socket_code(&err).map(str::to_string),
            message,
        }
    }
}

/// Find the socket error code in a transport error's source chain
fn socket_code(err: &(dyn std::error::Error + 'static)) -> Option<&'static str> {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);

    while let Some(e) = source {
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            use std::io::ErrorKind;
            let code = match io.kind() {
                ErrorKind::ConnectionRefused => Some("ECONNREFUSED"),
                ErrorKind::ConnectionReset => Some("ECONNRESET"),
                ErrorKind::ConnectionAborted => Some("ECONNABORTED"),
                ErrorKind::TimedOut => Some("ETIMEDOUT"),
                ErrorKind::BrokenPipe => Some("EPIPE"),
                _ => None,
            };
            if code.is_some() {
                return code;
            }
        }
        if e.to_string().contains("dns error") {
            return Some("ENOTFOUND");
        }
        source = e.source();
    }

    None
}

/// Map a provider failure onto the crate error set
///
/// 1. HTTP 429 or a rate-limit code is a rate limit (status forced to 429)
/// 2. Connection failures and socket codes are network errors
/// 3. Undecodable responses are parse errors
/// 4. Everything else passes through as a provider error
pub fn classify(err: ProviderError) -> Error {
    let message = err.message().to_string();

    let rate_limited = err.status() == Some(429)
        || err
            .code()
            .is_some_and(|c| RATE_LIMIT_CODES.contains(&c));
    if rate_limited {
        return Error::RateLimit {
            status: 429,
            message,
        };
    }

    let network = matches!(err, ProviderError::Connection { .. })
        || err.code().is_some_and(|c| NETWORK_CODES.contains(&c));
    if network {
        return Error::Network {
            status: err.status(),
            message,
        };
    }

    match err {
        ProviderError::Malformed { body, message } => Error::Parse { raw: body, message },
        ProviderError::Api {
            status,
            code,
            message,
        } => Error::Provider {
            status: Some(status),
            code,
            message,
        },
        ProviderError::Other { code, message } => Error::Provider {
            status: None,
            code,
            message,
        },
        // Connection is always caught by the network rule above
        ProviderError::Connection { code, message, .. } => Error::Network {
            status: None,
            message: code.map(|c| format!("{}: {}", c, message)).unwrap_or(message),
        },
    }
}

impl From<ProviderError> for Error {
    fn from(err: ProviderError) -> Self {
        classify(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16, code: Option<&str>) -> ProviderError {
        ProviderError::Api {
            status,
            code: code.map(str::to_string),
            message: "boom".to_string(),
        }
    }

    #[test]
    fn test_429_is_rate_limit() {
        match classify(api(429, None)) {
            Error::RateLimit { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "boom");
            }
            other => panic!("Expected RateLimit, got {:?}", other),
        }
    }

    #[test]
    fn test_rate_limit_code_forces_429() {
        let err = classify(api(400, Some("rate_limit_exceeded")));
        assert!(matches!(err, Error::RateLimit { status: 429, .. }));

        let err = classify(ProviderError::Other {
            code: Some("rate_limit_error".into()),
            message: "slow down".into(),
        });
        assert_eq!(err.status(), Some(429));
    }

    #[test]
    fn test_rate_limit_wins_over_network_code() {
        let err = classify(api(429, Some("ECONNRESET")));
        assert!(matches!(err, Error::RateLimit { .. }));
    }

    #[test]
    fn test_connection_is_network() {
        let err = classify(ProviderError::Connection {
            kind: ConnectionKind::Timeout,
            code: None,
            message: "timed out".into(),
        });
        assert!(matches!(err, Error::Network { status: None, .. }));
    }

    #[test]
    fn test_network_code_keeps_status() {
        let err = classify(api(502, Some("ECONNREFUSED")));
        match err {
            Error::Network { status, .. } => assert_eq!(status, Some(502)),
            other => panic!("Expected Network, got {:?}", other),
        }

        let err = classify(ProviderError::Other {
            code: Some("EAI_AGAIN".into()),
            message: "lookup failed".into(),
        });
        assert!(matches!(err, Error::Network { status: None, .. }));
    }

    #[test]
    fn test_malformed_is_parse() {
        let err = classify(ProviderError::Malformed {
            body: "<html>".into(),
            message: "expected value".into(),
        });
        match err {
            Error::Parse { raw, message } => {
                assert_eq!(raw, "<html>");
                assert_eq!(message, "expected value");
            }
            other => panic!("Expected Parse, got {:?}", other),
        }
    }

    #[test]
    fn test_other_failures_pass_through() {
        let err = classify(api(500, Some("server_error")));
        match err {
            Error::Provider {
                status,
                code,
                message,
            } => {
                assert_eq!(status, Some(500));
                assert_eq!(code.as_deref(), Some("server_error"));
                assert_eq!(message, "boom");
            }
            other => panic!("Expected Provider, got {:?}", other),
        }
    }

    #[test]
    fn test_from_response_reads_error_envelope() {
        let body = r#"{"error": {"message": "Rate limit reached", "type": "requests", "code": "rate_limit_exceeded"}}"#;
        let err = ProviderError::from_response(400, body);
        assert_eq!(err.code(), Some("rate_limit_exceeded"));
        assert_eq!(err.message(), "Rate limit reached");

        // Anthropic-style envelope carries the code in `type`
        let body = r#"{"type": "error", "error": {"type": "overloaded_error", "message": "Overloaded"}}"#;
        let err = ProviderError::from_response(529, body);
        assert_eq!(err.code(), Some("overloaded_error"));
        assert_eq!(err.status(), Some(529));
    }

    #[test]
    fn test_from_response_plain_body() {
        let err = ProviderError::from_response(503, "upstream unavailable");
        assert_eq!(err.message(), "upstream unavailable");
        assert_eq!(err.code(), None);

        let err = ProviderError::from_response(500, "");
        assert_eq!(err.message(), "HTTP 500");
    }
}
