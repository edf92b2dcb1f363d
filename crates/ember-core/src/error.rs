//! Error types for Ember
//!
//! The insight pipeline surfaces every failure as one of a closed set of
//! kinds. Provider failures are re-labelled by [`crate::ai::classify`] before
//! they reach this type.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Missing credential or unusable configuration. Raised before any
    /// network activity.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Model output was empty or contained no extractable JSON object.
    ///
    /// `raw` is the provider text exactly as received, before any fence
    /// stripping or trimming.
    #[error("Parse error: {message}")]
    Parse { raw: String, message: String },

    /// Provider rejected the request for rate-limit reasons
    #[error("Rate limited (HTTP {status}): {message}")]
    RateLimit { status: u16, message: String },

    /// The provider could not be reached
    #[error("Network error: {message}")]
    Network {
        status: Option<u16>,
        message: String,
    },

    /// Any other provider failure, passed through verbatim
    #[error("Provider error: {message}")]
    Provider {
        status: Option<u16>,
        code: Option<String>,
        message: String,
    },
}

impl Error {
    /// Build a parse error from the original provider text
    pub fn parse(raw: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Parse {
            raw: raw.into(),
            message: message.into(),
        }
    }

    /// HTTP status attached to the failure, if the provider sent one
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::RateLimit { status, .. } => Some(*status),
            Error::Network { status, .. } | Error::Provider { status, .. } => *status,
            _ => None,
        }
    }

    /// Message suitable for showing to the person who asked for the insight
    ///
    /// Rate limits and connectivity problems get specific wording; everything
    /// else is a generic failure so provider internals never leak to users.
    pub fn user_message(&self) -> &'static str {
        match self {
            Error::RateLimit { .. } => {
                "Too many insight requests right now. Please try again shortly."
            }
            Error::Network { .. } => {
                "Couldn't reach the insight service. Check your connection and try again."
            }
            Error::Config(_) => "Weekly insights are not configured on this server.",
            _ => "Something went wrong while generating your weekly insight.",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
