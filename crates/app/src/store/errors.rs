//! Remote store errors.

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Rejected {
        status: u16,
        message: String,
        code: Option<String>,
    },

    #[error("unexpected response body")]
    Decode(#[source] serde_json::Error),

    #[error("invalid store url: {0}")]
    InvalidUrl(String),

    #[error("refusing to {operation} every row of {table}")]
    Unfiltered {
        operation: &'static str,
        table: String,
    },
}

impl StoreError {
    /// A rejection with no HTTP context, as produced by fakes and mocks.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            status: 400,
            message: message.into(),
            code: None,
        }
    }

    /// Build a rejection from a non-2xx response body.
    ///
    /// The backend answers with `{ message, code, details, hint }`; anything
    /// else is reported verbatim.
    pub(crate) fn from_response(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) => {
                let message = match parsed.details.filter(|d| !d.is_empty()) {
                    Some(details) => format!("{} ({details})", parsed.message),
                    None => parsed.message,
                };

                Self::Rejected {
                    status,
                    message,
                    code: parsed.code,
                }
            }
            Err(_) if body.trim().is_empty() => Self::Rejected {
                status,
                message: format!("request failed with status {status}"),
                code: None,
            },
            Err(_) => Self::Rejected {
                status,
                message: body.trim().to_string(),
                code: None,
            },
        }
    }

    /// Description suitable for showing to the shopper.
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected { message, .. } => message.clone(),
            Self::Http(error) if error.is_timeout() => "the store took too long to respond".into(),
            Self::Http(_) => "could not reach the store".into(),
            Self::Decode(_) => "the store sent an unexpected response".into(),
            Self::InvalidUrl(_) | Self::Unfiltered { .. } => self.to_string(),
        }
    }

    /// Backend error code, when the store supplied one.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Rejected { code, .. } => code.as_deref(),
            Self::Http(_) | Self::Decode(_) | Self::InvalidUrl(_) | Self::Unfiltered { .. } => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    details: Option<String>,
}
