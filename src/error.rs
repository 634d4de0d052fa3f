//! Custom error types for the order tool
//!
//! Validation failures, exchange failures and configuration failures each get
//! their own typed error instead of a generic Box<dyn Error>.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Input field an order validation refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderField {
    Symbol,
    Side,
    OrderType,
    Quantity,
    Price,
}

impl fmt::Display for OrderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderField::Symbol => "symbol",
            OrderField::Side => "side",
            OrderField::OrderType => "order type",
            OrderField::Quantity => "quantity",
            OrderField::Price => "price",
        };
        f.write_str(name)
    }
}

/// Every way an order invocation can end without being accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    InvalidSymbol,
    InvalidSide,
    InvalidOrderType,
    InvalidQuantity,
    MissingPrice,
    InvalidPrice,
    RemoteRequestFailure,
    RemoteBusinessFailure,
}

impl FailureKind {
    /// Local failures never reach the exchange.
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            FailureKind::RemoteRequestFailure | FailureKind::RemoteBusinessFailure
        )
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Pre-network rejection of a raw order field.
#[derive(Error, Clone, Debug, PartialEq, Eq, Serialize)]
#[error("{reason}")]
pub struct ValidationError {
    pub kind: FailureKind,
    pub field: OrderField,
    /// Offending raw value; `None` when the input was missing.
    pub value: Option<String>,
    pub reason: String,
}

impl ValidationError {
    pub fn new(
        kind: FailureKind,
        field: OrderField,
        value: Option<&str>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            field,
            value: value.map(str::to_string),
            reason: reason.into(),
        }
    }
}

/// Exchange-side errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    /// Transport-level failure: the order may not have reached the exchange.
    #[error("Request failed [{code}]: {message}")]
    Request { code: String, message: String },

    /// The exchange answered and refused the order.
    #[error("HTTP {status} (code {code}): {message}")]
    Rejected {
        status: u16,
        code: i64,
        message: String,
    },
}

impl ExchangeError {
    pub fn request(code: impl Into<String>, message: impl Into<String>) -> Self {
        ExchangeError::Request {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn failure_kind(&self) -> FailureKind {
        match self {
            ExchangeError::Request { .. } => FailureKind::RemoteRequestFailure,
            ExchangeError::Rejected { .. } => FailureKind::RemoteBusinessFailure,
        }
    }

    /// Remote code as text (`"-2019"`, `"timeout"`, ...).
    pub fn code(&self) -> String {
        match self {
            ExchangeError::Request { code, .. } => code.clone(),
            ExchangeError::Rejected { code, .. } => code.to_string(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ExchangeError::Request { message, .. } | ExchangeError::Rejected { message, .. } => {
                message
            }
        }
    }
}

impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        let code = if err.is_timeout() {
            "timeout"
        } else if err.is_connect() {
            "connect"
        } else if err.is_decode() {
            "decode"
        } else if err.is_builder() {
            "builder"
        } else {
            "request"
        };
        ExchangeError::request(code, err.to_string())
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required setting {0} (set it in the environment or .env)")]
    MissingVar(&'static str),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
