//! Futures order CLI - validated order placement on the Binance USDT-M testnet
//!
//! This library provides order validation, normalization, request signing and
//! submission, and the reporting used by the `futures-order` binary.

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod exchange;
pub mod logging;
pub mod services;
pub mod validation;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{ExchangeError, FailureKind, ValidationError};
pub use exchange::binance::BinanceFuturesExchange;
pub use exchange::traits::{ExchangeResult, TradingApi};
pub use exchange::types::{NormalizedOrder, OrderAck, OrderType, Side, TimeInForce};
pub use services::order_service::{OrderResult, OrderService, OrderState};
pub use validation::RawOrderInput;
