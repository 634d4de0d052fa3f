use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::ExchangeError;

use super::types::{AccountSummary, OrderAck, Side, TimeInForce};

pub type ExchangeResult<T> = Result<T, ExchangeError>;

/// Remote order placement. Implementations make exactly one request per call
/// and never retry.
#[async_trait]
pub trait TradingApi: Send + Sync {
    fn name(&self) -> &'static str;

    async fn place_market_order(
        &self,
        symbol: &str,
        side: Side,
        quantity: Decimal,
    ) -> ExchangeResult<OrderAck>;

    async fn place_limit_order(
        &self,
        symbol: &str,
        side: Side,
        quantity: Decimal,
        price: Decimal,
        time_in_force: TimeInForce,
    ) -> ExchangeResult<OrderAck>;

    /// Authenticated round trip used to verify credentials and connectivity.
    async fn check_connection(&self) -> ExchangeResult<AccountSummary>;
}
