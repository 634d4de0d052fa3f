//! Order placement: validate, submit once, classify the outcome.
//!
//! Each invocation walks a small state machine:
//!
//! ```text
//! Idle -> Validating -> Rejected
//!                    -> Validated -> Submitting -> Accepted
//!                                               -> Failed
//! ```
//!
//! The exchange is only reachable from `Validated`, so an invalid order never
//! produces a network call. There is exactly one submission attempt.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::error::{ExchangeError, FailureKind, ValidationError};
use crate::exchange::traits::{ExchangeResult, TradingApi};
use crate::exchange::types::{NormalizedOrder, OrderAck, OrderType, Pricing, Side, TimeInForce};
use crate::services::reporting::{format_order_response, format_order_summary};
use crate::validation::{validate_all, RawOrderInput};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum OrderState {
    Idle,
    Validating,
    Rejected,
    Validated,
    Submitting,
    Accepted,
    Failed,
}

impl OrderState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderState::Rejected | OrderState::Accepted | OrderState::Failed
        )
    }

    pub fn can_transition_to(&self, next: OrderState) -> bool {
        use OrderState::*;
        matches!(
            (self, next),
            (Idle, Validating)
                | (Validating, Rejected)
                | (Validating, Validated)
                | (Validated, Submitting)
                | (Submitting, Accepted)
                | (Submitting, Failed)
        )
    }
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Accepted order: what was sent plus what the exchange reported.
#[derive(Clone, Debug, Serialize)]
pub struct OrderSuccess {
    pub order_id: String,
    pub client_order_id: Option<String>,
    pub status: String,
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    pub quantity: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_in_force: Option<TimeInForce>,
    pub executed_qty: Option<Decimal>,
    pub avg_price: Option<Decimal>,
    pub update_time: Option<DateTime<Utc>>,
}

impl OrderSuccess {
    fn new(order: &NormalizedOrder, time_in_force: TimeInForce, ack: OrderAck) -> Self {
        let limit_tif = match order.pricing() {
            Pricing::Market => None,
            Pricing::Limit { .. } => Some(time_in_force),
        };

        Self {
            order_id: ack.order_id,
            client_order_id: ack.client_order_id,
            status: ack.status,
            symbol: order.symbol().to_string(),
            side: order.side(),
            order_type: order.order_type(),
            quantity: order.quantity(),
            price: order.price(),
            time_in_force: limit_tif,
            executed_qty: ack.executed_qty,
            avg_price: ack.avg_price,
            update_time: ack.update_time,
        }
    }
}

/// Order that reached the remote boundary and did not go through.
#[derive(Clone, Debug, Serialize)]
pub struct RemoteFailure {
    pub kind: FailureKind,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    pub order: NormalizedOrder,
}

impl RemoteFailure {
    fn new(order: NormalizedOrder, err: ExchangeError) -> Self {
        let http_status = match &err {
            ExchangeError::Rejected { status, .. } => Some(*status),
            ExchangeError::Request { .. } => None,
        };
        Self {
            kind: err.failure_kind(),
            code: err.code(),
            message: err.message().to_string(),
            http_status,
            order,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum OrderResult {
    Accepted(OrderSuccess),
    Rejected(ValidationError),
    Failed(RemoteFailure),
}

impl OrderResult {
    pub fn is_success(&self) -> bool {
        matches!(self, OrderResult::Accepted(_))
    }

    /// 0 on success, 1 on any failure.
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }

    pub fn state(&self) -> OrderState {
        match self {
            OrderResult::Accepted(_) => OrderState::Accepted,
            OrderResult::Rejected(_) => OrderState::Rejected,
            OrderResult::Failed(_) => OrderState::Failed,
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            OrderResult::Accepted(_) => None,
            OrderResult::Rejected(e) => Some(e.kind),
            OrderResult::Failed(f) => Some(f.kind),
        }
    }

    pub fn failure_message(&self) -> Option<&str> {
        match self {
            OrderResult::Accepted(_) => None,
            OrderResult::Rejected(e) => Some(&e.reason),
            OrderResult::Failed(f) => Some(&f.message),
        }
    }
}

/// Tracks the state of one invocation and refuses illegal moves.
#[derive(Debug)]
struct OrderFlow {
    state: OrderState,
}

impl OrderFlow {
    fn new() -> Self {
        Self {
            state: OrderState::Idle,
        }
    }

    fn advance(&mut self, next: OrderState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal order transition {} -> {}",
            self.state,
            next
        );
        debug!("[ORDER] {} -> {}", self.state, next);
        self.state = next;
    }
}

#[derive(Clone)]
pub struct OrderService {
    exchange: Arc<dyn TradingApi>,
    time_in_force: TimeInForce,
}

impl OrderService {
    pub fn new(exchange: Arc<dyn TradingApi>, time_in_force: TimeInForce) -> Self {
        info!(
            "[ORDER] OrderService initialized (exchange: {}, limit TIF: {})",
            exchange.name(),
            time_in_force
        );
        Self {
            exchange,
            time_in_force,
        }
    }

    pub fn time_in_force(&self) -> TimeInForce {
        self.time_in_force
    }

    /// Validates, submits at most once and maps the outcome. Never returns an
    /// error: every failure is a variant of [`OrderResult`].
    pub async fn place_order(&self, raw: &RawOrderInput) -> OrderResult {
        let mut flow = OrderFlow::new();

        flow.advance(OrderState::Validating);
        let order = match Self::validate_only(raw) {
            Ok(order) => order,
            Err(e) => {
                flow.advance(OrderState::Rejected);
                error!("[ORDER] Validation error ({}): {}", e.kind, e.reason);
                return OrderResult::Rejected(e);
            }
        };
        flow.advance(OrderState::Validated);

        flow.advance(OrderState::Submitting);
        let outcome = self.submit(&order).await;

        let result = self.settle(order, outcome);
        flow.advance(result.state());
        result
    }

    /// Validating -> Validated/Rejected without touching the exchange.
    pub fn validate_only(raw: &RawOrderInput) -> Result<NormalizedOrder, ValidationError> {
        let order = NormalizedOrder::from_validated(validate_all(raw)?);
        info!("[ORDER] Order request: {}", format_order_summary(&order));
        Ok(order)
    }

    /// Submitting: one type-specific call, no retry.
    pub async fn submit(&self, order: &NormalizedOrder) -> ExchangeResult<OrderAck> {
        match order.pricing() {
            Pricing::Market => {
                self.exchange
                    .place_market_order(order.symbol(), order.side(), order.quantity())
                    .await
            }
            Pricing::Limit { price } => {
                self.exchange
                    .place_limit_order(
                        order.symbol(),
                        order.side(),
                        order.quantity(),
                        price,
                        self.time_in_force,
                    )
                    .await
            }
        }
    }

    /// Submitting -> Accepted/Failed.
    pub fn settle(&self, order: NormalizedOrder, outcome: ExchangeResult<OrderAck>) -> OrderResult {
        match outcome {
            Ok(ack) => {
                let success = OrderSuccess::new(&order, self.time_in_force, ack);
                info!("[ORDER] Order response: {}", format_order_response(&success));
                OrderResult::Accepted(success)
            }
            Err(e) => {
                let failure = RemoteFailure::new(order, e);
                match failure.kind {
                    FailureKind::RemoteBusinessFailure => warn!(
                        "[ORDER] Exchange rejected order (code {}): {}",
                        failure.code, failure.message
                    ),
                    _ => error!(
                        "[ORDER] Order placement failed [{}]: {}",
                        failure.code, failure.message
                    ),
                }
                OrderResult::Failed(failure)
            }
        }
    }
}
