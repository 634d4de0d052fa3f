//! Input validation for order requests
//!
//! Each validator takes the raw text the caller supplied and returns either the
//! normalized value or a [`ValidationError`] naming the field, the offending
//! value and the reason. Nothing here touches the network.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::error::{FailureKind, OrderField, ValidationError};
use crate::exchange::types::{OrderType, Pricing, Side};

/// Letters first, then letters or digits (BTCUSDT).
static SYMBOL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]+[A-Z0-9]+$").expect("symbol pattern is valid"));

/// The unvalidated order exactly as the caller typed it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RawOrderInput {
    pub symbol: String,
    pub side: String,
    pub order_type: String,
    pub quantity: String,
    pub price: Option<String>,
}

impl RawOrderInput {
    pub fn new(
        symbol: impl Into<String>,
        side: impl Into<String>,
        order_type: impl Into<String>,
        quantity: impl Into<String>,
        price: Option<&str>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side: side.into(),
            order_type: order_type.into(),
            quantity: quantity.into(),
            price: price.map(str::to_string),
        }
    }
}

/// Output of [`validate_all`]: every field normalized, pricing already tied to
/// the order type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedOrder {
    pub(crate) symbol: String,
    pub(crate) side: Side,
    pub(crate) quantity: Decimal,
    pub(crate) pricing: Pricing,
}

impl ValidatedOrder {
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn pricing(&self) -> Pricing {
        self.pricing
    }
}

pub fn validate_symbol(raw: &str) -> Result<String, ValidationError> {
    // ASCII only; non-ASCII letters must fail the pattern.
    let symbol = raw.trim().to_ascii_uppercase();

    if symbol.is_empty() {
        warn!("[VALIDATE] Empty symbol");
        return Err(ValidationError::new(
            FailureKind::InvalidSymbol,
            OrderField::Symbol,
            Some(raw),
            "Symbol must be a non-empty string",
        ));
    }

    if !SYMBOL_PATTERN.is_match(&symbol) {
        warn!("[VALIDATE] Invalid symbol format: {:?}", raw);
        return Err(ValidationError::new(
            FailureKind::InvalidSymbol,
            OrderField::Symbol,
            Some(raw),
            format!(
                "Symbol must be letters followed by letters or digits (e.g. BTCUSDT), got: {}",
                raw
            ),
        ));
    }

    debug!("[VALIDATE] Symbol validated: {}", symbol);
    Ok(symbol)
}

pub fn validate_side(raw: &str) -> Result<Side, ValidationError> {
    let side = match raw.trim().to_ascii_uppercase().as_str() {
        "BUY" => Side::Buy,
        "SELL" => Side::Sell,
        _ => {
            warn!("[VALIDATE] Invalid side value: {:?}", raw);
            return Err(ValidationError::new(
                FailureKind::InvalidSide,
                OrderField::Side,
                Some(raw),
                format!("Side must be 'BUY' or 'SELL', got: {}", raw),
            ));
        }
    };

    debug!("[VALIDATE] Side validated: {}", side);
    Ok(side)
}

pub fn validate_order_type(raw: &str) -> Result<OrderType, ValidationError> {
    let order_type = match raw.trim().to_ascii_uppercase().as_str() {
        "MARKET" => OrderType::Market,
        "LIMIT" => OrderType::Limit,
        _ => {
            warn!("[VALIDATE] Invalid order type value: {:?}", raw);
            return Err(ValidationError::new(
                FailureKind::InvalidOrderType,
                OrderField::OrderType,
                Some(raw),
                format!("Order type must be 'MARKET' or 'LIMIT', got: {}", raw),
            ));
        }
    };

    debug!("[VALIDATE] Order type validated: {}", order_type);
    Ok(order_type)
}

pub fn validate_quantity(raw: &str) -> Result<Decimal, ValidationError> {
    let qty = parse_positive_decimal(raw).map_err(|reason| {
        warn!("[VALIDATE] Invalid quantity {:?}: {}", raw, reason);
        ValidationError::new(
            FailureKind::InvalidQuantity,
            OrderField::Quantity,
            Some(raw),
            format!("Quantity {}, got: {}", reason, raw),
        )
    })?;

    debug!("[VALIDATE] Quantity validated: {}", qty);
    Ok(qty)
}

/// LIMIT orders need a positive price. A price given with a MARKET order is
/// dropped with a warning rather than rejected.
pub fn validate_price(raw: Option<&str>, order_type: OrderType) -> Result<Pricing, ValidationError> {
    match order_type {
        OrderType::Market => {
            if let Some(ignored) = raw.filter(|p| !p.trim().is_empty()) {
                warn!("[VALIDATE] Price not used for MARKET orders, ignoring: {}", ignored);
            }
            Ok(Pricing::Market)
        }
        OrderType::Limit => {
            let raw = match raw.filter(|p| !p.trim().is_empty()) {
                Some(p) => p,
                None => {
                    warn!("[VALIDATE] Price is required for LIMIT orders");
                    return Err(ValidationError::new(
                        FailureKind::MissingPrice,
                        OrderField::Price,
                        raw,
                        "Price is required for LIMIT orders",
                    ));
                }
            };

            let price = parse_positive_decimal(raw).map_err(|reason| {
                warn!("[VALIDATE] Invalid price {:?}: {}", raw, reason);
                ValidationError::new(
                    FailureKind::InvalidPrice,
                    OrderField::Price,
                    Some(raw),
                    format!("Price {}, got: {}", reason, raw),
                )
            })?;

            debug!("[VALIDATE] Price validated: {}", price);
            Ok(Pricing::Limit { price })
        }
    }
}

/// Runs every check in the fixed order symbol, side, type, quantity, price and
/// stops at the first failure.
pub fn validate_all(raw: &RawOrderInput) -> Result<ValidatedOrder, ValidationError> {
    info!(
        "[VALIDATE] Validating inputs - Symbol: {}, Side: {}, Type: {}, Qty: {}, Price: {}",
        raw.symbol,
        raw.side,
        raw.order_type,
        raw.quantity,
        raw.price.as_deref().unwrap_or("-")
    );

    let validated = validate_fields(raw);

    match &validated {
        Ok(_) => info!("[VALIDATE] All inputs validated successfully"),
        Err(e) => warn!("[VALIDATE] Validation failed ({}): {}", e.kind, e.reason),
    }
    validated
}

fn validate_fields(raw: &RawOrderInput) -> Result<ValidatedOrder, ValidationError> {
    let symbol = validate_symbol(&raw.symbol)?;
    let side = validate_side(&raw.side)?;
    let order_type = validate_order_type(&raw.order_type)?;
    let quantity = validate_quantity(&raw.quantity)?;
    let pricing = validate_price(raw.price.as_deref(), order_type)?;

    Ok(ValidatedOrder {
        symbol,
        side,
        quantity,
        pricing,
    })
}

/// Accepts plain ("0.003") and scientific ("3e-3") notation.
fn parse_positive_decimal(raw: &str) -> Result<Decimal, &'static str> {
    let trimmed = raw.trim();
    // No digit separators ("1_000").
    if trimmed.is_empty() || trimmed.contains('_') {
        return Err("must be a valid number");
    }

    let value = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| "must be a valid number")?;

    if value <= Decimal::ZERO {
        return Err("must be positive");
    }
    Ok(value)
}
