use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::validation::ValidatedOrder;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountSummary {
    pub can_trade: bool,
    pub total_wallet_balance: Option<Decimal>,
    pub total_margin_balance: Option<Decimal>,
    pub available_balance: Option<Decimal>,
    pub total_unrealized_profit: Option<Decimal>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    Market,
    Limit,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Market => "MARKET",
            OrderType::Limit => "LIMIT",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeInForce {
    /// Good-Till-Cancelled
    #[default]
    Gtc,
    /// Immediate-Or-Cancel
    Ioc,
    /// Fill-Or-Kill
    Fok,
    /// Post-only (Good-Till-Crossing)
    Gtx,
}

impl TimeInForce {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeInForce::Gtc => "GTC",
            TimeInForce::Ioc => "IOC",
            TimeInForce::Fok => "FOK",
            TimeInForce::Gtx => "GTX",
        }
    }
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeInForce {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GTC" => Ok(TimeInForce::Gtc),
            "IOC" => Ok(TimeInForce::Ioc),
            "FOK" => Ok(TimeInForce::Fok),
            "GTX" => Ok(TimeInForce::Gtx),
            other => Err(format!("unknown time in force '{}'", other)),
        }
    }
}

/// Type-specific pricing of a validated order. A limit price exists only on
/// the `Limit` variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum Pricing {
    Market,
    Limit { price: Decimal },
}

impl Pricing {
    pub fn order_type(&self) -> OrderType {
        match self {
            Pricing::Market => OrderType::Market,
            Pricing::Limit { .. } => OrderType::Limit,
        }
    }

    pub fn price(&self) -> Option<Decimal> {
        match self {
            Pricing::Market => None,
            Pricing::Limit { price } => Some(*price),
        }
    }
}

/// A validated, canonical order ready for submission.
///
/// Only obtainable from [`ValidatedOrder`], so every instance satisfies the
/// field rules (uppercase symbol, positive quantity, price iff LIMIT).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NormalizedOrder {
    symbol: String,
    side: Side,
    quantity: Decimal,
    #[serde(flatten)]
    pricing: Pricing,
}

impl NormalizedOrder {
    pub fn from_validated(validated: ValidatedOrder) -> Self {
        Self {
            symbol: validated.symbol,
            side: validated.side,
            quantity: validated.quantity,
            pricing: validated.pricing,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn order_type(&self) -> OrderType {
        self.pricing.order_type()
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn price(&self) -> Option<Decimal> {
        self.pricing.price()
    }

    pub fn pricing(&self) -> Pricing {
        self.pricing
    }
}

/// What the exchange reported for a placed order.
#[derive(Clone, Debug, Serialize)]
pub struct OrderAck {
    pub order_id: String,
    pub client_order_id: Option<String>,
    pub symbol: String,
    pub status: String,
    pub side: String,
    pub order_type: String,
    pub orig_qty: Option<Decimal>,
    pub executed_qty: Option<Decimal>,
    pub price: Option<Decimal>,
    /// Average fill price; `None` until something is filled.
    pub avg_price: Option<Decimal>,
    pub update_time: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub raw: Value,
}
