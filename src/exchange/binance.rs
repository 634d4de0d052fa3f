//! Binance USDⓈ-M Futures adapter (signed REST, testnet by default).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::{Client, Method};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;
use std::time::Duration;
use tracing::{debug, error, info};

use super::{
    traits::{ExchangeResult, TradingApi},
    types::{AccountSummary, OrderAck, OrderType, Side, TimeInForce},
};

use crate::config::BinanceConfig;
use crate::constants::binance::{
    ACCOUNT_PATH, API_KEY_HEADER, ORDER_PATH, ORDER_RESPONSE_TYPE,
};
use crate::error::{ConfigError, ExchangeError};

type HmacSha256 = Hmac<Sha256>;

#[derive(Clone)]
pub struct BinanceFuturesExchange {
    client: Client,
    base_url: String,
    api_key: String,
    api_secret: String,
    recv_window_ms: u64,
}

impl BinanceFuturesExchange {
    pub fn new(config: &BinanceConfig) -> Result<Self, ConfigError> {
        let (api_key, api_secret) = config.credentials()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        debug!("[BINANCE] Client configured for {}", config.base_url);

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            api_secret: api_secret.to_string(),
            recv_window_ms: config.recv_window_ms,
        })
    }

    /// Appends recvWindow, timestamp and the HMAC signature to `params`.
    fn signed_query(&self, mut params: Vec<(&'static str, String)>) -> ExchangeResult<String> {
        params.push(("recvWindow", self.recv_window_ms.to_string()));
        params.push(("timestamp", Utc::now().timestamp_millis().to_string()));

        let query = build_query(&params);
        let signature = sign(&self.api_secret, &query)?;
        Ok(format!("{}&signature={}", query, signature))
    }

    async fn send_signed(
        &self,
        method: Method,
        path: &str,
        params: Vec<(&'static str, String)>,
    ) -> ExchangeResult<Value> {
        let url = format!("{}{}?{}", self.base_url, path, self.signed_query(params)?);

        let resp = self
            .client
            .request(method, &url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        let status = resp.status().as_u16();
        let text = resp.text().await?;
        parse_response(status, &text)
    }

    async fn submit(&self, params: Vec<(&'static str, String)>) -> ExchangeResult<OrderAck> {
        let raw = self.send_signed(Method::POST, ORDER_PATH, params).await?;
        let ack = parse_order_ack(raw)?;
        info!(
            "[BINANCE] Order placed. Order ID: {} (status {})",
            ack.order_id, ack.status
        );
        debug!("[BINANCE] Order response: {}", ack.raw);
        Ok(ack)
    }
}

#[async_trait]
impl TradingApi for BinanceFuturesExchange {
    fn name(&self) -> &'static str {
        "binance-futures"
    }

    async fn place_market_order(
        &self,
        symbol: &str,
        side: Side,
        quantity: Decimal,
    ) -> ExchangeResult<OrderAck> {
        info!(
            "[BINANCE] Placing MARKET order - Symbol: {}, Side: {}, Qty: {}",
            symbol, side, quantity
        );
        let client_order_id = uuid::Uuid::new_v4().to_string();
        let params = order_params(symbol, side, OrderType::Market, quantity, None, &client_order_id);

        self.submit(params).await.inspect_err(|e| {
            error!("[BINANCE] MARKET order failed (client id {}): {}", client_order_id, e);
        })
    }

    async fn place_limit_order(
        &self,
        symbol: &str,
        side: Side,
        quantity: Decimal,
        price: Decimal,
        time_in_force: TimeInForce,
    ) -> ExchangeResult<OrderAck> {
        info!(
            "[BINANCE] Placing LIMIT order - Symbol: {}, Side: {}, Qty: {}, Price: {}, TIF: {}",
            symbol, side, quantity, price, time_in_force
        );
        let client_order_id = uuid::Uuid::new_v4().to_string();
        let params = order_params(
            symbol,
            side,
            OrderType::Limit,
            quantity,
            Some((price, time_in_force)),
            &client_order_id,
        );

        self.submit(params).await.inspect_err(|e| {
            error!("[BINANCE] LIMIT order failed (client id {}): {}", client_order_id, e);
        })
    }

    async fn check_connection(&self) -> ExchangeResult<AccountSummary> {
        info!("[BINANCE] Testing connection to {}", self.base_url);
        let raw = self.send_signed(Method::GET, ACCOUNT_PATH, Vec::new()).await?;
        let account: BinanceAccount = serde_json::from_value(raw)
            .map_err(|e| ExchangeError::request("decode", format!("account response: {}", e)))?;
        info!("[BINANCE] Connected and credentials verified");

        Ok(AccountSummary {
            can_trade: account.can_trade,
            total_wallet_balance: account.total_wallet_balance,
            total_margin_balance: account.total_margin_balance,
            available_balance: account.available_balance,
            total_unrealized_profit: account.total_unrealized_profit,
        })
    }
}

/// Parameters for POST /fapi/v1/order, in the order Binance documents them.
pub(crate) fn order_params(
    symbol: &str,
    side: Side,
    order_type: OrderType,
    quantity: Decimal,
    limit: Option<(Decimal, TimeInForce)>,
    client_order_id: &str,
) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("symbol", symbol.to_string()),
        ("side", side.as_str().to_string()),
        ("type", order_type.as_str().to_string()),
    ];
    if let Some((_, tif)) = limit {
        params.push(("timeInForce", tif.as_str().to_string()));
    }
    params.push(("quantity", quantity.to_string()));
    if let Some((price, _)) = limit {
        params.push(("price", price.to_string()));
    }
    params.push(("newClientOrderId", client_order_id.to_string()));
    params.push(("newOrderRespType", ORDER_RESPONSE_TYPE.to_string()));
    params
}

pub(crate) fn build_query(params: &[(&str, String)]) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

/// Hex HMAC-SHA256 of the query string.
pub(crate) fn sign(secret: &str, payload: &str) -> ExchangeResult<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| ExchangeError::request("signature", format!("HMAC init failed: {}", e)))?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

#[derive(Deserialize)]
struct BinanceApiError {
    code: i64,
    msg: String,
}

/// Splits an HTTP answer into success, transport failure or exchange rejection.
pub(crate) fn parse_response(status: u16, body: &str) -> ExchangeResult<Value> {
    let api_error = serde_json::from_str::<BinanceApiError>(body).ok();

    if (200..300).contains(&status) {
        if let Some(e) = api_error.filter(|e| e.code < 0) {
            return Err(ExchangeError::Rejected {
                status,
                code: e.code,
                message: e.msg,
            });
        }
        return serde_json::from_str(body).map_err(|e| {
            ExchangeError::request("decode", format!("{} (body: {})", e, body))
        });
    }

    // Server side trouble, rate limits and IP bans say nothing about the order.
    let transient = status >= 500 || status == 418 || status == 429;

    match api_error {
        Some(e) if !transient => Err(ExchangeError::Rejected {
            status,
            code: e.code,
            message: e.msg,
        }),
        Some(e) => Err(ExchangeError::request(
            format!("http_{}", status),
            format!("{} (code {})", e.msg, e.code),
        )),
        None => Err(ExchangeError::request(
            format!("http_{}", status),
            if body.trim().is_empty() {
                format!("HTTP {} with empty body", status)
            } else {
                body.trim().to_string()
            },
        )),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BinanceOrderResponse {
    order_id: i64,
    #[serde(default)]
    client_order_id: Option<String>,
    symbol: String,
    status: String,
    side: String,
    #[serde(rename = "type")]
    order_type: String,
    #[serde(default)]
    orig_qty: Option<Decimal>,
    #[serde(default)]
    executed_qty: Option<Decimal>,
    #[serde(default)]
    price: Option<Decimal>,
    #[serde(default)]
    avg_price: Option<Decimal>,
    #[serde(default)]
    update_time: Option<i64>,
}

pub(crate) fn parse_order_ack(raw: Value) -> ExchangeResult<OrderAck> {
    let resp: BinanceOrderResponse = serde_json::from_value(raw.clone()).map_err(|e| {
        ExchangeError::request("decode", format!("order response: {} (body: {})", e, raw))
    })?;

    Ok(OrderAck {
        order_id: resp.order_id.to_string(),
        client_order_id: resp.client_order_id,
        symbol: resp.symbol,
        status: resp.status,
        side: resp.side,
        order_type: resp.order_type,
        orig_qty: resp.orig_qty,
        executed_qty: resp.executed_qty,
        // Binance reports "0" for fields that do not apply yet.
        price: resp.price.filter(|p| !p.is_zero()),
        avg_price: resp.avg_price.filter(|p| !p.is_zero()),
        update_time: resp.update_time.and_then(DateTime::from_timestamp_millis),
        raw,
    })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BinanceAccount {
    #[serde(default)]
    can_trade: bool,
    #[serde(default)]
    total_wallet_balance: Option<Decimal>,
    #[serde(default)]
    total_margin_balance: Option<Decimal>,
    #[serde(default)]
    available_balance: Option<Decimal>,
    #[serde(default)]
    total_unrealized_profit: Option<Decimal>,
}
