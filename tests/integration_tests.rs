//! Integration tests for the order pipeline.
//! These tests drive the public API end to end against a local HTTP server
//! that plays the part of the futures testnet.

use futures_order_cli::config::BinanceConfig;
use futures_order_cli::services::reporting::result_reports;
use futures_order_cli::{
    AppConfig, BinanceFuturesExchange, FailureKind, OrderResult, OrderService, OrderState,
    RawOrderInput, TimeInForce, TradingApi,
};
use rust_decimal_macros::dec;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serves exactly one canned response and returns the request head it saw.
async fn one_shot_server(status: u16, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }

        let response = format!(
            "HTTP/1.1 {} Test\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        String::from_utf8_lossy(&request).to_string()
    });

    (base_url, handle)
}

fn binance_config(base_url: &str) -> BinanceConfig {
    BinanceConfig {
        api_key: Some("test-api-key".to_string()),
        secret_key: Some("test-secret".to_string()),
        base_url: base_url.to_string(),
        recv_window_ms: 5000,
        timeout_secs: 5,
    }
}

fn service_for(base_url: &str) -> OrderService {
    let exchange = BinanceFuturesExchange::new(&binance_config(base_url)).unwrap();
    OrderService::new(Arc::new(exchange), TimeInForce::Gtc)
}

/// Request line of a captured HTTP request.
fn request_line(request: &str) -> &str {
    request.lines().next().unwrap_or_default()
}

const MARKET_FILLED: &str = r#"{"orderId":8389765,"symbol":"BTCUSDT","status":"FILLED","clientOrderId":"abc","price":"0","avgPrice":"64000.50","origQty":"0.003","executedQty":"0.003","cumQuote":"192.0015","timeInForce":"GTC","type":"MARKET","side":"BUY","updateTime":1700000000000}"#;

const LIMIT_NEW: &str = r#"{"orderId":8389766,"symbol":"ETHUSDT","status":"NEW","clientOrderId":"def","price":"3500.50","avgPrice":"0.00","origQty":"0.01","executedQty":"0","timeInForce":"GTC","type":"LIMIT","side":"SELL","updateTime":1700000000500}"#;

/// MARKET order flows through signing, HTTP and response mapping
#[tokio::test]
async fn test_market_order_end_to_end() {
    let (base_url, server) = one_shot_server(200, MARKET_FILLED).await;
    let raw = RawOrderInput::new("BTCUSDT", "BUY", "MARKET", "0.003", None);

    let result = service_for(&base_url).place_order(&raw).await;
    let request = server.await.unwrap();

    let line = request_line(&request);
    assert!(line.starts_with("POST /fapi/v1/order?symbol=BTCUSDT&side=BUY&type=MARKET&quantity=0.003&"));
    assert!(line.contains("newOrderRespType=RESULT"));
    assert!(line.contains("recvWindow=5000"));
    assert!(line.contains("&signature="));
    assert!(!line.contains("price="));
    assert!(!line.contains("timeInForce"));
    assert!(request.to_ascii_lowercase().contains("x-mbx-apikey: test-api-key"));

    match result {
        OrderResult::Accepted(s) => {
            assert_eq!(s.order_id, "8389765");
            assert_eq!(s.status, "FILLED");
            assert_eq!(s.quantity, dec!(0.003));
            assert_eq!(s.avg_price, Some(dec!(64000.50)));
            assert_eq!(s.price, None);
        }
        other => panic!("Expected Accepted, got {:?}", other),
    }
}

/// LIMIT order carries price and time in force on the wire
#[tokio::test]
async fn test_limit_order_end_to_end() {
    let (base_url, server) = one_shot_server(200, LIMIT_NEW).await;
    let raw = RawOrderInput::new("ETHUSDT", "SELL", "LIMIT", "0.01", Some("3500.50"));

    let result = service_for(&base_url).place_order(&raw).await;
    let request = server.await.unwrap();

    assert!(request_line(&request).contains(
        "symbol=ETHUSDT&side=SELL&type=LIMIT&timeInForce=GTC&quantity=0.01&price=3500.50&"
    ));
    match result {
        OrderResult::Accepted(s) => {
            assert_eq!(s.status, "NEW");
            assert_eq!(s.price, Some(dec!(3500.50)));
            assert_eq!(s.time_in_force, Some(TimeInForce::Gtc));
            assert_eq!(s.avg_price, None);
        }
        other => panic!("Expected Accepted, got {:?}", other),
    }
}

/// LIMIT without a price is rejected before any connection is made
#[tokio::test]
async fn test_missing_price_makes_no_request() {
    // Nothing listens here; any request would fail as a transport error.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let raw = RawOrderInput::new("ETHUSDT", "SELL", "LIMIT", "0.01", None);
    let result = service_for(&base_url).place_order(&raw).await;

    assert_eq!(result.state(), OrderState::Rejected);
    assert_eq!(result.failure_kind(), Some(FailureKind::MissingPrice));
    assert_eq!(result.exit_code(), 1);
}

/// Exchange business errors keep the remote code and message
#[tokio::test]
async fn test_margin_rejection_end_to_end() {
    let (base_url, server) =
        one_shot_server(400, r#"{"code":-2019,"msg":"Margin is insufficient."}"#).await;
    let raw = RawOrderInput::new("BTCUSDT", "BUY", "MARKET", "100", None);

    let result = service_for(&base_url).place_order(&raw).await;
    server.await.unwrap();

    assert_eq!(result.failure_kind(), Some(FailureKind::RemoteBusinessFailure));
    assert_eq!(result.failure_message(), Some("Margin is insufficient."));
    match &result {
        OrderResult::Failed(f) => {
            assert_eq!(f.code, "-2019");
            assert_eq!(f.http_status, Some(400));
        }
        other => panic!("Expected Failed, got {:?}", other),
    }

    let reports = result_reports(&result, None);
    assert_eq!(reports[0].title, "ERROR");
    assert!(reports[0].lines.iter().any(|l| l.contains("Margin is insufficient.")));
}

/// Rate limiting is a request failure, not a business rejection
#[tokio::test]
async fn test_rate_limit_is_request_failure() {
    let (base_url, server) =
        one_shot_server(429, r#"{"code":-1003,"msg":"Too many requests."}"#).await;
    let raw = RawOrderInput::new("BTCUSDT", "BUY", "MARKET", "1", None);

    let result = service_for(&base_url).place_order(&raw).await;
    server.await.unwrap();

    assert_eq!(result.failure_kind(), Some(FailureKind::RemoteRequestFailure));
}

/// Unreachable host surfaces as a request failure after one attempt
#[tokio::test]
async fn test_unreachable_exchange() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let raw = RawOrderInput::new("BTCUSDT", "BUY", "MARKET", "0.003", None);
    let result = service_for(&base_url).place_order(&raw).await;

    assert_eq!(result.state(), OrderState::Failed);
    assert_eq!(result.failure_kind(), Some(FailureKind::RemoteRequestFailure));
}

/// Signed account call maps balances
#[tokio::test]
async fn test_check_connection() {
    let (base_url, server) = one_shot_server(
        200,
        r#"{"canTrade":true,"totalWalletBalance":"15000.00","totalMarginBalance":"15000.00","availableBalance":"14950.25","totalUnrealizedProfit":"0.00","assets":[]}"#,
    )
    .await;
    let exchange = BinanceFuturesExchange::new(&binance_config(&base_url)).unwrap();

    let account = exchange.check_connection().await.unwrap();
    let request = server.await.unwrap();

    assert!(request_line(&request).starts_with("GET /fapi/v2/account?recvWindow=5000&timestamp="));
    assert!(account.can_trade);
    assert_eq!(account.available_balance, Some(dec!(14950.25)));
}

/// Missing credentials stop client construction
#[test]
fn test_exchange_requires_credentials() {
    let config = AppConfig::from_sources(None, |_| None).unwrap();
    assert!(BinanceFuturesExchange::new(&config.binance).is_err());
}

/// Configuration from YAML plus environment feeds the service
#[tokio::test]
async fn test_config_time_in_force_reaches_wire() {
    let (base_url, server) = one_shot_server(200, LIMIT_NEW).await;
    let yaml = format!("binance:\n  base_url: \"{}\"\norders:\n  time_in_force: IOC\n", base_url);
    let config = AppConfig::from_sources(Some(&yaml), |key| match key {
        "BINANCE_API_KEY" => Some("k".to_string()),
        "BINANCE_API_SECRET" => Some("s".to_string()),
        _ => None,
    })
    .unwrap();

    let exchange = BinanceFuturesExchange::new(&config.binance).unwrap();
    let service = OrderService::new(Arc::new(exchange), config.orders.time_in_force);
    let raw = RawOrderInput::new("ETHUSDT", "SELL", "LIMIT", "0.01", Some("3500.50"));

    let result = service.place_order(&raw).await;
    let request = server.await.unwrap();

    assert!(request_line(&request).contains("timeInForce=IOC"));
    match result {
        OrderResult::Accepted(s) => assert_eq!(s.time_in_force, Some(TimeInForce::Ioc)),
        other => panic!("Expected Accepted, got {:?}", other),
    }
}
