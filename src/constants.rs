//! Application-wide constants
//!
//! Endpoints, environment variable names and defaults live here so the
//! config layer and the Binance adapter agree on them.

/// Binance USDⓈ-M Futures endpoints and defaults
pub mod binance {
    /// Futures testnet REST base URL
    pub const TESTNET_BASE_URL: &str = "https://testnet.binancefuture.com";

    pub const ORDER_PATH: &str = "/fapi/v1/order";
    pub const ACCOUNT_PATH: &str = "/fapi/v2/account";

    pub const API_KEY_HEADER: &str = "X-MBX-APIKEY";

    /// Ask for the RESULT response so market fills report avgPrice.
    pub const ORDER_RESPONSE_TYPE: &str = "RESULT";

    /// Default tolerance for the signed timestamp (Binance max is 60000)
    pub const DEFAULT_RECV_WINDOW_MS: u64 = 5_000;
    pub const MAX_RECV_WINDOW_MS: u64 = 60_000;

    /// HTTP timeout for a single request
    pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
}

/// Environment variable names
pub mod env {
    pub const API_KEY: &str = "BINANCE_API_KEY";
    pub const API_SECRET: &str = "BINANCE_API_SECRET";
    pub const BASE_URL: &str = "BINANCE_TESTNET_URL";
    pub const RECV_WINDOW_MS: &str = "BINANCE_RECV_WINDOW_MS";
    pub const TIMEOUT_SECS: &str = "BINANCE_TIMEOUT_SECS";
    pub const TIME_IN_FORCE: &str = "ORDER_TIME_IN_FORCE";
    pub const LOG_DIR: &str = "LOG_DIR";
    pub const LOG_LEVEL: &str = "LOG_LEVEL";
}

/// Logging defaults
pub mod logging {
    pub const DEFAULT_DIR: &str = "logs";
    /// Files are named `trading_bot.<date>.log`.
    pub const FILE_PREFIX: &str = "trading_bot";
    pub const FILE_SUFFIX: &str = "log";
    /// Rotated files kept on disk; older ones are deleted.
    pub const MAX_FILES: usize = 5;
    pub const DEFAULT_LEVEL: &str = "info";
}

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";
