use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::constants::DEFAULT_CONFIG_PATH;
use crate::validation::RawOrderInput;

#[derive(Parser, Debug)]
#[command(name = "futures-order")]
#[command(version, about = "Place MARKET and LIMIT orders on the Binance USDT-M futures testnet")]
pub struct Cli {
    /// Config file path (optional; environment variables take precedence)
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate an order and submit it to the testnet
    Order(OrderArgs),

    /// Verify credentials with a signed account request
    Check,
}

/// Order fields are taken as raw text; validation happens in the library so
/// every rule reports a typed failure instead of a clap usage error.
#[derive(Args, Debug, Clone)]
pub struct OrderArgs {
    /// Trading pair, e.g. BTCUSDT
    #[arg(long)]
    pub symbol: String,

    /// BUY or SELL
    #[arg(long)]
    pub side: String,

    /// MARKET or LIMIT
    #[arg(long = "type", value_name = "TYPE")]
    pub order_type: String,

    /// Order quantity in base asset units
    #[arg(long, allow_hyphen_values = true)]
    pub quantity: String,

    /// Limit price (required for LIMIT, ignored for MARKET)
    #[arg(long, allow_hyphen_values = true)]
    pub price: Option<String>,

    /// Validate and print the normalized order without sending it
    #[arg(long)]
    pub dry_run: bool,

    /// Print the result as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

impl OrderArgs {
    pub fn raw_input(&self) -> RawOrderInput {
        RawOrderInput::new(
            &self.symbol,
            &self.side,
            &self.order_type,
            &self.quantity,
            self.price.as_deref(),
        )
    }
}
