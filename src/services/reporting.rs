//! Log summaries and terminal reports for order requests and results.

use rust_decimal::Decimal;
use serde::Serialize;
use std::path::Path;

use crate::exchange::types::{AccountSummary, NormalizedOrder};
use crate::logging::log_file_pattern;
use crate::services::order_service::{OrderResult, OrderSuccess};
use crate::validation::RawOrderInput;

/// A titled block of `label: value` lines, printed by the CLI.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Report {
    pub title: &'static str,
    pub lines: Vec<String>,
    pub ok: bool,
}

impl Report {
    fn new(title: &'static str, ok: bool) -> Self {
        Self {
            title,
            lines: Vec::new(),
            ok,
        }
    }

    fn field(mut self, label: &str, value: impl std::fmt::Display) -> Self {
        self.lines.push(format!("{:<15} {}", format!("{}:", label), value));
        self
    }

    fn line(mut self, text: impl Into<String>) -> Self {
        self.lines.push(text.into());
        self
    }
}

pub fn format_order_summary(order: &NormalizedOrder) -> String {
    let mut summary = format!(
        "Symbol={}, Side={}, Type={}, Quantity={}",
        order.symbol(),
        order.side(),
        order.order_type(),
        order.quantity()
    );
    if let Some(price) = order.price() {
        summary.push_str(&format!(", Price={}", price));
    }
    summary
}

pub fn format_order_response(success: &OrderSuccess) -> String {
    format!(
        "OrderID={}, Symbol={}, Side={}, Type={}, Status={}, ExecutedQty={}, AvgPrice={}, Timestamp={}",
        success.order_id,
        success.symbol,
        success.side,
        success.order_type,
        success.status,
        opt(success.executed_qty),
        opt(success.avg_price),
        success
            .update_time
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "-".to_string()),
    )
}

/// The request exactly as typed, before validation.
pub fn request_report(raw: &RawOrderInput) -> Report {
    let mut report = Report::new("ORDER REQUEST", true)
        .field("Symbol", &raw.symbol)
        .field("Side", &raw.side)
        .field("Type", &raw.order_type)
        .field("Quantity", &raw.quantity);
    if let Some(price) = &raw.price {
        report = report.field("Price", price);
    }
    report
}

pub fn dry_run_report(order: &NormalizedOrder) -> Report {
    let mut report = Report::new("DRY RUN", true)
        .field("Symbol", order.symbol())
        .field("Side", order.side())
        .field("Type", order.order_type())
        .field("Quantity", order.quantity());
    if let Some(price) = order.price() {
        report = report.field("Price", price);
    }
    report.line("Order is valid; nothing was sent.")
}

/// Sections describing the outcome, in print order. `log_dir` is where file
/// logging writes, if it is enabled; remote failures point the user there.
pub fn result_reports(result: &OrderResult, log_dir: Option<&Path>) -> Vec<Report> {
    match result {
        OrderResult::Accepted(s) => {
            let mut response = Report::new("ORDER RESPONSE", true)
                .field("Order ID", &s.order_id)
                .field("Status", &s.status)
                .field("Symbol", &s.symbol)
                .field("Side", s.side)
                .field("Type", s.order_type)
                .field("Quantity", s.quantity);
            if let Some(price) = s.price {
                response = response.field("Price", price);
            }
            if let Some(tif) = s.time_in_force {
                response = response.field("Time in force", tif);
            }
            response = response
                .field("Executed Qty", opt(s.executed_qty))
                .field("Avg Price", opt(s.avg_price));
            if let Some(t) = s.update_time {
                response = response.field("Timestamp", t.to_rfc3339());
            }

            vec![
                response,
                Report::new("RESULT", true).line("✓ Order placed successfully!"),
            ]
        }
        OrderResult::Rejected(e) => vec![Report::new("VALIDATION ERROR", false)
            .field("Kind", e.kind)
            .field("Field", e.field)
            .line(format!("✗ {}", e.reason))],
        OrderResult::Failed(f) => {
            let mut report = Report::new("ERROR", false)
                .field("Kind", f.kind)
                .field("Code", &f.code);
            if let Some(status) = f.http_status {
                report = report.field("HTTP status", status);
            }
            report = report.line(format!("✗ {}", f.message));
            if let Some(dir) = log_dir {
                report = report.line(format!("Check {} for details", log_file_pattern(dir)));
            }
            vec![report]
        }
    }
}

pub fn account_report(name: &str, account: &AccountSummary) -> Report {
    Report::new("CONNECTION OK", true)
        .field("Exchange", name)
        .field("Can trade", account.can_trade)
        .field("Wallet", opt(account.total_wallet_balance))
        .field("Margin", opt(account.total_margin_balance))
        .field("Available", opt(account.available_balance))
        .field("Unrealized", opt(account.total_unrealized_profit))
}

fn opt(value: Option<Decimal>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".to_string())
}
