use clap::Parser;
use colored::Colorize;
use serde_json::json;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

use futures_order_cli::cli::{Cli, Commands, OrderArgs};
use futures_order_cli::logging::init_logging;
use futures_order_cli::services::reporting::{
    account_report, dry_run_report, request_report, result_reports, Report,
};
use futures_order_cli::{AppConfig, BinanceFuturesExchange, OrderResult, OrderService, TradingApi};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "✗ Configuration error:".red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    // Flushes the log file on exit.
    let guard = init_logging(&config.logging);
    let log_dir = guard.as_ref().map(|_| config.logging.dir.as_path());
    info!("Starting futures-order...");
    info!("Loaded Configuration: {:?}", config);

    match cli.command {
        Commands::Order(args) => run_order(&config, &args, log_dir).await,
        Commands::Check => run_check(&config).await,
    }
}

async fn run_order(config: &AppConfig, args: &OrderArgs, log_dir: Option<&Path>) -> ExitCode {
    let raw = args.raw_input();
    if !args.json {
        print_report(&request_report(&raw));
    }

    if args.dry_run {
        return match OrderService::validate_only(&raw) {
            Ok(order) => {
                info!("[ORDER] Dry run, order not sent");
                if args.json {
                    print_json(&json!({ "outcome": "dry_run", "order": order }));
                } else {
                    print_report(&dry_run_report(&order));
                }
                ExitCode::SUCCESS
            }
            Err(e) => finish(&OrderResult::Rejected(e), args.json, log_dir),
        };
    }

    let exchange = match BinanceFuturesExchange::new(&config.binance) {
        Ok(exchange) => exchange,
        Err(e) => {
            // A bad order is reported as such even without credentials.
            if let Err(v) = OrderService::validate_only(&raw) {
                return finish(&OrderResult::Rejected(v), args.json, log_dir);
            }
            error!("[ORDER] Cannot create exchange client: {}", e);
            eprintln!("{} {}", "✗ Configuration error:".red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    let service = OrderService::new(Arc::new(exchange), config.orders.time_in_force);
    let result = service.place_order(&raw).await;
    finish(&result, args.json, log_dir)
}

async fn run_check(config: &AppConfig) -> ExitCode {
    let exchange = match BinanceFuturesExchange::new(&config.binance) {
        Ok(exchange) => exchange,
        Err(e) => {
            eprintln!("{} {}", "✗ Configuration error:".red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    match exchange.check_connection().await {
        Ok(account) => {
            print_report(&account_report(exchange.name(), &account));
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("[CHECK] Connection check failed: {}", e);
            print_report(&Report {
                title: "ERROR",
                lines: vec![format!("✗ {}", e)],
                ok: false,
            });
            ExitCode::FAILURE
        }
    }
}

fn finish(result: &OrderResult, as_json: bool, log_dir: Option<&Path>) -> ExitCode {
    if as_json {
        print_json(result);
    } else {
        for report in result_reports(result, log_dir) {
            print_report(&report);
        }
    }
    ExitCode::from(result.exit_code() as u8)
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => error!("Failed to serialize output: {}", e),
    }
}

fn print_report(report: &Report) {
    let rule = "=".repeat(60);
    let title = if report.ok {
        report.title.green().bold()
    } else {
        report.title.red().bold()
    };

    println!("\n{}", rule);
    println!("{}", title);
    println!("{}", rule);
    for line in &report.lines {
        if line.starts_with('✓') {
            println!("{}", line.green());
        } else if line.starts_with('✗') {
            println!("{}", line.red());
        } else {
            println!("{}", line);
        }
    }
}
