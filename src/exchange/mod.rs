pub mod traits;
pub mod types;

pub mod binance;

#[cfg(test)]
mod types_tests;
