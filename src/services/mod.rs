pub mod order_service;
pub mod reporting;
