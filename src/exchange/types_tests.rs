//! Unit tests for exchange types and the order normalizer.

#[cfg(test)]
mod types_tests {
    use crate::exchange::types::*;
    use crate::validation::{validate_all, RawOrderInput};
    use rust_decimal_macros::dec;

    fn normalized(raw: RawOrderInput) -> NormalizedOrder {
        NormalizedOrder::from_validated(validate_all(&raw).unwrap())
    }

    // ============= Side Tests =============

    #[test]
    fn test_side_wire_format() {
        assert_eq!(serde_json::to_string(&Side::Buy).unwrap(), "\"BUY\"");
        assert_eq!(serde_json::to_string(&Side::Sell).unwrap(), "\"SELL\"");
        assert_eq!(Side::Buy.to_string(), "BUY");
    }

    #[test]
    fn test_side_deserialize() {
        let buy: Side = serde_json::from_str("\"BUY\"").unwrap();
        let sell: Side = serde_json::from_str("\"SELL\"").unwrap();
        assert_eq!(buy, Side::Buy);
        assert_eq!(sell, Side::Sell);
    }

    // ============= OrderType Tests =============

    #[test]
    fn test_order_type_wire_format() {
        assert_eq!(OrderType::Market.as_str(), "MARKET");
        assert_eq!(serde_json::to_string(&OrderType::Limit).unwrap(), "\"LIMIT\"");
    }

    // ============= TimeInForce Tests =============

    #[test]
    fn test_tif_default_is_gtc() {
        assert_eq!(TimeInForce::default(), TimeInForce::Gtc);
        assert_eq!(TimeInForce::default().to_string(), "GTC");
    }

    #[test]
    fn test_tif_from_str() {
        assert_eq!("gtc".parse::<TimeInForce>().unwrap(), TimeInForce::Gtc);
        assert_eq!(" IOC ".parse::<TimeInForce>().unwrap(), TimeInForce::Ioc);
        assert_eq!("Fok".parse::<TimeInForce>().unwrap(), TimeInForce::Fok);
        assert_eq!("gtx".parse::<TimeInForce>().unwrap(), TimeInForce::Gtx);
        assert!("day".parse::<TimeInForce>().is_err());
    }

    // ============= Pricing Tests =============

    #[test]
    fn test_pricing_market_has_no_price() {
        assert_eq!(Pricing::Market.price(), None);
        assert_eq!(Pricing::Market.order_type(), OrderType::Market);
    }

    #[test]
    fn test_pricing_limit_carries_price() {
        let pricing = Pricing::Limit { price: dec!(100.5) };
        assert_eq!(pricing.price(), Some(dec!(100.5)));
        assert_eq!(pricing.order_type(), OrderType::Limit);
    }

    // ============= NormalizedOrder Tests =============

    #[test]
    fn test_normalized_market_order() {
        let order = normalized(RawOrderInput::new("btcusdt", "buy", "market", "0.003", Some("99")));

        assert_eq!(order.symbol(), "BTCUSDT");
        assert_eq!(order.side(), Side::Buy);
        assert_eq!(order.order_type(), OrderType::Market);
        assert_eq!(order.quantity(), dec!(0.003));
        assert_eq!(order.price(), None);
    }

    #[test]
    fn test_normalized_limit_order() {
        let order = normalized(RawOrderInput::new("ETHUSDT", "SELL", "LIMIT", "0.01", Some("3500.50")));

        assert_eq!(order.order_type(), OrderType::Limit);
        assert_eq!(order.price(), Some(dec!(3500.50)));
        assert_eq!(order.pricing(), Pricing::Limit { price: dec!(3500.50) });
    }

    #[test]
    fn test_normalized_order_serialization() {
        let order = normalized(RawOrderInput::new("ETHUSDT", "SELL", "LIMIT", "0.01", Some("3500.50")));
        let value = serde_json::to_value(&order).unwrap();

        assert_eq!(value["symbol"], "ETHUSDT");
        assert_eq!(value["side"], "SELL");
        assert_eq!(value["type"], "LIMIT");
        assert_eq!(value["quantity"], "0.01");
        assert_eq!(value["price"], "3500.50");

        let market = normalized(RawOrderInput::new("BTCUSDT", "BUY", "MARKET", "1", None));
        let value = serde_json::to_value(&market).unwrap();
        assert_eq!(value["type"], "MARKET");
        assert!(value.get("price").is_none());
    }
}
