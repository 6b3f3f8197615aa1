//! Open position rows

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One open position as reported by the terminal
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Position {
    pub ticket: i64,
    pub symbol: String,
    /// "buy" / "sell" as the terminal spells it
    pub side: String,
    pub volume: Decimal,
    pub open_price: Decimal,
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
    pub current_price: Decimal,
    pub profit: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_deserialize_partial() {
        let json = r#"{"ticket":42,"symbol":"EURUSD","side":"buy","volume":0.1,"openPrice":1.0850}"#;
        let position: Position = serde_json::from_str(json).unwrap();
        assert_eq!(position.ticket, 42);
        assert_eq!(position.volume, Decimal::new(1, 1));
        assert_eq!(position.open_price, Decimal::new(10850, 4));
        assert_eq!(position.profit, Decimal::ZERO);
    }
}
