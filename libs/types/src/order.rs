//! Pending order rows

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One pending order as reported by the terminal
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Order {
    pub ticket: i64,
    pub symbol: String,
    /// Order type as the terminal spells it, e.g. "buy_limit"
    #[serde(rename = "type")]
    pub order_type: String,
    pub volume: Decimal,
    pub price: Decimal,
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
    /// Placement time (UTC)
    pub time_utc: DateTime<Utc>,
}
