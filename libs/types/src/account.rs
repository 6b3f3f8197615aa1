//! Account summary types
//!
//! The account block of a snapshot. Figures are reported by the terminal and
//! carried through unchanged; nothing here recomputes margin or equity.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Account summary reported with every snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Account {
    pub broker: String,
    pub server: String,
    /// Terminal login number
    pub login: i64,
    /// Deposit currency, e.g. "USD"
    pub currency: String,
    pub balance: Decimal,
    pub equity: Decimal,
    pub margin: Decimal,
    pub free_margin: Decimal,
    /// Equity / margin in percent, as reported by the terminal
    pub margin_level: Decimal,
}

impl Account {
    /// Create an account summary with a flat balance (equity = balance, no margin used)
    pub fn with_balance(
        broker: impl Into<String>,
        login: i64,
        currency: impl Into<String>,
        balance: Decimal,
    ) -> Self {
        Self {
            broker: broker.into(),
            login,
            currency: currency.into(),
            balance,
            equity: balance,
            free_margin: balance,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_with_balance() {
        let account = Account::with_balance("Demo", 12345, "USD", Decimal::from(10000));
        assert_eq!(account.equity, Decimal::from(10000));
        assert_eq!(account.free_margin, Decimal::from(10000));
        assert_eq!(account.margin, Decimal::ZERO);
    }

    #[test]
    fn test_account_accepts_json_numbers() {
        let json = r#"{"broker":"Demo","login":7,"currency":"USD","balance":10000.5,"equity":"10010"}"#;
        let account: Account = serde_json::from_str(json).unwrap();
        assert_eq!(account.login, 7);
        assert_eq!(account.balance, Decimal::new(100005, 1));
        assert_eq!(account.equity, Decimal::from(10010));
        assert!(account.server.is_empty());
    }

    #[test]
    fn test_account_camel_case_fields() {
        let account = Account::with_balance("Demo", 1, "EUR", Decimal::from(5));
        let json = serde_json::to_value(&account).unwrap();
        assert!(json.get("freeMargin").is_some());
        assert!(json.get("marginLevel").is_some());
    }
}
