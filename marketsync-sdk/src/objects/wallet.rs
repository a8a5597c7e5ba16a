//! Wallet balance and top-up schemas.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

fn default_currency() -> String {
    "INR".to_string()
}

/// `data` of `GET /api/wallet/balance`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletBalance {
    pub balance: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
}

/// Body of `POST /api/wallet/topup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopUpRequest {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method_id: Option<String>,
}

/// `data` of `POST /api/wallet/topup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopUpReceipt {
    #[serde(alias = "_id")]
    pub transaction_id: String,
    pub balance: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_balance_accepts_number_and_string() {
        let b: WalletBalance = serde_json::from_value(json!({"balance": 250.5})).unwrap();
        assert_eq!(b.balance, Decimal::new(2505, 1));
        assert_eq!(b.currency, "INR");

        let b: WalletBalance =
            serde_json::from_value(json!({"balance": "99.99", "currency": "USD"})).unwrap();
        assert_eq!(b.balance, Decimal::new(9999, 2));
    }

    #[test]
    fn test_top_up_amount_is_a_number() {
        let body = TopUpRequest {
            amount: Decimal::new(50000, 2),
            payment_method_id: None,
        };
        assert_eq!(serde_json::to_value(&body).unwrap(), json!({"amount": 500.0}));
    }
}
