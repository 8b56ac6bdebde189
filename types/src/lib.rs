// Example code that deserializes the balance endpoint response.
//
// use types::Balance;
//
// fn main() {
//     let json = r#"{"balance": 500}"#;
//     let model: Balance = serde_json::from_str(&json).unwrap();
// }

use serde::{Deserialize, Serialize};

/// Body of the balance endpoint (`GET /api/balance`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    /// Current account balance. Fractional amounts are allowed.
    pub balance: f64,
}
