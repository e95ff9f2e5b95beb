//! Transfer request/response types and amount parsing.
//!
//! Amounts arrive either as JSON numbers (`12.5`) or as decimal strings
//! (`"12.50"`). They stay in their raw form until the transfer service parses
//! them into a `Decimal`, so a malformed amount is reported in the same place
//! as every other transfer failure.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Largest value a `NUMERIC(10, 2)` balance column can hold.
pub fn max_amount() -> Decimal {
    Decimal::new(9_999_999_999, 2)
}

/// An amount as it arrived in a request body.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(serde_json::Number),
    Text(String),
    /// Anything else (`null`, booleans, objects). Always rejected when parsed.
    Other(serde_json::Value),
}

impl Default for AmountInput {
    fn default() -> Self {
        AmountInput::Other(serde_json::Value::Null)
    }
}

impl From<&str> for AmountInput {
    fn from(text: &str) -> Self {
        AmountInput::Text(text.to_string())
    }
}

impl From<Decimal> for AmountInput {
    fn from(value: Decimal) -> Self {
        AmountInput::Text(value.to_string())
    }
}

impl AmountInput {
    /// Parse a transfer amount: strictly positive, at most two fractional digits.
    ///
    /// The returned value always has scale 2 (`12.5` becomes `12.50`).
    pub fn parse_positive(&self) -> Result<Decimal, AppError> {
        let value = self.parse_decimal()?;
        if value <= Decimal::ZERO {
            return Err(AppError::InvalidAmount(
                "amount must be positive".to_string(),
            ));
        }
        Ok(value)
    }

    /// Parse an opening balance: like `parse_positive` but zero is allowed.
    pub fn parse_non_negative(&self) -> Result<Decimal, AppError> {
        let value = self.parse_decimal()?;
        if value < Decimal::ZERO {
            return Err(AppError::InvalidAmount(
                "amount must not be negative".to_string(),
            ));
        }
        Ok(value.abs())
    }

    fn parse_decimal(&self) -> Result<Decimal, AppError> {
        let raw = match self {
            AmountInput::Number(number) => number.to_string(),
            AmountInput::Text(text) => text.trim().to_string(),
            AmountInput::Other(_) => {
                return Err(AppError::InvalidAmount(
                    "amount must be a number or a decimal string".to_string(),
                ));
            }
        };

        let mut value = Decimal::from_str_exact(&raw)
            .map_err(|_| AppError::InvalidAmount(format!("'{raw}' is not a decimal number")))?;

        if value.normalize().scale() > 2 {
            return Err(AppError::InvalidAmount(
                "amount may have at most two decimal places".to_string(),
            ));
        }
        if value.abs() > max_amount() {
            return Err(AppError::InvalidAmount(format!(
                "amount may not exceed {}",
                max_amount()
            )));
        }

        value.rescale(2);
        Ok(value)
    }
}

/// Request to transfer money from the account in the URL path.
///
/// # JSON Example
///
/// ```json
/// {
///   "transferee": "660e8400-e29b-41d4-a716-446655440001",
///   "amount": "12.50"
/// }
/// ```
///
/// A missing `amount` is treated as malformed and rejected with `invalid_amount`.
#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    /// Account to transfer to (will increase)
    pub transferee: Uuid,

    /// Amount to transfer
    #[serde(default)]
    pub amount: AmountInput,
}

/// Balances of both accounts after a committed transfer.
///
/// # JSON Example
///
/// ```json
/// {
///   "from_balance": "37.75",
///   "to_balance": "15.00"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferOutcome {
    pub from_balance: Decimal,
    pub to_balance: Decimal,
}
