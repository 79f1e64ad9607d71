//! Currency - Type-safe currency codes
//!
//! Grants are denominated in a single fiat currency. Common codes are
//! pre-defined; anything else falls back to the `Other` variant.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur when parsing currency codes
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CurrencyError {
    #[error("Empty currency code")]
    EmptyCode,

    #[error("Currency code too long (max 10 chars): {0}")]
    TooLong(String),

    #[error("Invalid currency code format: {0}")]
    InvalidFormat(String),
}

/// Currency codes for grant denominations.
///
/// # Examples
/// ```
/// use grantflow_core::Currency;
///
/// let usd: Currency = "USD".parse().unwrap();
/// assert_eq!(usd, Currency::Usd);
/// assert_eq!(usd.to_string(), "USD");
///
/// let custom: Currency = "XDR".parse().unwrap();
/// assert!(matches!(custom, Currency::Other(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Currency {
    /// US Dollar
    Usd,
    /// Euro
    Eur,
    /// British Pound
    Gbp,
    /// Kazakhstani Tenge
    Kzt,
    /// Russian Ruble
    Rub,
    /// Any other uppercase alphanumeric code
    Other(String),
}

impl Currency {
    /// Canonical uppercase code
    pub fn code(&self) -> &str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Kzt => "KZT",
            Currency::Rub => "RUB",
            Currency::Other(code) => code,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = CurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_uppercase();

        if code.is_empty() {
            return Err(CurrencyError::EmptyCode);
        }
        if code.len() > 10 {
            return Err(CurrencyError::TooLong(code));
        }
        if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(CurrencyError::InvalidFormat(code));
        }

        Ok(match code.as_str() {
            "USD" => Currency::Usd,
            "EUR" => Currency::Eur,
            "GBP" => Currency::Gbp,
            "KZT" => Currency::Kzt,
            "RUB" => Currency::Rub,
            _ => Currency::Other(code),
        })
    }
}

impl TryFrom<String> for Currency {
    type Error = CurrencyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.code().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_parse_to_variants() {
        assert_eq!("USD".parse::<Currency>().unwrap(), Currency::Usd);
        assert_eq!("kzt".parse::<Currency>().unwrap(), Currency::Kzt);
    }

    #[test]
    fn unknown_code_falls_back_to_other() {
        let parsed: Currency = "CHF".parse().unwrap();
        assert_eq!(parsed, Currency::Other("CHF".to_string()));
        assert_eq!(parsed.code(), "CHF");
    }

    #[test]
    fn empty_and_malformed_rejected() {
        assert!(matches!("".parse::<Currency>(), Err(CurrencyError::EmptyCode)));
        assert!(matches!(
            "US-D".parse::<Currency>(),
            Err(CurrencyError::InvalidFormat(_))
        ));
        assert!(matches!(
            "WAYTOOLONGCODE".parse::<Currency>(),
            Err(CurrencyError::TooLong(_))
        ));
    }

    #[test]
    fn serde_uses_code_string() {
        let json = serde_json::to_string(&Currency::Eur).unwrap();
        assert_eq!(json, "\"EUR\"");
        let parsed: Currency = serde_json::from_str("\"RUB\"").unwrap();
        assert_eq!(parsed, Currency::Rub);
    }
}
