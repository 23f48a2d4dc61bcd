//! Currency metadata used to annotate notifications.
//!
//! Amounts are always carried in the smallest unit of their currency. The dictionary supplies the divisibility needed
//! to display them.
use std::{collections::HashMap, fmt::Display};

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db_types::Amount;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurrencyError {
    #[error("Invalid currency code '{0}'. Codes are three letters, with an optional 'T' prefix for testnet coins")]
    InvalidCode(String),
    #[error("Currency {0} is not defined")]
    Undefined(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurrencyType {
    Crypto,
    Fiat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyDefinition {
    pub name: String,
    pub code: String,
    pub currency_type: CurrencyType,
    pub divisibility: u32,
}

impl CurrencyDefinition {
    pub fn new(name: &str, code: &str, currency_type: CurrencyType, divisibility: u32) -> Self {
        Self { name: name.into(), code: code.into(), currency_type, divisibility }
    }

    /// Stand-in for a code the dictionary cannot resolve. Notifications still go out, annotated with this.
    pub fn unknown(code: &str) -> Self {
        Self::new("Unknown currency", code, CurrencyType::Crypto, 8)
    }

    pub fn is_crypto(&self) -> bool {
        self.currency_type == CurrencyType::Crypto
    }
}

impl Display for CurrencyDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}, {} dp)", self.code, self.name, self.divisibility)
    }
}

/// An amount together with the currency needed to display it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyValue {
    pub amount: Amount,
    pub currency: CurrencyDefinition,
}

impl CurrencyValue {
    pub fn new(amount: Amount, currency: CurrencyDefinition) -> Self {
        Self { amount, currency }
    }
}

impl Display for CurrencyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.amount.to_decimal_string(self.currency.divisibility), self.currency.code)
    }
}

const CRYPTO: [(&str, &str, u32); 5] = [
    ("BTC", "Bitcoin", 8),
    ("BCH", "Bitcoin Cash", 8),
    ("LTC", "Litecoin", 8),
    ("ZEC", "Zcash", 8),
    ("ETH", "Ethereum", 18),
];

const FIAT: [(&str, &str); 32] = [
    ("AUD", "Australian Dollar"),
    ("BRL", "Brazilian Real"),
    ("CAD", "Canadian Dollar"),
    ("CHF", "Swiss Franc"),
    ("CNY", "Yuan Renminbi"),
    ("CZK", "Czech Koruna"),
    ("DKK", "Danish Krone"),
    ("EUR", "Euro"),
    ("GBP", "Pound Sterling"),
    ("HKD", "Hong Kong Dollar"),
    ("HUF", "Forint"),
    ("IDR", "Rupiah"),
    ("ILS", "New Israeli Sheqel"),
    ("INR", "Indian Rupee"),
    ("JPY", "Yen"),
    ("KRW", "Won"),
    ("MXN", "Mexican Peso"),
    ("MYR", "Malaysian Ringgit"),
    ("NOK", "Norwegian Krone"),
    ("NZD", "New Zealand Dollar"),
    ("PHP", "Philippine Peso"),
    ("PLN", "Zloty"),
    ("RUB", "Russian Ruble"),
    ("SEK", "Swedish Krona"),
    ("SGD", "Singapore Dollar"),
    ("THB", "Baht"),
    ("TRY", "Turkish Lira"),
    ("TWD", "New Taiwan Dollar"),
    ("UAH", "Hryvnia"),
    ("USD", "United States Dollar"),
    ("VND", "Dong"),
    ("ZAR", "Rand"),
];

/// Lookup table of the currencies the marketplace trades in.
#[derive(Debug, Clone)]
pub struct CurrencyDictionary {
    definitions: HashMap<String, CurrencyDefinition>,
    code_pattern: Regex,
}

impl Default for CurrencyDictionary {
    fn default() -> Self {
        let mut definitions = HashMap::new();
        for (code, name, divisibility) in CRYPTO {
            definitions.insert(code.to_string(), CurrencyDefinition::new(name, code, CurrencyType::Crypto, divisibility));
        }
        for (code, name) in FIAT {
            definitions.insert(code.to_string(), CurrencyDefinition::new(name, code, CurrencyType::Fiat, 2));
        }
        Self::new(definitions)
    }
}

impl CurrencyDictionary {
    pub fn new(definitions: HashMap<String, CurrencyDefinition>) -> Self {
        // The pattern is a literal, so this cannot fail
        let code_pattern = Regex::new(r"^T?[A-Z]{3}$").unwrap();
        Self { definitions, code_pattern }
    }

    /// Resolve a currency code. A four letter code starting with `T` is the testnet variant of a crypto currency.
    pub fn lookup(&self, code: &str) -> Result<CurrencyDefinition, CurrencyError> {
        let code = code.trim().to_ascii_uppercase();
        if !self.code_pattern.is_match(&code) {
            return Err(CurrencyError::InvalidCode(code));
        }
        if code.len() == 4 {
            let main = self
                .definitions
                .get(&code[1..])
                .filter(|d| d.is_crypto())
                .ok_or_else(|| CurrencyError::Undefined(code.clone()))?;
            return Ok(CurrencyDefinition {
                name: format!("Testnet {}", main.name),
                code,
                currency_type: CurrencyType::Crypto,
                divisibility: main.divisibility,
            });
        }
        self.definitions.get(&code).cloned().ok_or(CurrencyError::Undefined(code))
    }
}
