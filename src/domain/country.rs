use crate::error::CardCostError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// ISO 3166-1 alpha-2 country code.
///
/// Always exactly two uppercase ASCII letters. Parsing trims whitespace and
/// upper-cases the input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode(String);

impl CountryCode {
    /// Parses a country code, trimming and upper-casing the input.
    ///
    /// Returns `ValidationError` unless exactly two ASCII letters remain.
    pub fn parse(value: &str) -> Result<Self, CardCostError> {
        let trimmed = value.trim();
        if trimmed.len() == 2 && trimmed.bytes().all(|b| b.is_ascii_alphabetic()) {
            Ok(Self(trimmed.to_ascii_uppercase()))
        } else {
            Err(CardCostError::ValidationError(format!(
                "Country code must be two letters, got '{}'",
                value
            )))
        }
    }

    /// The code as two uppercase letters.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CountryCode {
    type Err = CardCostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CountryCode {
    type Error = CardCostError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CountryCode> for String {
    fn from(code: CountryCode) -> Self {
        code.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Issuing country resolved for a card by the BIN lookup service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryLookupResult {
    pub alpha2: CountryCode,
}

impl CountryLookupResult {
    /// Creates a new `CountryLookupResult`.
    pub fn new(alpha2: CountryCode) -> Self {
        Self { alpha2 }
    }
}
