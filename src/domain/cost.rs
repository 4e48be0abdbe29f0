use super::country::CountryCode;
use crate::error::CardCostError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Clearing cost applied when no country-specific rate is stored.
pub const DEFAULT_CLEARING_COST: Decimal = dec!(10.00);

/// Minimum number of fractional digits a cost carries.
const COST_SCALE: u32 = 2;

/// A non-negative monetary amount with at least two decimal places.
///
/// Values with fewer fractional digits are rescaled (`5` becomes `5.00`);
/// values with more keep their stored precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Cost(Decimal);

impl Cost {
    /// Creates a new `Cost`, rejecting negative amounts with `ValidationError`.
    pub fn new(value: Decimal) -> Result<Self, CardCostError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(CardCostError::ValidationError(
                "Cost must not be negative".to_string(),
            ));
        }
        let mut value = value;
        if value.scale() < COST_SCALE {
            value.rescale(COST_SCALE);
        }
        Ok(Self(value))
    }

    /// Returns the underlying decimal amount.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// The default clearing cost of 10.00.
    pub fn default_cost() -> Self {
        Self(DEFAULT_CLEARING_COST)
    }
}

impl TryFrom<Decimal> for Cost {
    type Error = CardCostError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Cost> for Decimal {
    fn from(cost: Cost) -> Self {
        cost.0
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A clearing cost for one issuing country.
///
/// `id` is `None` until a store assigns one, and stays `None` for the
/// in-memory fallback record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRecord {
    pub id: Option<u64>,
    pub country_code: CountryCode,
    pub cost: Cost,
}

impl CostRecord {
    /// Creates a record not yet assigned an id.
    pub fn new(country_code: CountryCode, cost: Cost) -> Self {
        Self {
            id: None,
            country_code,
            cost,
        }
    }

    /// Synthesizes the default record for a country without a stored rate.
    /// Never persisted.
    pub fn fallback(country_code: CountryCode) -> Self {
        Self::new(country_code, Cost::default_cost())
    }
}

/// Outcome of a cost resolution: the issuing country and the cost applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostQuote {
    pub country: CountryCode,
    pub cost: Cost,
    /// `true` when no stored record matched and the default cost was used.
    pub fallback: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_validation() {
        assert!(Cost::new(dec!(5.00)).is_ok());
        assert!(Cost::new(Decimal::ZERO).is_ok());
        assert!(matches!(
            Cost::new(dec!(-0.01)),
            Err(CardCostError::ValidationError(_))
        ));
    }

    #[test]
    fn test_cost_keeps_two_fraction_digits() {
        assert_eq!(Cost::new(dec!(5)).unwrap().to_string(), "5.00");
        assert_eq!(Cost::new(dec!(5.1)).unwrap().to_string(), "5.10");
        assert_eq!(Cost::new(dec!(0.125)).unwrap().to_string(), "0.125");
    }

    #[test]
    fn test_fallback_record() {
        let record = CostRecord::fallback(CountryCode::parse("ZZ").unwrap());
        assert_eq!(record.id, None);
        assert_eq!(record.cost.value(), dec!(10.00));
        assert_eq!(record.cost.to_string(), "10.00");
    }

    #[test]
    fn test_record_json_rejects_negative_cost() {
        let json = r#"{"id":1,"country_code":"US","cost":"-1.00"}"#;
        assert!(serde_json::from_str::<CostRecord>(json).is_err());

        let json = r#"{"id":1,"country_code":"US","cost":"5.00"}"#;
        let record: CostRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.cost.value(), dec!(5.00));
    }
}
