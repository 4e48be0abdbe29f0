use crate::domain::cost::Cost;
use crate::domain::country::CountryCode;
use crate::error::{CardCostError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct CostRow {
    country_code: String,
    cost: Decimal,
}

/// Reads a clearing cost table (`country_code,cost`) from CSV.
pub struct CostTableReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CostTableReader<R> {
    /// Creates a new `CostTableReader` over a CSV source.
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(source);
        Self { reader }
    }

    /// Yields validated `(country, cost)` pairs; bad rows surface as errors.
    pub fn rows(self) -> impl Iterator<Item = Result<(CountryCode, Cost)>> {
        self.reader.into_deserialize().map(|result| {
            let row: CostRow = result.map_err(CardCostError::from)?;
            Ok((CountryCode::parse(&row.country_code)?, Cost::new(row.cost)?))
        })
    }
}
