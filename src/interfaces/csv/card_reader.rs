use crate::error::{CardCostError, Result};
use serde::Deserialize;
use std::io::Read;

/// One row of a quote request file.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct CardRequest {
    pub card_number: String,
}

/// Reads card numbers from a CSV source with a `card_number` column.
///
/// Fields are trimmed of surrounding whitespace but otherwise passed through
/// untouched; validation is left to the resolver.
pub struct CardReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CardReader<R> {
    /// Creates a new `CardReader` over a CSV source.
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily yields one request per row.
    pub fn cards(self) -> impl Iterator<Item = Result<CardRequest>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(CardCostError::from))
    }
}
