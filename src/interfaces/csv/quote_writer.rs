use crate::domain::cost::CostQuote;
use crate::domain::pan::mask_pan;
use crate::error::{CardCostError, Result};
use crate::interfaces::gateway::{outcome_label, status_code};
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct QuoteRow<'a> {
    card: String,
    country: Option<&'a str>,
    cost: Option<String>,
    status: u16,
    outcome: &'static str,
}

/// Writes one CSV row per quote request: `card,country,cost,status,outcome`.
///
/// Card numbers are masked. Failed requests leave country and cost empty.
pub struct QuoteWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> QuoteWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_outcome(&mut self, pan: &str, outcome: &Result<CostQuote>) -> Result<()> {
        let row = match outcome {
            Ok(quote) => QuoteRow {
                card: mask_pan(pan),
                country: Some(quote.country.as_str()),
                cost: Some(quote.cost.to_string()),
                status: 200,
                outcome: if quote.fallback { "default" } else { "ok" },
            },
            Err(e) => QuoteRow {
                card: mask_pan(pan),
                country: None,
                cost: None,
                status: status_code(e.kind()),
                outcome: outcome_label(e.kind()),
            },
        };
        self.writer.serialize(row)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(CardCostError::from)
    }
}
