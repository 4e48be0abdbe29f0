use crate::domain::cost::CostRecord;
use crate::error::{CardCostError, Result};
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct CostRow<'a> {
    id: Option<u64>,
    country_code: &'a str,
    cost: String,
}

/// Writes clearing cost records as `id,country_code,cost`.
pub struct CostWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CostWriter<W> {
    /// Creates a new `CostWriter` over `sink`.
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// Writes every record, then flushes the sink.
    pub fn write_records<'a, I>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a CostRecord>,
    {
        for record in records {
            self.writer.serialize(CostRow {
                id: record.id,
                country_code: record.country_code.as_str(),
                cost: record.cost.to_string(),
            })?;
        }
        self.writer.flush().map_err(CardCostError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cost::Cost;
    use crate::domain::country::CountryCode;
    use rust_decimal_macros::dec;

    #[test]
    fn test_write_records() {
        let mut record = CostRecord::new(
            CountryCode::parse("GR").unwrap(),
            Cost::new(dec!(15)).unwrap(),
        );
        record.id = Some(3);

        let mut buf = Vec::new();
        CostWriter::new(&mut buf)
            .write_records([&record])
            .unwrap();

        let output = String::from_utf8(buf).unwrap();
        assert_eq!(output, "id,country_code,cost\n3,GR,15.00\n");
    }

    #[test]
    fn test_write_nothing() {
        let mut buf = Vec::new();
        CostWriter::new(&mut buf)
            .write_records(std::iter::empty())
            .unwrap();
        assert!(buf.is_empty());
    }
}
