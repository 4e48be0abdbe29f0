pub mod card_reader;
pub mod cost_table_reader;
pub mod cost_writer;
pub mod quote_writer;
