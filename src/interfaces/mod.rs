//! Adapters between the outside world and the application layer: the request
//! gateway and CSV input/output.

pub mod csv;
pub mod gateway;
