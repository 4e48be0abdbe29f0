//! Domain types and the ports the application layer depends on.

pub mod cost;
pub mod country;
pub mod pan;
pub mod ports;
