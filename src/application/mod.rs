//! Application layer containing the clearing cost orchestration.
//!
//! `ClearingCostResolver` turns a card number into a cost, `AdmissionController`
//! throttles calls into it, and `CostCatalog` maintains the stored cost table.
//! All three are `Send + Sync` and meant to be shared by `Arc` between tasks.

pub mod admission;
pub mod catalog;
pub mod resolver;
