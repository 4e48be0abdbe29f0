use super::cost::{Cost, CostRecord};
use super::country::{CountryCode, CountryLookupResult};
use crate::error::{LookupError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Persistence contract for clearing cost records.
#[async_trait]
pub trait CostStore: Send + Sync {
    async fn find_by_country_code(&self, code: &CountryCode) -> Result<Option<CostRecord>>;
    async fn find_by_id(&self, id: u64) -> Result<Option<CostRecord>>;
    async fn find_all(&self) -> Result<Vec<CostRecord>>;
    /// Inserts the record, assigning an id when it has none, or replaces the
    /// record with the same id.
    async fn save(&self, record: CostRecord) -> Result<CostRecord>;
    /// Overwrites country and cost of an existing record. `None` if `id` is unknown.
    async fn update(
        &self,
        id: u64,
        country_code: CountryCode,
        cost: Cost,
    ) -> Result<Option<CostRecord>>;
    /// Returns `false` when no record with `id` existed.
    async fn delete(&self, id: u64) -> Result<bool>;
}

/// Resolves the issuing country of a card from its number.
#[async_trait]
pub trait CountryLookup: Send + Sync {
    async fn lookup(&self, pan: &str) -> std::result::Result<CountryLookupResult, LookupError>;
}

pub type CostStoreRef = Arc<dyn CostStore>;
pub type CountryLookupRef = Arc<dyn CountryLookup>;
