use crate::domain::cost::{Cost, CostRecord};
use crate::domain::country::CountryCode;
use crate::domain::ports::CostStore;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// A thread-safe in-memory store for clearing cost records.
///
/// Uses `Arc<RwLock<HashMap<u64, CostRecord>>>` to allow shared concurrent access.
/// Ids are handed out from an atomic sequence starting at 1.
#[derive(Default, Clone)]
pub struct InMemoryCostStore {
    records: Arc<RwLock<HashMap<u64, CostRecord>>>,
    next_id: Arc<AtomicU64>,
}

impl InMemoryCostStore {
    /// Creates a new, empty in-memory cost store.
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[async_trait]
impl CostStore for InMemoryCostStore {
    async fn find_by_country_code(&self, code: &CountryCode) -> Result<Option<CostRecord>> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|r| &r.country_code == code)
            .min_by_key(|r| r.id)
            .cloned())
    }

    async fn find_by_id(&self, id: u64) -> Result<Option<CostRecord>> {
        let records = self.records.read().await;
        Ok(records.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<CostRecord>> {
        let records = self.records.read().await;
        let mut all: Vec<CostRecord> = records.values().cloned().collect();
        all.sort_by_key(|r| r.id);
        Ok(all)
    }

    async fn save(&self, mut record: CostRecord) -> Result<CostRecord> {
        let id = match record.id {
            Some(id) => {
                self.next_id.fetch_max(id, Ordering::Relaxed);
                id
            }
            None => self.allocate_id(),
        };
        record.id = Some(id);
        let mut records = self.records.write().await;
        records.insert(id, record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        id: u64,
        country_code: CountryCode,
        cost: Cost,
    ) -> Result<Option<CostRecord>> {
        let mut records = self.records.write().await;
        Ok(records.get_mut(&id).map(|record| {
            record.country_code = country_code;
            record.cost = cost;
            record.clone()
        }))
    }

    async fn delete(&self, id: u64) -> Result<bool> {
        let mut records = self.records.write().await;
        Ok(records.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record(code: &str, cost: rust_decimal::Decimal) -> CostRecord {
        CostRecord::new(
            CountryCode::parse(code).unwrap(),
            Cost::new(cost).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_in_memory_save_assigns_ids() {
        let store = InMemoryCostStore::new();
        let us = store.save(record("US", dec!(5.00))).await.unwrap();
        let gr = store.save(record("GR", dec!(15.00))).await.unwrap();
        assert_eq!(us.id, Some(1));
        assert_eq!(gr.id, Some(2));

        let retrieved = store.find_by_id(1).await.unwrap().unwrap();
        assert_eq!(retrieved, us);
        assert!(store.find_by_id(3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_in_memory_find_by_country_code() {
        let store = InMemoryCostStore::new();
        store.save(record("US", dec!(5.00))).await.unwrap();

        let us = CountryCode::parse("US").unwrap();
        let found = store.find_by_country_code(&us).await.unwrap().unwrap();
        assert_eq!(found.cost.value(), dec!(5.00));

        let zz = CountryCode::parse("ZZ").unwrap();
        assert!(store.find_by_country_code(&zz).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_in_memory_save_with_explicit_id_advances_sequence() {
        let store = InMemoryCostStore::new();
        let mut explicit = record("US", dec!(5.00));
        explicit.id = Some(10);
        store.save(explicit).await.unwrap();

        let next = store.save(record("GR", dec!(15.00))).await.unwrap();
        assert_eq!(next.id, Some(11));
    }

    #[tokio::test]
    async fn test_in_memory_update_and_delete() {
        let store = InMemoryCostStore::new();
        let us = store.save(record("US", dec!(5.00))).await.unwrap();
        let id = us.id.unwrap();

        let updated = store
            .update(id, CountryCode::parse("CA").unwrap(), Cost::new(dec!(7)).unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.country_code.as_str(), "CA");
        assert_eq!(updated.cost.value(), dec!(7.00));

        assert!(
            store
                .update(99, CountryCode::parse("CA").unwrap(), Cost::new(dec!(1)).unwrap())
                .await
                .unwrap()
                .is_none()
        );

        assert!(store.delete(id).await.unwrap());
        assert!(!store.delete(id).await.unwrap());
        assert!(store.find_all().await.unwrap().is_empty());
    }
}
