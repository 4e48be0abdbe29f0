use crate::domain::cost::{Cost, CostRecord};
use crate::domain::country::CountryCode;
use crate::domain::ports::CostStoreRef;
use crate::error::{CardCostError, Result};
use tokio::sync::Mutex;

/// Maintenance operations over the stored clearing cost table.
///
/// At most one record exists per country; create and update enforce that.
/// Writes made through one catalog are serialized, so concurrent callers
/// sharing it cannot both pass the duplicate check.
pub struct CostCatalog {
    cost_store: CostStoreRef,
    write_lock: Mutex<()>,
}

impl CostCatalog {
    /// Creates a catalog over `cost_store`.
    pub fn new(cost_store: CostStoreRef) -> Self {
        Self {
            cost_store,
            write_lock: Mutex::new(()),
        }
    }

    /// Stores a new clearing cost.
    ///
    /// Fails with `ValidationError` if the country already has a record.
    pub async fn create(&self, country_code: CountryCode, cost: Cost) -> Result<CostRecord> {
        let _guard = self.write_lock.lock().await;
        if self
            .cost_store
            .find_by_country_code(&country_code)
            .await?
            .is_some()
        {
            return Err(CardCostError::ValidationError(format!(
                "Clearing cost for {} already exists",
                country_code
            )));
        }
        let record = self
            .cost_store
            .save(CostRecord::new(country_code, cost))
            .await?;
        tracing::info!(id = ?record.id, country = %record.country_code, cost = %record.cost, "clearing cost created");
        Ok(record)
    }

    /// All records ordered by id.
    pub async fn list(&self) -> Result<Vec<CostRecord>> {
        let mut records = self.cost_store.find_all().await?;
        records.sort_by_key(|r| r.id);
        Ok(records)
    }

    /// Returns the record of a country, or `RecordNotFound`.
    pub async fn get_by_country(&self, country_code: &CountryCode) -> Result<CostRecord> {
        self.cost_store
            .find_by_country_code(country_code)
            .await?
            .ok_or_else(|| {
                CardCostError::RecordNotFound(format!("no clearing cost for country {}", country_code))
            })
    }

    /// Replaces country and cost of record `id`.
    ///
    /// Fails with `RecordNotFound` for an unknown id and with `ValidationError`
    /// if another record already holds `country_code`.
    pub async fn update(&self, id: u64, country_code: CountryCode, cost: Cost) -> Result<CostRecord> {
        let _guard = self.write_lock.lock().await;
        if let Some(existing) = self.cost_store.find_by_country_code(&country_code).await?
            && existing.id != Some(id)
        {
            return Err(CardCostError::ValidationError(format!(
                "Clearing cost for {} already exists",
                country_code
            )));
        }
        let record = self
            .cost_store
            .update(id, country_code, cost)
            .await?
            .ok_or_else(|| CardCostError::RecordNotFound(format!("no clearing cost with id {}", id)))?;
        tracing::info!(id, country = %record.country_code, cost = %record.cost, "clearing cost updated");
        Ok(record)
    }

    /// Removes record `id`, or fails with `RecordNotFound`.
    pub async fn delete(&self, id: u64) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        if !self.cost_store.delete(id).await? {
            return Err(CardCostError::RecordNotFound(format!(
                "no clearing cost with id {}",
                id
            )));
        }
        tracing::info!(id, "clearing cost deleted");
        Ok(())
    }

    /// Loads a cost table, skipping countries that already have a record.
    /// Returns how many records were created.
    pub async fn seed<I>(&self, records: I) -> Result<usize>
    where
        I: IntoIterator<Item = (CountryCode, Cost)>,
    {
        let mut created = 0;
        for (country_code, cost) in records {
            match self.create(country_code, cost).await {
                Ok(_) => created += 1,
                Err(CardCostError::ValidationError(reason)) => {
                    tracing::warn!(%reason, "skipping cost table row");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(created)
    }
}
