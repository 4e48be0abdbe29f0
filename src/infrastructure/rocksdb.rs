use crate::domain::cost::{Cost, CostRecord};
use crate::domain::country::CountryCode;
use crate::domain::ports::CostStore;
use crate::error::{CardCostError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Column Family for storing clearing cost records, keyed by big-endian id.
pub const CF_COSTS: &str = "clearing_costs";
/// Column Family for bookkeeping such as the id sequence.
pub const CF_META: &str = "meta";

const SEQUENCE_KEY: &[u8] = b"cost_id_sequence";

/// A persistent cost store using RocksDB.
///
/// Records are stored as JSON. Country lookups scan the column family, which
/// is fine for a table with one row per country.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDbCostStore {
    db: Arc<DB>,
    // Serializes id allocation and read-modify-write updates.
    write_lock: Arc<Mutex<()>>,
}

impl RocksDbCostStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_costs = ColumnFamilyDescriptor::new(CF_COSTS, Options::default());
        let cf_meta = ColumnFamilyDescriptor::new(CF_META, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_costs, cf_meta])?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            CardCostError::InternalError(Box::new(std::io::Error::other(format!(
                "{} column family not found",
                name
            ))))
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.write_lock.lock().map_err(|_| {
            CardCostError::InternalError(Box::new(std::io::Error::other(
                "cost store write lock poisoned",
            )))
        })
    }

    fn put(&self, record: &CostRecord, id: u64) -> Result<()> {
        let value = serde_json::to_vec(record).map_err(|e| {
            CardCostError::InternalError(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Serialization error: {}", e),
            )))
        })?;
        self.db.put_cf(self.cf(CF_COSTS)?, id.to_be_bytes(), value)?;
        Ok(())
    }

    fn get(&self, id: u64) -> Result<Option<CostRecord>> {
        match self.db.get_cf(self.cf(CF_COSTS)?, id.to_be_bytes())? {
            Some(bytes) => decode(&bytes).map(Some),
            None => Ok(None),
        }
    }

    fn scan(&self) -> Result<Vec<CostRecord>> {
        let mut records = Vec::new();
        for item in self.db.iterator_cf(self.cf(CF_COSTS)?, IteratorMode::Start) {
            let (_key, value) = item?;
            records.push(decode(&value)?);
        }
        Ok(records)
    }

    fn current_sequence(&self) -> Result<u64> {
        let bytes = self.db.get_cf(self.cf(CF_META)?, SEQUENCE_KEY)?;
        Ok(bytes
            .and_then(|b| <[u8; 8]>::try_from(b.as_slice()).ok())
            .map(u64::from_be_bytes)
            .unwrap_or(0))
    }

    fn store_sequence(&self, value: u64) -> Result<()> {
        self.db
            .put_cf(self.cf(CF_META)?, SEQUENCE_KEY, value.to_be_bytes())?;
        Ok(())
    }
}

fn decode(bytes: &[u8]) -> Result<CostRecord> {
    serde_json::from_slice(bytes).map_err(|e| {
        CardCostError::InternalError(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Deserialization error: {}", e),
        )))
    })
}

#[async_trait]
impl CostStore for RocksDbCostStore {
    async fn find_by_country_code(&self, code: &CountryCode) -> Result<Option<CostRecord>> {
        Ok(self
            .scan()?
            .into_iter()
            .find(|r| &r.country_code == code))
    }

    async fn find_by_id(&self, id: u64) -> Result<Option<CostRecord>> {
        self.get(id)
    }

    async fn find_all(&self) -> Result<Vec<CostRecord>> {
        self.scan()
    }

    async fn save(&self, mut record: CostRecord) -> Result<CostRecord> {
        let _guard = self.lock()?;
        let sequence = self.current_sequence()?;
        let id = match record.id {
            Some(id) => {
                if id > sequence {
                    self.store_sequence(id)?;
                }
                id
            }
            None => {
                let id = sequence + 1;
                self.store_sequence(id)?;
                id
            }
        };
        record.id = Some(id);
        self.put(&record, id)?;
        Ok(record)
    }

    async fn update(
        &self,
        id: u64,
        country_code: CountryCode,
        cost: Cost,
    ) -> Result<Option<CostRecord>> {
        let _guard = self.lock()?;
        let Some(mut record) = self.get(id)? else {
            return Ok(None);
        };
        record.country_code = country_code;
        record.cost = cost;
        self.put(&record, id)?;
        Ok(Some(record))
    }

    async fn delete(&self, id: u64) -> Result<bool> {
        let _guard = self.lock()?;
        if self.get(id)?.is_none() {
            return Ok(false);
        }
        self.db.delete_cf(self.cf(CF_COSTS)?, id.to_be_bytes())?;
        Ok(true)
    }
}
