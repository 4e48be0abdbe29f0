//! Concrete adapters for the domain ports: cost stores and the BIN lookup client.

pub mod binlist;
pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
