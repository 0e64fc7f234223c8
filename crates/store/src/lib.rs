//! booklend store persistence
//!
//! Snapshot/restore of library aggregates to named JSON stores.
//!
//! - **Atomic writes**: stores are never left truncated
//! - **Graceful degradation**: missing or corrupt stores load as `None`
//! - **Zero panics**: failures are logged or returned as `StoreError`

mod error;
mod gateway;

pub use error::{StoreError, StoreResult};
pub use gateway::{PersistenceGateway, StoreName};
