//! Persistence for the decision engine.

mod sqlite;
mod traits;
mod types;

pub use sqlite::SqliteStore;
pub use traits::{DecisionStore, GateChecks, StoreError};
pub use types::{
    BlocklistEntry, CreateItemRequest, IndexerExclusion, MediaExclusion, MonitoredItem,
    PendingGrab, Settings,
};
