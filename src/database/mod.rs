pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod record;
pub mod store;

pub use manager::DatabaseManager;
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use record::{MapRecord, RecordError, ZoneRecord};
pub use store::{StoreError, StoreTransaction, TransactionalStore};
