//! Database repositories and connection utilities
//
// Birth record repository (the single table of the service)
pub mod birth;
//
// Pool construction and embedded migrations
pub mod pool;
//
// Transaction utilities
pub mod transaction;

pub use birth::BirthRecordRepository;
pub use pool::{connect, run_migrations, MIGRATOR};
pub use transaction::TransactionGuard;
