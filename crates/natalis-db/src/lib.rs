//! Natalis data access layer
//!
//! SQLite-backed repository for birth registrations, plus pool and migration helpers.

pub mod db;

pub use db::{connect, run_migrations, BirthRecordRepository, TransactionGuard, MIGRATOR};
