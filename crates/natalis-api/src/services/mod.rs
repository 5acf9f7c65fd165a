pub mod retention;

pub use retention::RetentionService;
