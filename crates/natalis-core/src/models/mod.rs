pub mod birth;

pub use birth::{BirthRecord, BirthRecordSubmission, IdType, NewBirthRecord};
