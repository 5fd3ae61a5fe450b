pub mod artifacts;
pub mod errors;

pub use artifacts::{read_processed, write_processed, write_processed_csv, write_raw};
pub use errors::PersistenceError;
