pub mod movie;

pub use movie::{MovieStore, PgMovieStore, StoreError, StoredMovie};
