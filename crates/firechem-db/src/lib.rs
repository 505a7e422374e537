//! firechem-db — In-memory chemical dataset and compatibility rule store.
//!
//! Loaded once at start-up and read-only afterwards. All lookups are pure;
//! a miss is `None`, never an error.

pub mod database;
pub mod error;

pub use database::ChemicalDb;
pub use error::{DbError, Result};
