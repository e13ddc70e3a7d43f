pub mod catalog;
mod error;
pub mod psychro;
pub mod sizing;
pub mod units;

pub use catalog::{load_catalog, Catalog};
pub use error::{SizingError, ValidationError};
pub use sizing::{compute_sizing, SizingEngine, SizingRequest, SizingResult};
