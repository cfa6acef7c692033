mod error;
mod record;
mod traits;

pub mod memory;

pub use error::CatalogueStoreError;
pub use record::{CatalogueRecord, NewCatalogueRecord, RecordFilter};
pub use traits::CatalogueStore;
