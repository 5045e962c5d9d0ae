// Service exports
pub mod catalog;
pub mod profile_store;
pub mod recommender;

pub use catalog::{CatalogError, VenueCatalog};
pub use profile_store::{
    FileProfileBackend, MemoryProfileBackend, ProfileBackend, ProfileStore, ProfileStoreError, RecordOutcome,
};
pub use recommender::{Recommender, ServiceError};
