//! Stage catalog: configured stages, executive ladder and permission grants

pub mod admin;
mod seed;
mod snapshot;


pub use seed::{CatalogSeed, SeedFormat};
pub use snapshot::StageCatalog;
