//! Track catalog: CSV store and offline builder

pub mod builder;
pub mod store;

pub use builder::{BuildError, BuildSummary, CatalogBuilder, MoodMap, UNKNOWN_MOOD};
pub use store::{write_catalog, write_catalog_file, Catalog, CatalogEntry, CatalogError};
