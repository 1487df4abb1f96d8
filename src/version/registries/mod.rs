//! Registry implementations for fetching mod versions

pub mod forge;

pub use forge::ForgeRegistry;
