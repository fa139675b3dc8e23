//! Package metadata handling for the package mirror
//!
//! Provides dotted-path access to JSON documents, the canonical
//! serialization used for metadata files, and [`MetadataTransformer`], which
//! rewrites a generated repository's metadata without breaking the
//! content-hash links between its files.

pub mod document;
pub mod error;
pub mod json;
pub mod path;
pub mod transform;

pub use document::{Include, RootDocument};
pub use error::{Error, Result};
pub use transform::{MetadataTransformer, Rewrite};
