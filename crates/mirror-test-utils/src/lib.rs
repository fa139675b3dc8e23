//! Shared test utilities for the package-mirror workspace.
//!
//! This crate provides standardised test fixtures to eliminate duplication
//! across crate test suites. It is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`metadata`]: generated-repository metadata documents with valid include hashes
//! - [`mirror`]: [`TestMirror`] temp layout with staging, remote and config

pub mod metadata;
pub mod mirror;

pub use metadata::{MetadataFixture, version};
pub use mirror::TestMirror;
