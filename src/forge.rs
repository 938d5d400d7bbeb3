//! Interface to the release hosting service.
//!
//! The hosting service is consumed through the [`traits::Forge`] capability
//! trait. The shipped implementation shells out to the GitHub CLI; tests
//! substitute mocks or in-memory fakes.

/// Connection settings and shared constants.
pub mod config;

/// `gh` command-line implementation of the forge.
pub mod gh;

/// Dry-run aware wrapper used by the commands.
pub mod manager;

/// Capability trait for the hosting service.
pub mod traits;

/// Shared data types for releases and assets.
pub mod types;
