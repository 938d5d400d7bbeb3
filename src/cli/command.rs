//! Workflow commands. Each resolves the release sequence first and then
//! works through it via the forge manager.

/// `delete-from-release`
pub mod delete;

/// `download-from-release`
pub mod download;

/// `generate-lists`
pub mod generate_lists;

/// `upload-to-release`
pub mod upload;
