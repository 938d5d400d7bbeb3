//! Shared data types for releases, assets and forge requests.
use serde::Deserialize;
use std::path::PathBuf;

/// A release as reported by the hosting forge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Release {
    /// Git tag identifying the release.
    pub tag: String,
    /// Display title of the release (may be empty).
    pub title: String,
}

/// A single asset attached to a release.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AssetRecord {
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Browser download URL.
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to upload a local file as a release asset.
pub struct UploadAssetRequest {
    pub tag: String,
    pub path: PathBuf,
    /// Asset name on the release. The forge derives it from the file name,
    /// so this always equals `path`'s final component.
    pub asset_name: String,
    /// Replace an existing asset with the same name.
    pub clobber: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to create a new release.
pub struct CreateReleaseRequest {
    pub tag: String,
    pub title: String,
    pub notes: String,
    /// Branch or commit the tag is created from when it does not exist yet.
    pub target: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to download a release asset into a local directory.
pub struct DownloadAssetRequest {
    pub tag: String,
    pub asset_name: String,
    /// Destination directory, current directory when `None`.
    pub output_dir: Option<PathBuf>,
}
