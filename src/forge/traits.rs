//! Traits related to the release hosting forge
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::{
    Result,
    forge::types::{
        AssetRecord, CreateReleaseRequest, DownloadAssetRequest, Release,
        UploadAssetRequest,
    },
};

/// Release and asset operations consumed from the hosting service.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Forge: Send + Sync {
    /// Repository in `OWNER/REPO` form.
    async fn repo_name(&self) -> Result<String>;

    /// Look up a release by tag, `Ok(None)` when it does not exist.
    async fn get_release(&self, tag: &str) -> Result<Option<Release>>;

    /// All assets of a release in the order the forge returns them.
    async fn list_assets(&self, tag: &str) -> Result<Vec<AssetRecord>>;

    async fn upload_asset(&self, req: UploadAssetRequest) -> Result<()>;

    async fn create_release(&self, req: CreateReleaseRequest) -> Result<()>;

    async fn download_asset(&self, req: DownloadAssetRequest) -> Result<()>;

    async fn delete_asset(&self, tag: &str, asset_name: &str) -> Result<()>;
}
