//! Manager that wraps forge implementations
use log::*;

use crate::{
    Result,
    forge::{
        config::ForgeOptions,
        traits::Forge,
        types::{
            AssetRecord, CreateReleaseRequest, DownloadAssetRequest, Release,
            UploadAssetRequest,
        },
    },
};

pub struct ForgeManager {
    forge: Box<dyn Forge>,
    options: ForgeOptions,
}

impl ForgeManager {
    pub fn new(forge: Box<dyn Forge>, options: ForgeOptions) -> Self {
        Self { forge, options }
    }

    pub fn dry_run(&self) -> bool {
        self.options.dry_run
    }

    pub async fn repo_name(&self) -> Result<String> {
        self.forge.repo_name().await
    }

    pub async fn get_release(&self, tag: &str) -> Result<Option<Release>> {
        debug!("looking up release: {tag}");
        self.forge.get_release(tag).await
    }

    pub async fn list_assets(&self, tag: &str) -> Result<Vec<AssetRecord>> {
        let assets = self.forge.list_assets(tag).await?;
        debug!("release {tag} holds {} assets", assets.len());
        Ok(assets)
    }

    pub async fn upload_asset(&self, req: UploadAssetRequest) -> Result<()> {
        if self.options.dry_run {
            warn!("dry_run: would upload asset: req: {:#?}", req);
            return Ok(());
        }
        self.forge.upload_asset(req).await
    }

    pub async fn create_release(&self, req: CreateReleaseRequest) -> Result<()> {
        if self.options.dry_run {
            warn!("dry_run: would create release: req: {:#?}", req);
            return Ok(());
        }
        self.forge.create_release(req).await
    }

    pub async fn download_asset(&self, req: DownloadAssetRequest) -> Result<()> {
        if self.options.dry_run {
            warn!("dry_run: would download asset: req: {:#?}", req);
            return Ok(());
        }
        self.forge.download_asset(req).await
    }

    pub async fn delete_asset(&self, tag: &str, asset_name: &str) -> Result<()> {
        if self.options.dry_run {
            warn!(
                "dry_run: would delete asset: tag: {tag}, asset: {asset_name}"
            );
            return Ok(());
        }
        self.forge.delete_asset(tag, asset_name).await
    }
}
