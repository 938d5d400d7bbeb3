//! Common test helper functions shared across test modules.
//!
//! Provides an in-memory forge that records every mutating call so
//! workflow tests can assert on what would have been sent to the host.
use async_trait::async_trait;
use std::{
    collections::HashSet,
    path::Path,
    sync::{Arc, Mutex},
};

use crate::{
    Result,
    error::AssetError,
    forge::{
        config::ForgeOptions,
        manager::ForgeManager,
        traits::Forge,
        types::{
            AssetRecord, CreateReleaseRequest, DownloadAssetRequest, Release,
            UploadAssetRequest,
        },
    },
};

/// Creates an asset record with a predictable size and URL.
pub fn asset(name: &str) -> AssetRecord {
    AssetRecord {
        name: name.to_string(),
        size: name.len() as u64,
        url: format!("https://example.com/download/{name}"),
    }
}

/// Creates `count` uniquely named filler assets.
pub fn filler_assets(prefix: &str, count: usize) -> Vec<AssetRecord> {
    (0..count)
        .map(|i| asset(&format!("{prefix}-{i}.bin")))
        .collect()
}

/// Wraps a fake forge in a non dry-run manager.
pub fn manager_for(fake: FakeForge) -> ForgeManager {
    ForgeManager::new(Box::new(fake), ForgeOptions::default())
}

/// Creates `names` as small files inside `dir`.
pub fn write_files(dir: &Path, names: &[&str]) {
    for name in names {
        std::fs::write(dir.join(name), name.as_bytes()).unwrap();
    }
}

#[derive(Debug, Default)]
struct FakeRelease {
    release: Release,
    assets: Vec<AssetRecord>,
}

#[derive(Debug, Default)]
pub struct FakeState {
    releases: Vec<FakeRelease>,
    pub uploads: Vec<UploadAssetRequest>,
    pub created: Vec<CreateReleaseRequest>,
    pub downloads: Vec<DownloadAssetRequest>,
    pub deleted: Vec<(String, String)>,
    failing_lists: HashSet<String>,
    failing_assets: HashSet<String>,
    fail_create: bool,
}

/// In-memory forge shared between the code under test and the assertions.
#[derive(Debug, Clone, Default)]
pub struct FakeForge {
    state: Arc<Mutex<FakeState>>,
}

impl FakeForge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a release holding assets with the given names.
    pub fn with_release(self, tag: &str, asset_names: &[&str]) -> Self {
        let assets = asset_names.iter().map(|n| asset(n)).collect();
        self.with_assets(tag, assets)
    }

    pub fn with_assets(self, tag: &str, assets: Vec<AssetRecord>) -> Self {
        self.state.lock().unwrap().releases.push(FakeRelease {
            release: Release {
                tag: tag.to_string(),
                title: format!("Title {tag}"),
            },
            assets,
        });
        self
    }

    /// Listing assets of `tag` fails.
    pub fn failing_list(self, tag: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing_lists
            .insert(tag.to_string());
        self
    }

    /// Upload, download and delete of `asset_name` fail.
    pub fn failing_asset(self, asset_name: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing_assets
            .insert(asset_name.to_string());
        self
    }

    /// Every release creation fails.
    pub fn failing_create(self) -> Self {
        self.state.lock().unwrap().fail_create = true;
        self
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    /// Asset names currently held by `tag`, in upload order.
    pub fn asset_names(&self, tag: &str) -> Vec<String> {
        self.state()
            .releases
            .iter()
            .find(|r| r.release.tag == tag)
            .map(|r| r.assets.iter().map(|a| a.name.clone()).collect())
            .unwrap_or_default()
    }

    pub fn release_tags(&self) -> Vec<String> {
        self.state()
            .releases
            .iter()
            .map(|r| r.release.tag.clone())
            .collect()
    }
}

#[async_trait]
impl Forge for FakeForge {
    async fn repo_name(&self) -> Result<String> {
        Ok("owner/repo".into())
    }

    async fn get_release(&self, tag: &str) -> Result<Option<Release>> {
        Ok(self
            .state()
            .releases
            .iter()
            .find(|r| r.release.tag == tag)
            .map(|r| r.release.clone()))
    }

    async fn list_assets(&self, tag: &str) -> Result<Vec<AssetRecord>> {
        let state = self.state();

        if state.failing_lists.contains(tag) {
            return Err(AssetError::fetch(tag, "HTTP 502"));
        }

        state
            .releases
            .iter()
            .find(|r| r.release.tag == tag)
            .map(|r| r.assets.clone())
            .ok_or_else(|| AssetError::fetch(tag, "release not found"))
    }

    async fn upload_asset(&self, req: UploadAssetRequest) -> Result<()> {
        let mut state = self.state();

        if state.failing_assets.contains(&req.asset_name) {
            return Err(AssetError::UploadError {
                file: req.asset_name,
                tag: req.tag,
                reason: "HTTP 500".into(),
            });
        }

        let Some(release) =
            state.releases.iter_mut().find(|r| r.release.tag == req.tag)
        else {
            return Err(AssetError::UploadError {
                file: req.asset_name,
                tag: req.tag,
                reason: "release not found".into(),
            });
        };

        let exists = release.assets.iter().any(|a| a.name == req.asset_name);

        if exists && !req.clobber {
            return Err(AssetError::UploadError {
                file: req.asset_name,
                tag: req.tag,
                reason: "asset already exists".into(),
            });
        }

        if !exists {
            release.assets.push(asset(&req.asset_name));
        }

        state.uploads.push(req);
        Ok(())
    }

    async fn create_release(&self, req: CreateReleaseRequest) -> Result<()> {
        let mut state = self.state();

        if state.fail_create {
            return Err(AssetError::release_creation(&req.tag, "HTTP 403"));
        }

        state.releases.push(FakeRelease {
            release: Release {
                tag: req.tag.clone(),
                title: req.title.clone(),
            },
            assets: vec![],
        });
        state.created.push(req);
        Ok(())
    }

    async fn download_asset(&self, req: DownloadAssetRequest) -> Result<()> {
        let mut state = self.state();

        if state.failing_assets.contains(&req.asset_name) {
            return Err(AssetError::DownloadError {
                asset: req.asset_name,
                tag: req.tag,
                reason: "HTTP 500".into(),
            });
        }

        let dir = req.output_dir.clone().unwrap_or_default();
        std::fs::write(dir.join(&req.asset_name), b"downloaded")?;

        state.downloads.push(req);
        Ok(())
    }

    async fn delete_asset(&self, tag: &str, asset_name: &str) -> Result<()> {
        let mut state = self.state();

        if state.failing_assets.contains(asset_name) {
            return Err(AssetError::DeleteError {
                asset: asset_name.to_string(),
                tag: tag.to_string(),
                reason: "HTTP 500".into(),
            });
        }

        if let Some(release) =
            state.releases.iter_mut().find(|r| r.release.tag == tag)
        {
            release.assets.retain(|a| a.name != asset_name);
        }

        state.deleted.push((tag.to_string(), asset_name.to_string()));
        Ok(())
    }
}
