//! Downloads named assets from wherever they live in a release sequence.
use log::*;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::{
    Result,
    cli::{
        common::locate_assets,
        types::{DownloadReport, Failure},
    },
    files::collect_names,
    forge::{manager::ForgeManager, types::DownloadAssetRequest},
    sequence,
};

#[derive(Debug, Clone, Default)]
pub struct DownloadOptions {
    pub release: String,
    pub names: Vec<String>,
    /// Text file with one asset name per line.
    pub file_list: Option<PathBuf>,
    /// Destination directory, current directory when `None`.
    pub output_dir: Option<PathBuf>,
    pub skip_existing: bool,
}

/// Execute download-from-release. When a name exists in several releases
/// the copy in the earliest release is downloaded.
pub async fn execute(
    forge_manager: &ForgeManager,
    opts: &DownloadOptions,
) -> Result<DownloadReport> {
    let names = collect_names(&opts.names, opts.file_list.as_deref())?;

    let mut report = DownloadReport::default();

    if names.is_empty() {
        info!("no files to download");
        return Ok(report);
    }

    if let Some(dir) = &opts.output_dir
        && !forge_manager.dry_run()
    {
        fs::create_dir_all(dir).await?;
    }

    let sequence = sequence::resolve(forge_manager, &opts.release).await?;
    let locations = locate_assets(forge_manager, &sequence, &names).await?;

    let output_dir = opts.output_dir.as_deref().unwrap_or(Path::new("."));

    for name in names {
        if opts.skip_existing && output_dir.join(&name).exists() {
            info!("skipping {name}: already exists in {}", output_dir.display());
            report.skipped.push(name);
            continue;
        }

        let Some(tag) = locations.get(&name).and_then(|tags| tags.first())
        else {
            warn!("{name} not found in any release");
            report
                .failed
                .push(Failure::new(name, "not found in any release"));
            continue;
        };

        info!("downloading {name} from release {tag}");

        let req = DownloadAssetRequest {
            tag: tag.clone(),
            asset_name: name.clone(),
            output_dir: opts.output_dir.clone(),
        };

        match forge_manager.download_asset(req).await {
            Ok(()) => report.downloaded.push(name),
            Err(err) => {
                error!("{err}");
                report.failed.push(Failure::new(name, err));
            }
        }
    }

    Ok(report)
}
