//! Builds the listing manifest of a release sequence and uploads it to the
//! base release.
use log::*;
use std::path::PathBuf;
use tokio::fs;

use crate::{
    Result,
    cli::types::ListingReport,
    config::validate_listing_file,
    files::Extension,
    forge::{manager::ForgeManager, types::UploadAssetRequest},
    lister::{list_assets, render_listing},
    sequence,
};

#[derive(Debug, Clone)]
pub struct ListingOptions {
    pub release: String,
    pub extensions: Vec<Extension>,
    /// Asset name of the manifest on the base release.
    pub listing_file: String,
    /// Also keep the manifest at this local path.
    pub output: Option<PathBuf>,
}

/// Execute generate-lists: collect matching assets from every release in the
/// sequence, render the manifest and upload it to the base release,
/// replacing an earlier manifest of the same name.
pub async fn execute(
    forge_manager: &ForgeManager,
    opts: &ListingOptions,
) -> Result<ListingReport> {
    validate_listing_file(&opts.listing_file)?;

    let sequence = sequence::resolve(forge_manager, &opts.release).await?;
    let records = list_assets(forge_manager, &sequence, &opts.extensions).await?;

    if records.is_empty() {
        let exts = opts
            .extensions
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>();
        info!("no assets with extensions {} found", exts.join(", "));
        return Ok(ListingReport::default());
    }

    info!("writing listing of {} assets", records.len());
    let content = render_listing(&records);

    let mut report = ListingReport {
        records: records.len(),
        ..ListingReport::default()
    };

    if let Some(output) = &opts.output {
        fs::write(output, &content).await?;
        report.local_copy = Some(output.clone());
    }

    let scratch = tempfile::tempdir()?;
    let path = scratch.path().join(&opts.listing_file);
    fs::write(&path, &content).await?;

    info!(
        "uploading {} to release {}",
        opts.listing_file,
        sequence.base()
    );

    forge_manager
        .upload_asset(UploadAssetRequest {
            tag: sequence.base().to_string(),
            path,
            asset_name: opts.listing_file.clone(),
            clobber: true,
        })
        .await?;

    report.uploaded_to = Some(sequence.base().to_string());

    Ok(report)
}
