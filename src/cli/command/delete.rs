//! Deletes named assets from every release of a sequence that holds them.
use log::*;
use std::path::PathBuf;

use crate::{
    Result,
    cli::{
        common::locate_assets,
        types::{DeleteReport, Failure},
    },
    files::collect_names,
    forge::manager::ForgeManager,
    sequence,
};

#[derive(Debug, Clone, Default)]
pub struct DeleteOptions {
    pub release: String,
    pub names: Vec<String>,
    /// Text file with one asset name per line.
    pub file_list: Option<PathBuf>,
}

/// Execute delete-from-release. A name held by no release is reported as
/// not found and does not fail the run.
pub async fn execute(
    forge_manager: &ForgeManager,
    opts: &DeleteOptions,
) -> Result<DeleteReport> {
    let names = collect_names(&opts.names, opts.file_list.as_deref())?;

    let mut report = DeleteReport::default();

    if names.is_empty() {
        info!("no files to delete");
        return Ok(report);
    }

    let sequence = sequence::resolve(forge_manager, &opts.release).await?;
    let locations = locate_assets(forge_manager, &sequence, &names).await?;

    for name in names {
        let Some(tags) = locations.get(&name) else {
            warn!("{name} not found in any release");
            report.not_found.push(name);
            continue;
        };

        for tag in tags {
            info!("deleting {name} from release {tag}");

            match forge_manager.delete_asset(tag, &name).await {
                Ok(()) => report.deleted.push((tag.clone(), name.clone())),
                Err(err) => {
                    error!("{err}");
                    report
                        .failed
                        .push(Failure::new(format!("{tag}/{name}"), err));
                }
            }
        }
    }

    Ok(report)
}
