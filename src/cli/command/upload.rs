//! Uploads local files into a release sequence, spilling over into new
//! `-extra` releases when the tail release is full.
use log::*;
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};
use tokio::fs;

use crate::{
    Result,
    cli::types::{Failure, UploadReport},
    error::AssetError,
    files::{Extension, asset_name, find_local_files},
    forge::{
        config::DEFAULT_HOST,
        manager::ForgeManager,
        types::{CreateReleaseRequest, UploadAssetRequest},
    },
    planner::{PlanOptions, ReleaseSlot, UploadDecision, UploadPlanner},
    sequence::{self, ReleaseSequence},
};

#[derive(Debug, Clone)]
pub struct UploadOptions {
    pub release: String,
    pub folder: PathBuf,
    pub extensions: Vec<Extension>,
    pub overwrite: bool,
    pub create_extra_releases: bool,
    pub max_assets: usize,
    /// Listing manifest name linked from new release notes.
    pub listing_file: String,
    /// Branch or commit new releases are tagged from.
    pub target: Option<String>,
}

/// Execute upload-to-release.
///
/// Fatal errors (missing base release, failed fetch, bad folder) abort the
/// run. Everything that concerns a single file is recorded in the report
/// and the remaining files are still processed.
pub async fn execute(
    forge_manager: &ForgeManager,
    opts: &UploadOptions,
) -> Result<UploadReport> {
    let sequence = sequence::resolve(forge_manager, &opts.release).await?;
    let files = find_local_files(&opts.folder, &opts.extensions)?;

    let mut report = UploadReport::default();

    if files.is_empty() {
        info!(
            "no files with the requested extensions found in {}",
            opts.folder.display()
        );
        return Ok(report);
    }

    info!("found {} local files to upload", files.len());

    let mut candidates = vec![];

    for path in files {
        match asset_name(&path) {
            Ok(name) => candidates.push((name, path)),
            Err(err) => {
                error!("{err}");
                report
                    .failed
                    .push(Failure::new(path.display().to_string(), err));
            }
        }
    }

    let planner = UploadPlanner::from_sequence(
        forge_manager,
        &sequence,
        PlanOptions {
            overwrite: opts.overwrite,
            allow_new_releases: opts.create_extra_releases,
            max_assets: opts.max_assets,
        },
    )
    .await?;

    upload_candidates(
        forge_manager,
        &sequence,
        &planner,
        &candidates,
        opts,
        &mut report,
    )
    .await;

    Ok(report)
}

/// Plan `candidates` against `planner` and act on each decision. Problems
/// with a single file are recorded in `report` and never stop the loop.
async fn upload_candidates(
    forge_manager: &ForgeManager,
    sequence: &ReleaseSequence,
    planner: &UploadPlanner,
    candidates: &[(String, PathBuf)],
    opts: &UploadOptions,
    report: &mut UploadReport,
) {
    let plan = planner.plan(candidates.iter().map(|(name, _)| name));

    let pending = plan
        .new_releases()
        .into_iter()
        .cloned()
        .collect::<Vec<ReleaseSlot>>();

    if !pending.is_empty() {
        let tags = pending.iter().map(|s| s.tag.as_str()).collect::<Vec<_>>();
        info!("new releases needed: {}", tags.join(", "));
    }

    let mut creator = ReleaseCreator::new(forge_manager, sequence, opts);

    for (planned, (_, path)) in plan.files.into_iter().zip(candidates.iter()) {
        let name = planned.name;

        let decision = match planned.decision {
            Ok(decision) => decision,
            Err(err) => {
                error!("{err}");
                report.failed.push(Failure::new(name, err));
                continue;
            }
        };

        if let UploadDecision::Skip { release } = &decision {
            info!("skipping {name}: already in release {release}");
            report.skipped.push(name);
            continue;
        }

        if let Err(err) = check_readable(path).await {
            error!("{err}");
            report.failed.push(Failure::new(name, err));
            continue;
        }

        let tag = decision.release().to_string();

        if let Some(slot) = pending.iter().find(|s| s.tag == tag) {
            match creator.ensure_created(slot).await {
                Ok(true) => report.created_releases.push(tag.clone()),
                Ok(false) => {}
                Err(err) => {
                    error!("{err}");
                    report.failed.push(Failure::new(name, err));
                    continue;
                }
            }
        }

        let overwrite = matches!(decision, UploadDecision::Overwrite { .. });

        if overwrite {
            info!("overwriting {name} in release {tag}");
        } else {
            info!("uploading {name} to release {tag}");
        }

        let req = UploadAssetRequest {
            tag,
            path: path.clone(),
            asset_name: name.clone(),
            clobber: overwrite,
        };

        match forge_manager.upload_asset(req).await {
            Ok(()) if overwrite => report.overwritten.push(name),
            Ok(()) => report.uploaded.push(name),
            Err(err) => {
                error!("{err}");
                report.failed.push(Failure::new(name, err));
            }
        }
    }
}

async fn check_readable(path: &Path) -> Result<()> {
    fs::File::open(path)
        .await
        .map(|_| ())
        .map_err(|err| AssetError::unreadable(path, err.to_string()))
}

/// Creates pending releases on first use. Once a creation fails, every
/// later pending release fails with the same reason without another
/// attempt.
struct ReleaseCreator<'a> {
    forge_manager: &'a ForgeManager,
    base: &'a str,
    base_title: &'a str,
    listing_file: &'a str,
    target: Option<&'a str>,
    created: HashSet<String>,
    failure: Option<String>,
}

impl<'a> ReleaseCreator<'a> {
    fn new(
        forge_manager: &'a ForgeManager,
        sequence: &'a ReleaseSequence,
        opts: &'a UploadOptions,
    ) -> Self {
        Self {
            forge_manager,
            base: sequence.base(),
            base_title: &sequence.base_release().title,
            listing_file: &opts.listing_file,
            target: opts.target.as_deref(),
            created: HashSet::new(),
            failure: None,
        }
    }

    /// Returns true when the release was created by this call.
    async fn ensure_created(&mut self, slot: &ReleaseSlot) -> Result<bool> {
        if self.created.contains(&slot.tag) {
            return Ok(false);
        }

        if let Some(reason) = &self.failure {
            return Err(AssetError::release_creation(&slot.tag, reason));
        }

        match self.create(slot).await {
            Ok(()) => {
                self.created.insert(slot.tag.clone());
                Ok(true)
            }
            Err(err) => {
                let reason = match &err {
                    AssetError::ReleaseCreationError { reason, .. } => {
                        reason.clone()
                    }
                    other => other.to_string(),
                };
                self.failure = Some(reason.clone());
                Err(AssetError::release_creation(&slot.tag, reason))
            }
        }
    }

    async fn create(&self, slot: &ReleaseSlot) -> Result<()> {
        let repo = self.forge_manager.repo_name().await?;
        let links = ReleaseLinks::new(&repo, self.base, self.listing_file);

        let title = if self.base_title.trim().is_empty() {
            self.base
        } else {
            self.base_title
        };

        let req = CreateReleaseRequest {
            tag: slot.tag.clone(),
            title: format!("{title} Supplementary {}", slot.ordinal),
            notes: links.notes(self.base, self.listing_file),
            target: self.target.map(String::from),
        };

        info!("creating release {}", req.tag);
        self.forge_manager.create_release(req).await
    }
}

/// Web links into the base release, used in notes of new releases.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ReleaseLinks {
    release_url: String,
    listing_url: String,
}

impl ReleaseLinks {
    /// `repo` is `OWNER/REPO`, or `HOST/OWNER/REPO` off the default host.
    fn new(repo: &str, base: &str, listing_file: &str) -> Self {
        let parts = repo.split('/').collect::<Vec<_>>();

        let (host, path) = if parts.len() == 3 {
            (parts[0].to_string(), parts[1..].join("/"))
        } else {
            (DEFAULT_HOST.to_string(), repo.to_string())
        };

        let repo_url = format!("https://{host}/{path}");

        Self {
            release_url: format!("{repo_url}/releases/tag/{base}"),
            listing_url: format!(
                "{repo_url}/releases/download/{base}/{listing_file}"
            ),
        }
    }

    fn notes(&self, base: &str, listing_file: &str) -> String {
        format!(
            "Extension of [{base}]({})\n\nList of files and their sizes is at [{listing_file}]({})",
            self.release_url, self.listing_url
        )
    }
}
