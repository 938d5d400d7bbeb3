//! Discovery of a base release and its numbered `-extra` continuations.
//!
//! A sequence is `base`, `base-extra1`, `base-extra2`, … probed in order
//! until the first tag that does not exist. Probing stops at the first gap:
//! with `base-extra2` missing, a `base-extra3` is never looked at.
use log::*;

use crate::{
    Result,
    error::AssetError,
    forge::{config::extra_release_tag, manager::ForgeManager, types::Release},
};

/// A release together with its position in the sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencedRelease {
    pub release: Release,
    /// 0 for the base release, N for `<base>-extra<N>`.
    pub ordinal: usize,
}

impl SequencedRelease {
    pub fn tag(&self) -> &str {
        &self.release.tag
    }
}

/// Ordered, contiguous view of a base release and its extra releases as
/// they existed when resolved. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSequence {
    base: String,
    releases: Vec<SequencedRelease>,
}

impl ReleaseSequence {
    /// Build a sequence from already fetched releases, base first.
    pub fn new(base: &str, releases: Vec<Release>) -> Result<Self> {
        if releases.is_empty() {
            return Err(AssetError::release_not_found(base));
        }

        let releases = releases
            .into_iter()
            .enumerate()
            .map(|(ordinal, release)| SequencedRelease { release, ordinal })
            .collect();

        Ok(Self {
            base: base.to_string(),
            releases,
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn base_release(&self) -> &Release {
        &self.releases[0].release
    }

    pub fn releases(&self) -> &[SequencedRelease] {
        &self.releases
    }

    pub fn tags(&self) -> Vec<String> {
        self.releases.iter().map(|r| r.tag().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.releases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }
}

/// Resolve the release sequence for `base`.
///
/// Fails with [`AssetError::ReleaseNotFound`] when the base release does not
/// exist. A missing extra release ends the probe and is not an error.
pub async fn resolve(
    forge_manager: &ForgeManager,
    base: &str,
) -> Result<ReleaseSequence> {
    if base.trim().is_empty() {
        return Err(AssetError::invalid_args("release tag must not be empty"));
    }

    let base_release = forge_manager
        .get_release(base)
        .await?
        .ok_or_else(|| AssetError::release_not_found(base))?;

    let mut releases = vec![base_release];

    loop {
        let tag = extra_release_tag(base, releases.len());

        match forge_manager.get_release(&tag).await? {
            Some(release) => {
                debug!("found extra release: {tag}");
                releases.push(release);
            }
            None => {
                debug!("no release {tag}: sequence ends");
                break;
            }
        }
    }

    let sequence = ReleaseSequence::new(base, releases)?;

    info!("found releases: {}", sequence.tags().join(", "));

    Ok(sequence)
}
