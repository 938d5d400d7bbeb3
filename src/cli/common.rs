//! Functionality shared between the workflow commands.
use log::*;
use std::collections::{BTreeSet, HashMap};

use crate::{Result, forge::manager::ForgeManager, sequence::ReleaseSequence};

/// Map each requested name to the tags of the releases holding it, in
/// sequence order. Names held by no release are absent from the map.
pub async fn locate_assets(
    forge_manager: &ForgeManager,
    sequence: &ReleaseSequence,
    names: &BTreeSet<String>,
) -> Result<HashMap<String, Vec<String>>> {
    let mut locations: HashMap<String, Vec<String>> = HashMap::new();

    for release in sequence.releases() {
        info!("fetching assets from release: {}", release.tag());

        for asset in forge_manager.list_assets(release.tag()).await? {
            if names.contains(&asset.name) {
                locations
                    .entry(asset.name)
                    .or_default()
                    .push(release.tag().to_string());
            }
        }
    }

    debug!("located {} of {} requested assets", locations.len(), names.len());

    Ok(locations)
}
