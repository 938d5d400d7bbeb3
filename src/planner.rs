//! Decides where each local file goes in a release sequence.
//!
//! The planner keeps one [`ReleaseSlot`] per release, addressed by position.
//! Each slot carries the asset names it holds and a running asset count that
//! grows with every file placed into it, so the host is queried once per
//! release rather than once per file. When the tail release is full and new
//! releases are allowed, a pending slot for `<base>-extra<N+1>` is appended
//! and receives the following overflow files as well.
use log::*;
use std::collections::HashSet;

use crate::{
    Result,
    error::AssetError,
    forge::{config::extra_release_tag, manager::ForgeManager},
    sequence::ReleaseSequence,
};

/// Where a single file should go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadDecision {
    /// Asset already exists in `release` and overwriting is disabled.
    Skip { release: String },
    /// Asset already exists in `release` and will be replaced.
    Overwrite { release: String },
    /// Asset is new and goes into `release`.
    PlaceNew { release: String },
}

impl UploadDecision {
    pub fn release(&self) -> &str {
        match self {
            Self::Skip { release }
            | Self::Overwrite { release }
            | Self::PlaceNew { release } => release,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanOptions {
    pub overwrite: bool,
    pub allow_new_releases: bool,
    /// Asset ceiling per release.
    pub max_assets: usize,
}

/// Running state of one release in the sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSlot {
    pub tag: String,
    /// 0 for the base release, N for `<base>-extra<N>`.
    pub ordinal: usize,
    /// Assets held, including files placed during planning.
    pub asset_count: usize,
    /// Release does not exist on the host yet and must be created before
    /// anything is uploaded to it.
    pub pending: bool,
    names: HashSet<String>,
}

impl ReleaseSlot {
    /// Slot for a release that already exists on the host.
    pub fn existing<I>(tag: &str, ordinal: usize, names: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let names = names.into_iter().collect::<HashSet<_>>();
        Self {
            tag: tag.to_string(),
            ordinal,
            asset_count: names.len(),
            pending: false,
            names,
        }
    }

    fn pending(tag: String, ordinal: usize) -> Self {
        Self {
            tag,
            ordinal,
            asset_count: 0,
            pending: true,
            names: HashSet::new(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

/// Decision for one candidate file.
#[derive(Debug)]
pub struct PlannedUpload {
    pub name: String,
    pub decision: Result<UploadDecision>,
}

/// Decisions for a batch of files plus the state they leave behind.
#[derive(Debug)]
pub struct UploadPlan {
    pub files: Vec<PlannedUpload>,
    pub state: UploadPlanner,
}

impl UploadPlan {
    /// Releases that have to be created, in creation order.
    pub fn new_releases(&self) -> Vec<&ReleaseSlot> {
        self.state.slots().iter().filter(|s| s.pending).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPlanner {
    base: String,
    slots: Vec<ReleaseSlot>,
    options: PlanOptions,
}

impl UploadPlanner {
    /// Build a planner over `slots`, base release first.
    pub fn new(
        base: &str,
        slots: Vec<ReleaseSlot>,
        options: PlanOptions,
    ) -> Result<Self> {
        if slots.is_empty() {
            return Err(AssetError::release_not_found(base));
        }

        if options.max_assets == 0 {
            return Err(AssetError::invalid_config(
                "max assets per release must be at least 1",
            ));
        }

        Ok(Self {
            base: base.to_string(),
            slots,
            options,
        })
    }

    /// Fetch the asset names of every release in `sequence` and build a
    /// planner over them. Any failed fetch aborts.
    pub async fn from_sequence(
        forge_manager: &ForgeManager,
        sequence: &ReleaseSequence,
        options: PlanOptions,
    ) -> Result<Self> {
        let mut slots = vec![];

        for release in sequence.releases() {
            info!("fetching assets from release: {}", release.tag());
            let assets = forge_manager.list_assets(release.tag()).await?;
            slots.push(ReleaseSlot::existing(
                release.tag(),
                release.ordinal,
                assets.into_iter().map(|a| a.name),
            ));
        }

        Self::new(sequence.base(), slots, options)
    }

    pub fn slots(&self) -> &[ReleaseSlot] {
        &self.slots
    }

    pub fn slot(&self, tag: &str) -> Option<&ReleaseSlot> {
        self.slots.iter().find(|s| s.tag == tag)
    }

    pub fn tail(&self) -> &ReleaseSlot {
        // never empty, enforced by new()
        &self.slots[self.slots.len() - 1]
    }

    /// Decide where `name` goes and record the placement.
    ///
    /// Fails with [`AssetError::ReleaseFull`] when the tail release is at
    /// the ceiling and new releases are not allowed. The failure only
    /// concerns this file.
    pub fn decide(&mut self, name: &str) -> Result<UploadDecision> {
        if let Some(slot) = self.slots.iter().find(|s| s.contains(name)) {
            let release = slot.tag.clone();
            return Ok(if self.options.overwrite {
                UploadDecision::Overwrite { release }
            } else {
                UploadDecision::Skip { release }
            });
        }

        let tail = self.tail();

        if tail.asset_count >= self.options.max_assets {
            if !self.options.allow_new_releases {
                return Err(AssetError::ReleaseFull {
                    file: name.to_string(),
                    tag: tail.tag.clone(),
                    count: tail.asset_count,
                });
            }

            let ordinal = tail.ordinal + 1;
            let tag = extra_release_tag(&self.base, ordinal);
            debug!("release {} is full: planning new release {tag}", tail.tag);
            self.slots.push(ReleaseSlot::pending(tag, ordinal));
        }

        let last = self.slots.len() - 1;
        let tail = &mut self.slots[last];
        tail.names.insert(name.to_string());
        tail.asset_count += 1;

        Ok(UploadDecision::PlaceNew {
            release: tail.tag.clone(),
        })
    }

    /// Decide every name in order against a copy of the current state.
    /// `self` is left untouched, so planning the same names twice yields
    /// the same decisions.
    pub fn plan<I, S>(&self, names: I) -> UploadPlan
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut state = self.clone();

        let files = names
            .into_iter()
            .map(|name| {
                let name = name.as_ref().to_string();
                let decision = state.decide(&name);
                PlannedUpload { name, decision }
            })
            .collect();

        UploadPlan { files, state }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        sequence::resolve,
        test_helpers::{FakeForge, filler_assets, manager_for},
    };

    fn names(prefix: &str, count: usize) -> Vec<String> {
        (0..count).map(|i| format!("{prefix}-{i}.bin")).collect()
    }

    fn options(overwrite: bool, allow_new_releases: bool) -> PlanOptions {
        PlanOptions {
            overwrite,
            allow_new_releases,
            max_assets: 1000,
        }
    }

    fn planner(slots: Vec<ReleaseSlot>, options: PlanOptions) -> UploadPlanner {
        UploadPlanner::new("v1", slots, options).unwrap()
    }

    fn decisions(plan: &UploadPlan) -> Vec<UploadDecision> {
        plan.files
            .iter()
            .map(|f| f.decision.as_ref().unwrap().clone())
            .collect()
    }

    #[test]
    fn existing_file_is_skipped_without_overwrite() {
        let p = planner(
            vec![
                ReleaseSlot::existing("v1", 0, vec!["a.zip".to_string()]),
                ReleaseSlot::existing("v1-extra1", 1, vec![]),
            ],
            options(false, false),
        );

        let plan = p.plan(["a.zip"]);

        assert_eq!(
            decisions(&plan),
            vec![UploadDecision::Skip {
                release: "v1".into()
            }]
        );
    }

    #[test]
    fn existing_file_is_overwritten_where_found() {
        let p = planner(
            vec![
                ReleaseSlot::existing("v1", 0, vec!["a.zip".to_string()]),
                ReleaseSlot::existing("v1-extra1", 1, vec!["b.zip".to_string()]),
                ReleaseSlot::existing("v1-extra2", 2, vec![]),
            ],
            options(true, false),
        );

        let plan = p.plan(["a.zip", "b.zip"]);

        assert_eq!(
            decisions(&plan),
            vec![
                UploadDecision::Overwrite {
                    release: "v1".into()
                },
                UploadDecision::Overwrite {
                    release: "v1-extra1".into()
                },
            ]
        );
        assert!(plan.new_releases().is_empty());
    }

    #[test]
    fn new_file_goes_to_tail_release() {
        let p = planner(
            vec![
                ReleaseSlot::existing("v1", 0, names("base", 10)),
                ReleaseSlot::existing("v1-extra1", 1, names("extra", 3)),
            ],
            options(false, false),
        );

        let plan = p.plan(["new.zip"]);

        assert_eq!(
            decisions(&plan),
            vec![UploadDecision::PlaceNew {
                release: "v1-extra1".into()
            }]
        );
        assert_eq!(plan.state.tail().asset_count, 4);
        assert_eq!(plan.state.slot("v1").unwrap().asset_count, 10);
    }

    #[test]
    fn overflow_creates_one_new_release_for_all_files() {
        let p = planner(
            vec![ReleaseSlot::existing("v1", 0, names("base", 1000))],
            options(false, true),
        );

        let candidates = names("new", 5);
        let plan = p.plan(&candidates);

        assert_eq!(
            decisions(&plan),
            vec![
                UploadDecision::PlaceNew {
                    release: "v1-extra1".into()
                };
                5
            ]
        );

        let new_releases = plan.new_releases();
        assert_eq!(new_releases.len(), 1);
        assert_eq!(new_releases[0].tag, "v1-extra1");
        assert_eq!(new_releases[0].ordinal, 1);
        assert_eq!(new_releases[0].asset_count, 5);
    }

    #[test]
    fn overflow_numbers_after_highest_extra() {
        let p = planner(
            vec![
                ReleaseSlot::existing("v1", 0, names("base", 1000)),
                ReleaseSlot::existing("v1-extra1", 1, names("e1", 1000)),
                ReleaseSlot::existing("v1-extra2", 2, names("e2", 1000)),
            ],
            options(false, true),
        );

        let plan = p.plan(["new.zip"]);

        assert_eq!(
            decisions(&plan),
            vec![UploadDecision::PlaceNew {
                release: "v1-extra3".into()
            }]
        );
    }

    #[test]
    fn overflow_without_new_releases_fails_each_file() {
        let p = planner(
            vec![ReleaseSlot::existing("v1", 0, names("base", 1000))],
            options(false, false),
        );

        let plan = p.plan(names("new", 5));

        assert_eq!(plan.files.len(), 5);
        for file in &plan.files {
            assert!(matches!(
                file.decision,
                Err(AssetError::ReleaseFull { ref tag, count: 1000, .. })
                    if tag == "v1"
            ));
        }
        assert!(plan.new_releases().is_empty());
        assert_eq!(plan.state.slots().len(), 1);
    }

    #[test]
    fn fills_tail_then_spills_over() {
        let p = planner(
            vec![ReleaseSlot::existing("v1", 0, names("base", 998))],
            options(false, true),
        );

        let plan = p.plan(names("new", 5));

        let targets = decisions(&plan)
            .iter()
            .map(|d| d.release().to_string())
            .collect::<Vec<_>>();
        assert_eq!(
            targets,
            vec!["v1", "v1", "v1-extra1", "v1-extra1", "v1-extra1"]
        );
        assert_eq!(plan.state.slot("v1").unwrap().asset_count, 1000);
        assert_eq!(plan.state.tail().asset_count, 3);
    }

    #[test]
    fn existing_files_are_still_skipped_when_full() {
        let p = planner(
            vec![ReleaseSlot::existing("v1", 0, names("base", 1000))],
            options(false, false),
        );

        let plan = p.plan(["base-3.bin", "new.zip"]);

        assert_eq!(
            plan.files[0].decision.as_ref().unwrap(),
            &UploadDecision::Skip {
                release: "v1".into()
            }
        );
        assert!(plan.files[1].decision.is_err());
    }

    #[test]
    fn respects_custom_ceiling() {
        let p = planner(
            vec![ReleaseSlot::existing("v1", 0, names("base", 2))],
            PlanOptions {
                overwrite: false,
                allow_new_releases: true,
                max_assets: 3,
            },
        );

        let plan = p.plan(["x", "y"]);

        let targets = decisions(&plan)
            .iter()
            .map(|d| d.release().to_string())
            .collect::<Vec<_>>();
        assert_eq!(targets, vec!["v1", "v1-extra1"]);
    }

    #[test]
    fn planning_is_idempotent() {
        let p = planner(
            vec![
                ReleaseSlot::existing("v1", 0, names("base", 999)),
                ReleaseSlot::existing("v1-extra1", 1, names("e1", 999)),
            ],
            options(false, true),
        );
        let before = p.clone();

        let mut candidates = names("new", 4);
        candidates.push("e1-0.bin".into());

        let first = p.plan(&candidates);
        let second = p.plan(&candidates);

        assert_eq!(p, before);
        assert_eq!(decisions(&first), decisions(&second));
        assert_eq!(first.state, second.state);
    }

    #[test]
    fn requires_at_least_one_slot() {
        let err =
            UploadPlanner::new("v1", vec![], options(false, false)).unwrap_err();
        assert!(matches!(err, AssetError::ReleaseNotFound { .. }));
    }

    #[tokio::test]
    async fn builds_slots_from_sequence() {
        let fake = FakeForge::new()
            .with_assets("v1", filler_assets("base", 3))
            .with_release("v1-extra1", &["a.zip"]);
        let manager = manager_for(fake);
        let sequence = resolve(&manager, "v1").await.unwrap();

        let p = UploadPlanner::from_sequence(
            &manager,
            &sequence,
            options(false, false),
        )
        .await
        .unwrap();

        assert_eq!(p.slots().len(), 2);
        assert_eq!(p.slot("v1").unwrap().asset_count, 3);
        assert!(p.slot("v1").unwrap().contains("base-0.bin"));
        assert!(p.tail().contains("a.zip"));
        assert!(!p.tail().pending);
    }
}
