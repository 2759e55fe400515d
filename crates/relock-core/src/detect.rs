//! Aggregation of the per-group detectors into a single verdict.

use crate::groups::all_group_names;
use crate::remote::{remote_file_changes_in_group, RemoteFileId};
use crate::requirements::registry_changes_in_group;
use relock_schema::{
    FrameworkRestriction, GroupName, LockGroup, LockSnapshot, Manifest, ManifestGroup, PackageName,
};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

/// Everything that must be re-resolved for a lock snapshot to become valid
/// again, plus the aggregate verdict.
#[derive(Debug, Clone, Serialize)]
pub struct DetectedChanges {
    /// True when any group needs re-resolution.
    pub has_changes: bool,
    /// Registry packages requiring re-resolution, dependency neighborhoods
    /// included.
    pub packages: BTreeSet<(GroupName, PackageName)>,
    /// Remote files requiring re-resolution.
    pub remote_files: BTreeSet<(GroupName, RemoteFileId)>,
    changed_groups: BTreeSet<GroupName>,
}

impl DetectedChanges {
    /// Does this group need re-resolution?
    pub fn group_has_changes(&self, group: &GroupName) -> bool {
        self.changed_groups.contains(group)
    }

    /// Groups needing re-resolution, sorted.
    pub fn changed_groups(&self) -> &BTreeSet<GroupName> {
        &self.changed_groups
    }

    /// Package deltas for one group.
    pub fn packages_in<'a>(&'a self, group: &'a GroupName) -> impl Iterator<Item = &'a PackageName> {
        self.packages
            .iter()
            .filter(move |(g, _)| g == group)
            .map(|(_, name)| name)
    }

    /// Remote file deltas for one group.
    pub fn remote_files_in<'a>(
        &'a self,
        group: &'a GroupName,
    ) -> impl Iterator<Item = &'a RemoteFileId> {
        self.remote_files
            .iter()
            .filter(move |(g, _)| g == group)
            .map(|(_, id)| id)
    }
}

/// Compare the manifest against the lock snapshot and report everything that
/// must be re-resolved.
///
/// Pure and total: absent groups, packages, and options are ordinary cases,
/// and the inputs are never mutated. Output is content-identical for
/// identical inputs regardless of evaluation order.
pub fn detect_changes(manifest: &Manifest, lock: &LockSnapshot) -> DetectedChanges {
    let mut packages = BTreeSet::new();
    let mut remote_files = BTreeSet::new();
    let mut changed_groups = BTreeSet::new();

    for group in all_group_names(manifest, lock) {
        let manifest_group = manifest.groups.get(&group);
        let lock_group = lock.groups.get(&group);

        let group_packages = registry_changes_in_group(&group, manifest_group, lock_group);
        let group_files = remote_file_changes_in_group(&group, manifest_group, lock_group);
        let options_drift = options_changed(manifest_group, lock_group);

        if options_drift {
            debug!("group {group}: options drifted");
        }
        if options_drift || !group_packages.is_empty() || !group_files.is_empty() {
            changed_groups.insert(group.clone());
        }
        packages.extend(group_packages);
        remote_files.extend(group_files);
    }

    let has_changes = !changed_groups.is_empty();
    debug!(
        "change detection: {} package(s), {} remote file(s), {} group(s) affected",
        packages.len(),
        remote_files.len(),
        changed_groups.len()
    );

    DetectedChanges {
        has_changes,
        packages,
        remote_files,
        changed_groups,
    }
}

/// Group options drift. A missing side counts as drift; a manifest set to
/// auto-detect accepts whatever restriction the lock last recorded.
fn options_changed(
    manifest_group: Option<&ManifestGroup>,
    lock_group: Option<&LockGroup>,
) -> bool {
    match (manifest_group, lock_group) {
        (Some(mg), Some(lg)) => {
            let mut locked = lg.options.clone();
            if mg.options.settings.framework_restriction.is_auto_detect() {
                locked.settings.framework_restriction = FrameworkRestriction::AutoDetect;
            }
            mg.options != locked
        }
        _ => true,
    }
}
