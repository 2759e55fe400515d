//! Remote file change detection with pin normalization.

use relock_schema::{
    GroupName, LockGroup, ManifestGroup, RemoteFileSpec, RemoteOrigin, RemoteRestriction,
    ResolvedRemoteFile,
};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

/// Identity of a remote file reference.
///
/// Equality, ordering, and hashing are all full-tuple structural, pin
/// included, so the three contracts stay coherent. The "an unpinned request
/// matches any resolved commit" rule is applied by pin normalization before
/// sets are compared, never inside equality itself.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RemoteFileId {
    pub owner: String,
    pub project: String,
    pub name: String,
    pub origin: RemoteOrigin,
    pub auth_key: Option<String>,
    pub pin: Option<RemotePin>,
}

/// The version constraint carried by a remote file identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RemotePin {
    /// A concrete commit.
    Commit(String),
    /// A version requirement, in textual form.
    Range(String),
}

impl RemoteFileId {
    /// Identity of a manifest-declared reference.
    pub fn from_spec(spec: &RemoteFileSpec) -> Self {
        Self {
            owner: spec.owner.clone(),
            project: spec.project.clone(),
            name: spec.name.clone(),
            origin: spec.origin.clone(),
            auth_key: spec.auth_key.clone(),
            pin: match &spec.restriction {
                RemoteRestriction::Unpinned => None,
                RemoteRestriction::Commit(commit) => Some(RemotePin::Commit(commit.clone())),
                RemoteRestriction::Range(range) => Some(RemotePin::Range(range.clone())),
            },
        }
    }

    /// Identity of a lock-resolved reference; the pin is the resolved commit.
    pub fn from_resolved(file: &ResolvedRemoteFile) -> Self {
        Self {
            owner: file.owner.clone(),
            project: file.project.clone(),
            name: file.name.clone(),
            origin: file.origin.clone(),
            auth_key: file.auth_key.clone(),
            pin: Some(RemotePin::Commit(file.commit.clone())),
        }
    }
}

/// Remote file deltas for one group: manifest references with no matching
/// lock entry, plus everything recorded for a group the manifest dropped.
pub fn remote_file_changes_in_group(
    group: &GroupName,
    manifest_group: Option<&ManifestGroup>,
    lock_group: Option<&LockGroup>,
) -> BTreeSet<(GroupName, RemoteFileId)> {
    let changed: BTreeSet<(GroupName, RemoteFileId)> = match (manifest_group, lock_group) {
        (None, None) => BTreeSet::new(),
        // A group only in the manifest: every reference is new.
        (Some(mg), None) => mg
            .remote_files
            .iter()
            .map(|spec| (group.clone(), RemoteFileId::from_spec(spec)))
            .collect(),
        // A group only in the lock snapshot: every reference is removed,
        // surfaced under its resolved-form identity.
        (None, Some(lg)) => lg
            .remote_files
            .iter()
            .map(|file| (group.clone(), RemoteFileId::from_resolved(file)))
            .collect(),
        (Some(mg), Some(lg)) => {
            let declared: BTreeSet<RemoteFileId> =
                mg.remote_files.iter().map(RemoteFileId::from_spec).collect();
            let locked: BTreeSet<RemoteFileId> = lg
                .remote_files
                .iter()
                .map(|file| normalized_lock_id(file, mg))
                .collect();
            declared
                .difference(&locked)
                .map(|id| (group.clone(), id.clone()))
                .collect()
        }
    };

    if !changed.is_empty() {
        debug!(
            "group {group}: {} remote file(s) need re-resolution",
            changed.len()
        );
    }
    changed
}

/// Lock-side identity with the pin normalized against the manifest.
///
/// An unpinned manifest entry must not appear to differ merely because the
/// lock recorded the commit it resolved to; pin comparison should only fire
/// when the user pinned a commit that no longer matches. A range restriction
/// is adopted textually, since testing the resolved commit against it is the
/// resolver's business, not the detector's.
fn normalized_lock_id(file: &ResolvedRemoteFile, manifest_group: &ManifestGroup) -> RemoteFileId {
    let declared = manifest_group
        .remote_files
        .iter()
        .find(|spec| spec.name == file.name);
    let pin = match declared.map(|spec| &spec.restriction) {
        None | Some(RemoteRestriction::Unpinned) => None,
        Some(RemoteRestriction::Range(range)) => Some(RemotePin::Range(range.clone())),
        Some(RemoteRestriction::Commit(_)) => Some(RemotePin::Commit(file.commit.clone())),
    };
    RemoteFileId {
        pin,
        ..RemoteFileId::from_resolved(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relock_schema::{GroupOptions, ManifestGroup};
    use std::collections::HashSet;

    fn spec(name: &str, restriction: RemoteRestriction) -> RemoteFileSpec {
        RemoteFileSpec {
            owner: "fsprojects".to_owned(),
            project: "build-tools".to_owned(),
            name: name.to_owned(),
            auth_key: None,
            origin: RemoteOrigin::GitHub,
            restriction,
        }
    }

    fn file(name: &str, commit: &str) -> ResolvedRemoteFile {
        ResolvedRemoteFile {
            owner: "fsprojects".to_owned(),
            project: "build-tools".to_owned(),
            name: name.to_owned(),
            commit: commit.to_owned(),
            auth_key: None,
            origin: RemoteOrigin::GitHub,
        }
    }

    fn manifest_group(files: Vec<RemoteFileSpec>) -> ManifestGroup {
        ManifestGroup {
            remote_files: files,
            ..ManifestGroup::default()
        }
    }

    fn lock_group(files: Vec<ResolvedRemoteFile>) -> LockGroup {
        LockGroup {
            remote_files: files,
            options: GroupOptions::default(),
            ..LockGroup::default()
        }
    }

    #[test]
    fn unpinned_manifest_matches_any_resolved_commit() {
        let group = GroupName::new("main");
        let mg = manifest_group(vec![spec("scripts/build.fsx", RemoteRestriction::Unpinned)]);
        let lg = lock_group(vec![file("scripts/build.fsx", "abc123")]);
        assert!(remote_file_changes_in_group(&group, Some(&mg), Some(&lg)).is_empty());
    }

    #[test]
    fn stale_explicit_pin_is_a_change() {
        let group = GroupName::new("main");
        let mg = manifest_group(vec![spec(
            "scripts/build.fsx",
            RemoteRestriction::Commit("def456".to_owned()),
        )]);
        let lg = lock_group(vec![file("scripts/build.fsx", "abc123")]);
        let changed = remote_file_changes_in_group(&group, Some(&mg), Some(&lg));
        assert_eq!(changed.len(), 1);
    }

    #[test]
    fn matching_explicit_pin_is_unchanged() {
        let group = GroupName::new("main");
        let mg = manifest_group(vec![spec(
            "scripts/build.fsx",
            RemoteRestriction::Commit("abc123".to_owned()),
        )]);
        let lg = lock_group(vec![file("scripts/build.fsx", "abc123")]);
        assert!(remote_file_changes_in_group(&group, Some(&mg), Some(&lg)).is_empty());
    }

    #[test]
    fn range_restriction_is_adopted_textually() {
        let group = GroupName::new("main");
        let mg = manifest_group(vec![spec(
            "scripts/build.fsx",
            RemoteRestriction::Range(">= 1.0".to_owned()),
        )]);
        let lg = lock_group(vec![file("scripts/build.fsx", "abc123")]);
        assert!(remote_file_changes_in_group(&group, Some(&mg), Some(&lg)).is_empty());
    }

    #[test]
    fn new_manifest_reference_is_added() {
        let group = GroupName::new("main");
        let mg = manifest_group(vec![
            spec("scripts/build.fsx", RemoteRestriction::Unpinned),
            spec("scripts/pack.fsx", RemoteRestriction::Unpinned),
        ]);
        let lg = lock_group(vec![file("scripts/build.fsx", "abc123")]);
        let changed = remote_file_changes_in_group(&group, Some(&mg), Some(&lg));
        assert_eq!(changed.len(), 1);
        let (_, id) = changed.iter().next().unwrap();
        assert_eq!(id.name, "scripts/pack.fsx");
    }

    #[test]
    fn lock_only_group_is_fully_surfaced() {
        let group = GroupName::new("legacy");
        let lg = lock_group(vec![file("scripts/build.fsx", "abc123")]);
        let changed = remote_file_changes_in_group(&group, None, Some(&lg));
        assert_eq!(changed.len(), 1);
        let (_, id) = changed.iter().next().unwrap();
        assert_eq!(id.pin, Some(RemotePin::Commit("abc123".to_owned())));
    }

    #[test]
    fn manifest_only_group_is_fully_added() {
        let group = GroupName::new("fresh");
        let mg = manifest_group(vec![spec("scripts/build.fsx", RemoteRestriction::Unpinned)]);
        let changed = remote_file_changes_in_group(&group, Some(&mg), None);
        assert_eq!(changed.len(), 1);
    }

    #[test]
    fn differing_auth_keys_are_distinct_references() {
        let group = GroupName::new("main");
        let mut with_key = spec("scripts/build.fsx", RemoteRestriction::Unpinned);
        with_key.auth_key = Some("ci-token".to_owned());
        let mg = manifest_group(vec![with_key]);
        let lg = lock_group(vec![file("scripts/build.fsx", "abc123")]);
        let changed = remote_file_changes_in_group(&group, Some(&mg), Some(&lg));
        assert_eq!(changed.len(), 1);
    }

    // Equality, ordering, and hashing include the pin unconditionally; the
    // partial-identity rule lives in normalization alone. These membership
    // tests pin that choice down.

    #[test]
    fn set_membership_distinguishes_pins() {
        let unpinned = RemoteFileId::from_spec(&spec("a.fsx", RemoteRestriction::Unpinned));
        let pinned =
            RemoteFileId::from_spec(&spec("a.fsx", RemoteRestriction::Commit("abc".to_owned())));

        let mut set = BTreeSet::new();
        set.insert(unpinned.clone());
        assert!(!set.contains(&pinned));
        set.insert(pinned.clone());
        assert_eq!(set.len(), 2);

        let mut hashed = HashSet::new();
        hashed.insert(unpinned);
        assert!(!hashed.contains(&pinned));
    }

    #[test]
    fn ordering_is_total_over_the_full_tuple() {
        let a = RemoteFileId::from_spec(&spec("a.fsx", RemoteRestriction::Commit("abc".to_owned())));
        let b = RemoteFileId::from_spec(&spec("a.fsx", RemoteRestriction::Commit("abd".to_owned())));
        let c = RemoteFileId::from_spec(&spec("b.fsx", RemoteRestriction::Unpinned));
        let mut ids = vec![c.clone(), b.clone(), a.clone()];
        ids.sort();
        assert_eq!(ids, vec![a, b, c]);
    }
}
