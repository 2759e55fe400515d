use relock_schema::{GroupName, LockSnapshot, Manifest};
use std::collections::BTreeSet;

/// Union of the group names appearing in either the manifest or the lock
/// snapshot. A group present on only one side still has to be visited, to
/// surface pure additions and pure removals of whole groups.
pub fn all_group_names(manifest: &Manifest, lock: &LockSnapshot) -> BTreeSet<GroupName> {
    manifest
        .groups
        .keys()
        .chain(lock.groups.keys())
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use relock_schema::{LockGroup, ManifestGroup};

    #[test]
    fn union_covers_both_sides() {
        let mut manifest = Manifest {
            manifest_version: 1,
            ..Manifest::default()
        };
        manifest
            .groups
            .insert(GroupName::new("main"), ManifestGroup::default());
        manifest
            .groups
            .insert(GroupName::new("build"), ManifestGroup::default());

        let mut lock = LockSnapshot::new("relock.lock");
        lock.groups
            .insert(GroupName::new("main"), LockGroup::default());
        lock.groups
            .insert(GroupName::new("legacy"), LockGroup::default());

        let names = all_group_names(&manifest, &lock);
        assert_eq!(names.len(), 3);
        assert!(names.contains(&GroupName::new("build")));
        assert!(names.contains(&GroupName::new("legacy")));
    }

    #[test]
    fn empty_inputs_give_empty_union() {
        let manifest = Manifest {
            manifest_version: 1,
            ..Manifest::default()
        };
        let lock = LockSnapshot::new("relock.lock");
        assert!(all_group_names(&manifest, &lock).is_empty());
    }
}
