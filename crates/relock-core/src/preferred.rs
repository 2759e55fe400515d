//! Preferred version and source lookup for re-resolution.

use relock_schema::{GroupName, LockSnapshot, Manifest, PackageName, RegistrySource};
use semver::Version;
use std::collections::BTreeMap;

/// For every package in the snapshot, the version the prior resolution chose
/// and the source re-resolution should try first.
///
/// The manifest's declared source wins over the lock-recorded one when the
/// URLs match, so credential updates take effect without forcing a fresh
/// resolution. The version is a bias, not a constraint: the resolver is free
/// to pick another one.
pub fn preferred_versions(
    manifest: &Manifest,
    lock: &LockSnapshot,
) -> BTreeMap<(GroupName, PackageName), (Version, RegistrySource)> {
    let mut preferred = BTreeMap::new();
    for ((group, name), package) in lock.grouped_resolution() {
        let source = manifest
            .groups
            .get(&group)
            .and_then(|mg| mg.sources.iter().find(|s| s.url == package.source.url))
            .cloned()
            .unwrap_or_else(|| package.source.clone());
        preferred.insert((group, name), (package.version.clone(), source));
    }
    preferred
}
