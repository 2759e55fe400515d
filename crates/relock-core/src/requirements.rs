//! Registry package change detection: which declared requirements no longer
//! match the resolved state, and which resolved state the manifest dropped.

use relock_schema::{
    GroupName, LockGroup, ManifestGroup, PackageName, PackageRequirement, ResolvedPackage, Settings,
};
use std::collections::BTreeSet;
use tracing::debug;

/// True when the effective settings differ in a way that forces
/// re-resolution.
///
/// Framework-restriction drift on a transitive package is tolerated: those
/// restrictions are derived from the direct dependencies, not user-authored,
/// and fluctuate as unrelated requirements change.
pub(crate) fn settings_changed(current: &Settings, locked: &Settings, transitive: bool) -> bool {
    if current == locked {
        return false;
    }
    let aligned = current.with_framework_restriction(locked.framework_restriction.clone());
    if aligned == *locked {
        // Only the framework restriction differs.
        return !transitive;
    }
    true
}

/// True when the resolved package no longer satisfies the requirement, or
/// the effective settings drifted. In strict mode the requirement is tested
/// exactly as declared; otherwise it is widened to accept prereleases first.
pub(crate) fn has_changed(
    requirement: &PackageRequirement,
    current_settings: &Settings,
    locked: &ResolvedPackage,
    locked_settings: &Settings,
    strict: bool,
    transitive: bool,
) -> bool {
    let requirement_ok = if strict {
        requirement.range.accepts(&locked.version)
    } else {
        requirement.range.accepts_any_prerelease(&locked.version)
    };
    !requirement_ok || settings_changed(current_settings, locked_settings, transitive)
}

/// Registry package deltas for one group: requirements that are new or no
/// longer satisfied, plus lock entries the manifest dropped, the dropped and
/// drifted lock entries expanded to their full dependency neighborhood.
pub fn registry_changes_in_group(
    group: &GroupName,
    manifest_group: Option<&ManifestGroup>,
    lock_group: Option<&LockGroup>,
) -> BTreeSet<(GroupName, PackageName)> {
    let added = added_requirements(manifest_group, lock_group);
    let modified = modified_lock_entries(manifest_group, lock_group);

    let mut changed: BTreeSet<(GroupName, PackageName)> = added
        .into_iter()
        .map(|name| (group.clone(), name))
        .collect();

    // A modified or removed entry invalidates its whole dependency
    // neighborhood, not just itself.
    if let Some(lg) = lock_group {
        for name in modified {
            for member in lg.dependency_closure(&name) {
                changed.insert((group.clone(), member));
            }
        }
    }

    if !changed.is_empty() {
        debug!(
            "group {group}: {} registry package(s) need re-resolution",
            changed.len()
        );
    }
    changed
}

/// Manifest requirements with no matching resolved package, or whose
/// resolved package no longer satisfies them.
fn added_requirements(
    manifest_group: Option<&ManifestGroup>,
    lock_group: Option<&LockGroup>,
) -> BTreeSet<PackageName> {
    let Some(mg) = manifest_group else {
        return BTreeSet::new();
    };

    let mut added = BTreeSet::new();
    match lock_group {
        None => {
            // The whole group is new; every requirement needs resolution.
            added.extend(mg.requirements.iter().map(|r| r.name.clone()));
        }
        Some(lg) => {
            let strict = mg.options.strict;
            let transitive = lg.transitive_dependency_names();
            for requirement in &mg.requirements {
                let current = Settings::layered(&mg.options.settings, &requirement.settings);
                let changed = match lg.resolution.get(&requirement.name) {
                    None => true,
                    Some(locked) => {
                        let locked_settings =
                            Settings::layered(&lg.options.settings, &locked.settings);
                        has_changed(
                            requirement,
                            &current,
                            locked,
                            &locked_settings,
                            strict,
                            transitive.contains(&requirement.name),
                        )
                    }
                };
                if changed {
                    added.insert(requirement.name.clone());
                }
            }
        }
    }
    added
}

/// Top-level lock entries the manifest no longer declares or no longer
/// accepts. Iterates the lock snapshot, not the manifest, so removals are
/// seen.
fn modified_lock_entries(
    manifest_group: Option<&ManifestGroup>,
    lock_group: Option<&LockGroup>,
) -> BTreeSet<PackageName> {
    let Some(lg) = lock_group else {
        return BTreeSet::new();
    };

    let transitive = lg.transitive_dependency_names();
    let mut modified = BTreeSet::new();
    for locked in lg.top_level_dependencies() {
        let requirement = manifest_group
            .and_then(|mg| mg.requirements.iter().find(|r| r.name == locked.name));
        match (manifest_group, requirement) {
            (Some(mg), Some(requirement)) => {
                let current = Settings::layered(&mg.options.settings, &requirement.settings);
                let locked_settings = Settings::layered(&lg.options.settings, &locked.settings);
                if has_changed(
                    requirement,
                    &current,
                    locked,
                    &locked_settings,
                    mg.options.strict,
                    transitive.contains(&locked.name),
                ) {
                    modified.insert(locked.name.clone());
                }
            }
            _ => {
                // Removed from the manifest; removal is itself a change.
                debug!("package {} was removed from the manifest", locked.name);
                modified.insert(locked.name.clone());
            }
        }
    }
    modified
}

#[cfg(test)]
mod tests {
    use super::*;
    use relock_schema::{
        FrameworkRestriction, GroupOptions, RegistrySource, VersionRange,
    };
    use semver::Version;

    fn source() -> RegistrySource {
        RegistrySource {
            url: "https://registry.example.org/v3".to_owned(),
            auth_key: None,
        }
    }

    fn requirement(name: &str, range: &str) -> PackageRequirement {
        PackageRequirement {
            name: PackageName::new(name),
            range: VersionRange::parse(range).unwrap(),
            settings: Settings::default(),
        }
    }

    fn resolved(name: &str, version: &str, dependencies: &[&str]) -> ResolvedPackage {
        ResolvedPackage {
            name: PackageName::new(name),
            version: Version::parse(version).unwrap(),
            dependencies: dependencies.iter().map(|d| PackageName::new(*d)).collect(),
            source: source(),
            settings: Settings::default(),
        }
    }

    fn lock_group(top_level: &[&str], packages: Vec<ResolvedPackage>) -> LockGroup {
        LockGroup {
            top_level: top_level.iter().map(|n| PackageName::new(*n)).collect(),
            resolution: packages.into_iter().map(|p| (p.name.clone(), p)).collect(),
            remote_files: Vec::new(),
            options: GroupOptions::default(),
        }
    }

    fn manifest_group(requirements: Vec<PackageRequirement>) -> ManifestGroup {
        ManifestGroup {
            requirements,
            ..ManifestGroup::default()
        }
    }

    #[test]
    fn identical_settings_unchanged() {
        let settings = Settings {
            copy_local: Some(true),
            ..Settings::default()
        };
        assert!(!settings_changed(&settings, &settings.clone(), false));
    }

    #[test]
    fn framework_only_drift_tolerated_for_transitive() {
        let current = Settings::default();
        let locked = Settings {
            framework_restriction: FrameworkRestriction::within(["net472"]),
            ..Settings::default()
        };
        assert!(settings_changed(&current, &locked, false));
        assert!(!settings_changed(&current, &locked, true));
    }

    #[test]
    fn non_framework_drift_always_changes() {
        let current = Settings {
            copy_local: Some(true),
            ..Settings::default()
        };
        let locked = Settings::default();
        assert!(settings_changed(&current, &locked, false));
        assert!(settings_changed(&current, &locked, true));
    }

    #[test]
    fn satisfied_requirement_is_unchanged() {
        let group = GroupName::new("main");
        let mg = manifest_group(vec![requirement("Foo", ">=1.0.0")]);
        let lg = lock_group(&["Foo"], vec![resolved("Foo", "1.2.0", &[])]);
        assert!(registry_changes_in_group(&group, Some(&mg), Some(&lg)).is_empty());
    }

    #[test]
    fn unsatisfied_requirement_is_changed() {
        let group = GroupName::new("main");
        let mg = manifest_group(vec![requirement("Foo", ">=2.0.0")]);
        let lg = lock_group(&["Foo"], vec![resolved("Foo", "1.2.0", &[])]);
        let changed = registry_changes_in_group(&group, Some(&mg), Some(&lg));
        assert!(changed.contains(&(group.clone(), PackageName::new("Foo"))));
    }

    #[test]
    fn missing_lock_entry_is_added_regardless_of_range() {
        let group = GroupName::new("main");
        let mg = manifest_group(vec![requirement("Foo", "*")]);
        let changed = registry_changes_in_group(&group, Some(&mg), None);
        assert_eq!(changed.len(), 1);
        assert!(changed.contains(&(group.clone(), PackageName::new("Foo"))));
    }

    #[test]
    fn strict_group_rejects_prerelease() {
        let group = GroupName::new("main");
        let mut mg = manifest_group(vec![requirement("Foo", ">=6.0.0")]);
        let lg = lock_group(&["Foo"], vec![resolved("Foo", "6.1.0-beta", &[])]);

        mg.options.strict = true;
        assert!(!registry_changes_in_group(&group, Some(&mg), Some(&lg)).is_empty());

        mg.options.strict = false;
        assert!(registry_changes_in_group(&group, Some(&mg), Some(&lg)).is_empty());
    }

    #[test]
    fn removal_expands_to_dependency_neighborhood() {
        // Bar depends on Foo; dropping Foo from the manifest invalidates Bar.
        let group = GroupName::new("main");
        let mg = manifest_group(vec![requirement("Bar", "*")]);
        let lg = lock_group(
            &["Foo", "Bar"],
            vec![resolved("Foo", "1.0.0", &[]), resolved("Bar", "2.0.0", &["Foo"])],
        );
        let changed = registry_changes_in_group(&group, Some(&mg), Some(&lg));
        assert!(changed.contains(&(group.clone(), PackageName::new("Foo"))));
        assert!(changed.contains(&(group.clone(), PackageName::new("Bar"))));
    }

    #[test]
    fn lock_only_group_is_fully_removed() {
        let group = GroupName::new("legacy");
        let lg = lock_group(
            &["Foo"],
            vec![resolved("Foo", "1.0.0", &["Leaf"]), resolved("Leaf", "0.1.0", &[])],
        );
        let changed = registry_changes_in_group(&group, None, Some(&lg));
        assert_eq!(changed.len(), 2);
    }

    #[test]
    fn settings_drift_on_direct_package_is_changed() {
        let group = GroupName::new("main");
        let mut req = requirement("Foo", ">=1.0.0");
        req.settings.framework_restriction = FrameworkRestriction::within(["net6.0"]);
        let mg = manifest_group(vec![req]);
        let lg = lock_group(&["Foo"], vec![resolved("Foo", "1.2.0", &[])]);
        let changed = registry_changes_in_group(&group, Some(&mg), Some(&lg));
        assert!(changed.contains(&(group.clone(), PackageName::new("Foo"))));
    }

    #[test]
    fn group_default_settings_flow_into_comparison() {
        // The same restriction declared at group level and recorded at
        // package level in the lock must compare equal after layering.
        let group = GroupName::new("main");
        let mut mg = manifest_group(vec![requirement("Foo", ">=1.0.0")]);
        mg.options.settings.framework_restriction = FrameworkRestriction::within(["net6.0"]);

        let mut locked = resolved("Foo", "1.2.0", &[]);
        locked.settings.framework_restriction = FrameworkRestriction::within(["net6.0"]);
        let lg = lock_group(&["Foo"], vec![locked]);

        assert!(registry_changes_in_group(&group, Some(&mg), Some(&lg)).is_empty());
    }
}
