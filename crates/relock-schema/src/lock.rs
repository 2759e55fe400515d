use crate::remote::{normalize_file_name, ResolvedRemoteFile};
use crate::settings::{GroupOptions, Settings};
use crate::types::{GroupName, PackageName};
use crate::RegistrySource;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LockError {
    #[error("lock file I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("lock file parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("lock file serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("unsupported lock_version: {0}, expected 1")]
    UnsupportedVersion(u32),
}

/// A package as pinned by a prior resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolvedPackage {
    pub name: PackageName,
    pub version: Version,
    /// Names of this package's direct dependencies within the same group.
    #[serde(default)]
    pub dependencies: Vec<PackageName>,
    pub source: RegistrySource,
    /// Settings as actually applied by the resolution.
    #[serde(default)]
    pub settings: Settings,
}

/// The resolved state of one dependency group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LockGroup {
    /// Names of the packages that were directly requested when this group
    /// was last resolved. A direct package may also appear as a dependency
    /// of another entry, so this cannot be derived from the graph.
    #[serde(default)]
    pub top_level: Vec<PackageName>,
    #[serde(default)]
    pub resolution: BTreeMap<PackageName, ResolvedPackage>,
    #[serde(default)]
    pub remote_files: Vec<ResolvedRemoteFile>,
    /// Group options as recorded at resolution time.
    #[serde(default)]
    pub options: GroupOptions,
}

/// The lock snapshot: the fully resolved state a prior resolver run produced.
///
/// The change detector treats this as immutable input; it is only ever
/// rewritten by the resolver after a detected change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LockSnapshot {
    pub lock_version: u32,
    /// Opaque token identifying where this snapshot lives. Carried through
    /// for callers; never interpreted here.
    #[serde(default)]
    pub origin: String,
    /// RFC 3339 time the snapshot was produced.
    #[serde(default)]
    pub resolved_at: String,
    #[serde(default)]
    pub groups: BTreeMap<GroupName, LockGroup>,
}

impl LockGroup {
    /// Every package name that appears as a dependency of some resolved
    /// package, i.e. everything pulled in transitively.
    pub fn transitive_dependency_names(&self) -> BTreeSet<PackageName> {
        self.resolution
            .values()
            .flat_map(|pkg| pkg.dependencies.iter().cloned())
            .collect()
    }

    /// The resolved packages recorded as directly requested. Names without a
    /// resolution entry are skipped; a truncated snapshot is ordinary input,
    /// not a failure.
    pub fn top_level_dependencies(&self) -> Vec<&ResolvedPackage> {
        self.top_level
            .iter()
            .filter_map(|name| self.resolution.get(name))
            .collect()
    }

    /// The full dependency neighborhood of a package: the package itself,
    /// everything it pulls in, and everything that pulls it in. Invalidating
    /// one package invalidates this whole set.
    pub fn dependency_closure(&self, name: &PackageName) -> BTreeSet<PackageName> {
        let mut closure = self.reachable_from(name);
        closure.extend(self.dependents_of(name));
        closure.insert(name.clone());
        closure
    }

    /// Packages reachable by following dependency edges downward from `name`.
    fn reachable_from(&self, name: &PackageName) -> BTreeSet<PackageName> {
        let mut visited = BTreeSet::new();
        let mut queue = vec![name.clone()];
        while let Some(current) = queue.pop() {
            let Some(pkg) = self.resolution.get(&current) else {
                continue;
            };
            for dep in &pkg.dependencies {
                if visited.insert(dep.clone()) {
                    queue.push(dep.clone());
                }
            }
        }
        visited
    }

    /// Packages that depend on `name`, directly or transitively.
    fn dependents_of(&self, name: &PackageName) -> BTreeSet<PackageName> {
        let mut reverse: BTreeMap<&PackageName, Vec<&PackageName>> = BTreeMap::new();
        for pkg in self.resolution.values() {
            for dep in &pkg.dependencies {
                reverse.entry(dep).or_default().push(&pkg.name);
            }
        }

        let mut visited = BTreeSet::new();
        let mut queue = vec![name];
        while let Some(current) = queue.pop() {
            let Some(parents) = reverse.get(current) else {
                continue;
            };
            for parent in parents {
                if visited.insert((*parent).clone()) {
                    queue.push(*parent);
                }
            }
        }
        visited
    }
}

impl LockSnapshot {
    /// An empty snapshot for the given origin, stamped with the current time.
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            lock_version: 1,
            origin: origin.into(),
            resolved_at: chrono::Utc::now().to_rfc3339(),
            groups: BTreeMap::new(),
        }
    }

    /// Flat view of every resolved package across all groups.
    pub fn grouped_resolution(&self) -> BTreeMap<(GroupName, PackageName), &ResolvedPackage> {
        self.groups
            .iter()
            .flat_map(|(group, contents)| {
                contents
                    .resolution
                    .iter()
                    .map(move |(name, pkg)| ((group.clone(), name.clone()), pkg))
            })
            .collect()
    }

    /// Validate and canonicalize in place, mirroring manifest normalization.
    pub fn normalize(&mut self) -> Result<(), LockError> {
        if self.lock_version != 1 {
            return Err(LockError::UnsupportedVersion(self.lock_version));
        }
        for contents in self.groups.values_mut() {
            for file in &mut contents.remote_files {
                file.name = normalize_file_name(&file.name);
            }
        }
        Ok(())
    }

    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), LockError> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)?;
        let dir = path.parent().unwrap_or(Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        std::io::Write::write_all(&mut tmp, content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| LockError::Io(e.error))?;
        // Fsync parent directory to ensure rename durability on power loss.
        if let Ok(f) = fs::File::open(dir) {
            let _ = f.sync_all();
        }
        Ok(())
    }

    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self, LockError> {
        let content = fs::read_to_string(path)?;
        parse_lock_str(&content)
    }
}

pub fn parse_lock_str(input: &str) -> Result<LockSnapshot, LockError> {
    let mut snapshot: LockSnapshot = toml::from_str(input)?;
    snapshot.normalize()?;
    Ok(snapshot)
}
