use crate::remote::{normalize_file_name, RemoteFileSpec};
use crate::settings::{GroupOptions, Settings};
use crate::types::{GroupName, PackageName};
use crate::version::VersionRange;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse manifest: {0}")]
    ParseToml(#[from] toml::de::Error),
    #[error("unsupported manifest_version: {0}, expected 1")]
    UnsupportedVersion(u32),
    #[error("group name must not be empty")]
    EmptyGroupName,
    #[error("requirement in group '{group}' has an empty name")]
    EmptyRequirementName { group: GroupName },
    #[error("duplicate requirement '{name}' in group '{group}'")]
    DuplicateRequirement { group: GroupName, name: PackageName },
    #[error("remote file in group '{group}' has an empty name")]
    EmptyRemoteFileName { group: GroupName },
    #[error("source in group '{group}' has an empty url")]
    EmptySourceUrl { group: GroupName },
}

/// The user-authored dependency manifest: desired dependency groups, their
/// direct requirements, and remote file references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub manifest_version: u32,
    #[serde(default)]
    pub groups: BTreeMap<GroupName, ManifestGroup>,
}

/// One named partition of dependencies, declared by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestGroup {
    /// Registry feeds this group resolves from, in declaration order.
    #[serde(default)]
    pub sources: Vec<RegistrySource>,
    /// Direct package requirements, in declaration order.
    #[serde(default)]
    pub requirements: Vec<PackageRequirement>,
    /// Remote source files, unresolved.
    #[serde(default)]
    pub remote_files: Vec<RemoteFileSpec>,
    #[serde(default)]
    pub options: GroupOptions,
}

/// A direct dependency explicitly declared by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageRequirement {
    pub name: PackageName,
    #[serde(default)]
    pub range: VersionRange,
    #[serde(default)]
    pub settings: Settings,
}

/// A registry feed a group resolves packages from.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistrySource {
    pub url: String,
    #[serde(default)]
    pub auth_key: Option<String>,
}

impl Manifest {
    /// Validate and canonicalize in place: version check, non-empty names,
    /// no duplicate requirements, remote file names without a leading
    /// separator.
    pub fn normalize(&mut self) -> Result<(), ManifestError> {
        if self.manifest_version != 1 {
            return Err(ManifestError::UnsupportedVersion(self.manifest_version));
        }

        for (group, contents) in &mut self.groups {
            if group.as_str().trim().is_empty() {
                return Err(ManifestError::EmptyGroupName);
            }

            let mut seen = BTreeSet::new();
            for requirement in &contents.requirements {
                if requirement.name.as_str().trim().is_empty() {
                    return Err(ManifestError::EmptyRequirementName {
                        group: group.clone(),
                    });
                }
                if !seen.insert(requirement.name.clone()) {
                    return Err(ManifestError::DuplicateRequirement {
                        group: group.clone(),
                        name: requirement.name.clone(),
                    });
                }
            }

            for source in &contents.sources {
                if source.url.trim().is_empty() {
                    return Err(ManifestError::EmptySourceUrl {
                        group: group.clone(),
                    });
                }
            }

            for file in &mut contents.remote_files {
                file.name = normalize_file_name(&file.name);
                if file.name.is_empty() {
                    return Err(ManifestError::EmptyRemoteFileName {
                        group: group.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Find a group's direct requirement by package name.
    pub fn requirement(&self, group: &GroupName, name: &PackageName) -> Option<&PackageRequirement> {
        self.groups
            .get(group)?
            .requirements
            .iter()
            .find(|r| r.name == *name)
    }
}

pub fn parse_manifest_str(input: &str) -> Result<Manifest, ManifestError> {
    let mut manifest: Manifest = toml::from_str(input)?;
    manifest.normalize()?;
    Ok(manifest)
}

pub fn parse_manifest_file(path: impl AsRef<Path>) -> Result<Manifest, ManifestError> {
    let content = fs::read_to_string(path)?;
    parse_manifest_str(&content)
}
