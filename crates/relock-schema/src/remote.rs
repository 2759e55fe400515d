//! Remote source file references, in unresolved (manifest) and resolved
//! (lock snapshot) forms.

use serde::{Deserialize, Serialize};

/// Kind and location of a remote source.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteOrigin {
    #[default]
    GitHub,
    GitLab,
    Gist,
    Http {
        url: String,
    },
}

/// Version restriction attached to a remote file in the manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteRestriction {
    /// No restriction; any resolved commit is acceptable.
    #[default]
    Unpinned,
    /// Pinned to a concrete commit.
    Commit(String),
    /// Restricted by a version requirement, kept in textual form.
    Range(String),
}

/// A remote source file declared in the manifest, not yet resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoteFileSpec {
    pub owner: String,
    pub project: String,
    /// Path within the project. Stored without a leading separator.
    pub name: String,
    #[serde(default)]
    pub auth_key: Option<String>,
    #[serde(default)]
    pub origin: RemoteOrigin,
    #[serde(default)]
    pub restriction: RemoteRestriction,
}

/// A remote source file as recorded in the lock snapshot, with the commit
/// the prior resolution actually chose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolvedRemoteFile {
    pub owner: String,
    pub project: String,
    /// Path within the project. Stored without a leading separator.
    pub name: String,
    /// The resolved commit. Always present in a lock snapshot.
    pub commit: String,
    #[serde(default)]
    pub auth_key: Option<String>,
    #[serde(default)]
    pub origin: RemoteOrigin,
}

/// Strip leading path separators so `/scripts/build.fsx` and
/// `scripts/build.fsx` denote the same file.
pub(crate) fn normalize_file_name(name: &str) -> String {
    name.trim().trim_start_matches(['/', '\\']).to_owned()
}
