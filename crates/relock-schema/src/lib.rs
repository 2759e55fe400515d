//! Manifest and lock snapshot schema for relock.
//!
//! This crate defines the two documents the change detector compares: the
//! user-authored dependency manifest (`relock.toml`, parsed into [`Manifest`])
//! and the previously resolved lock snapshot (`relock.lock`, parsed into
//! [`LockSnapshot`]), together with the shared vocabulary between them:
//! layered [`Settings`], [`VersionRange`] requirements, remote file
//! references, and the lock graph queries the detector consumes.

pub mod lock;
pub mod manifest;
pub mod remote;
pub mod settings;
pub mod types;
pub mod version;

pub use lock::{parse_lock_str, LockError, LockGroup, LockSnapshot, ResolvedPackage};
pub use manifest::{
    parse_manifest_file, parse_manifest_str, Manifest, ManifestError, ManifestGroup,
    PackageRequirement, RegistrySource,
};
pub use remote::{RemoteFileSpec, RemoteOrigin, RemoteRestriction, ResolvedRemoteFile};
pub use settings::{FrameworkRestriction, GroupOptions, Settings};
pub use types::{GroupName, PackageName};
pub use version::VersionRange;
