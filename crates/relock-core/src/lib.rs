//! Change detection between a dependency manifest and its lock snapshot.
//!
//! The engine answers one question before the resolver runs: is the existing
//! lock snapshot still valid, and if not, which entries must be re-resolved?
//! It is a pure comparison over two immutable inputs: per-group registry
//! package deltas, remote file deltas with pin normalization, settings
//! reconciliation, and a preferred-version lookup that biases re-resolution
//! toward previously used sources. No I/O, no shared state, deterministic
//! output for identical input.

pub mod detect;
pub mod groups;
pub mod preferred;
pub mod remote;
pub mod requirements;

pub use detect::{detect_changes, DetectedChanges};
pub use groups::all_group_names;
pub use preferred::preferred_versions;
pub use remote::{remote_file_changes_in_group, RemoteFileId, RemotePin};
pub use requirements::registry_changes_in_group;
