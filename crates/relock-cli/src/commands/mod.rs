pub mod check;
pub mod completions;
pub mod preferred;

use relock_schema::{parse_manifest_file, LockSnapshot, Manifest};
use std::path::Path;
use tracing::debug;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_MANIFEST_ERROR: u8 = 2;
pub const EXIT_LOCK_ERROR: u8 = 3;
/// Detection ran cleanly and found entries that must be re-resolved.
/// Distinct from the error exits so scripts can branch on it.
pub const EXIT_CHANGES_DETECTED: u8 = 4;

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

/// Load both inputs. A missing lock snapshot is ordinary input; detection
/// then reports every declared entry as an addition.
pub fn load_inputs(
    manifest_path: &Path,
    lock_path: &Path,
) -> Result<(Manifest, LockSnapshot), String> {
    let manifest = parse_manifest_file(manifest_path).map_err(|e| e.to_string())?;
    let lock = if lock_path.exists() {
        LockSnapshot::read_from_file(lock_path).map_err(|e| e.to_string())?
    } else {
        debug!("no lock snapshot at {}", lock_path.display());
        LockSnapshot::new(lock_path.display().to_string())
    };
    Ok((manifest, lock))
}
