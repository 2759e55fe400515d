use super::{json_pretty, load_inputs, EXIT_CHANGES_DETECTED, EXIT_SUCCESS};
use relock_core::detect_changes;
use std::path::Path;

pub fn run(manifest_path: &Path, lock_path: &Path, json: bool) -> Result<u8, String> {
    let (manifest, lock) = load_inputs(manifest_path, lock_path)?;
    let changes = detect_changes(&manifest, &lock);

    if json {
        println!("{}", json_pretty(&changes)?);
    } else if changes.has_changes {
        for group in changes.changed_groups() {
            println!("group {group} needs re-resolution:");
            let mut detailed = false;
            for name in changes.packages_in(group) {
                println!("  ~ package {name}");
                detailed = true;
            }
            for file in changes.remote_files_in(group) {
                println!("  ~ remote file {}/{} {}", file.owner, file.project, file.name);
                detailed = true;
            }
            if !detailed {
                println!("  ~ group options changed");
            }
        }
    } else {
        println!("lock snapshot is up to date");
    }

    if changes.has_changes {
        Ok(EXIT_CHANGES_DETECTED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}
