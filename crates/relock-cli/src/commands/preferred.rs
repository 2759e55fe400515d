use super::{json_pretty, load_inputs, EXIT_SUCCESS};
use relock_core::preferred_versions;
use std::path::Path;

pub fn run(manifest_path: &Path, lock_path: &Path, json: bool) -> Result<u8, String> {
    let (manifest, lock) = load_inputs(manifest_path, lock_path)?;
    let preferred = preferred_versions(&manifest, &lock);

    if json {
        let rows: Vec<_> = preferred
            .iter()
            .map(|((group, package), (version, source))| {
                serde_json::json!({
                    "group": group,
                    "package": package,
                    "version": version,
                    "source": source.url,
                })
            })
            .collect();
        println!("{}", json_pretty(&rows)?);
    } else if preferred.is_empty() {
        println!("lock snapshot has no resolved packages");
    } else {
        for ((group, package), (version, source)) in &preferred {
            println!("{group}/{package} {version} ({})", source.url);
        }
    }
    Ok(EXIT_SUCCESS)
}
