use std::fs;
use std::path::{Path, PathBuf};

use crate::config;
use crate::error::{ExportError, Result};

/// Display the most recent CSV export
pub fn latest(config_path: Option<PathBuf>, output_dir: Option<PathBuf>) -> Result<()> {
    let output_dir = match output_dir {
        Some(dir) => dir,
        None => config::resolve(config_path.as_deref())?.0.export.output_dir,
    };

    let latest_file = find_latest_export(&output_dir)?;

    let content = fs::read_to_string(&latest_file)?;
    println!("{}", latest_file.display());
    print!("{}", content);

    Ok(())
}

/// Find the most recent `commits_*.csv` file in the output directory
fn find_latest_export(output_dir: &Path) -> Result<PathBuf> {
    if !output_dir.exists() {
        return Err(ExportError::Config(format!(
            "Output directory does not exist: {}",
            output_dir.display()
        )));
    }

    let mut exports = Vec::new();

    for entry in fs::read_dir(output_dir)? {
        let path = entry?.path();

        if path.is_file() {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with("commits_") && name.ends_with(".csv") {
                    exports.push(path);
                }
            }
        }
    }

    // Timestamped names sort chronologically
    exports.sort();

    exports.pop().ok_or_else(|| {
        ExportError::Config("No exports found. Run 'commit-export export' first.".to_string())
    })
}
