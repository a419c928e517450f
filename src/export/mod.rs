//! CSV export module
//!
//! One encoder backs both the in-memory and the file output, so the two
//! always agree byte for byte. Fields are quoted only when needed.

use chrono::{DateTime, Local};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{ExportError, Result};
use crate::models::ExportResult;

/// Column header row
pub const HEADER: [&str; 6] = [
    "Project",
    "Repository",
    "Commit ID",
    "Author",
    "Date",
    "Message",
];

/// Serialize `result` into a CSV string
pub fn to_csv_string(result: &ExportResult) -> Result<String> {
    let mut buffer = Vec::new();
    write_csv(result, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| ExportError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// Write `result` to `directory/filename`, creating the directory if needed
///
/// Without a filename, `commits_<YYYYMMDD_HHMMSS>.csv` in local time is used.
/// Returns the full path of the written file.
pub fn write_csv_file(
    result: &ExportResult,
    directory: &Path,
    filename: Option<&str>,
) -> Result<PathBuf> {
    if !directory.exists() {
        fs::create_dir_all(directory)?;
    }

    let filename = match filename {
        Some(name) => name.to_string(),
        None => default_filename(Local::now()),
    };
    let path = directory.join(filename);

    let file = File::create(&path)?;
    write_csv(result, file)?;

    tracing::debug!(path = %path.display(), rows = result.commit_count(), "wrote csv");
    Ok(path)
}

/// `commits_<YYYYMMDD_HHMMSS>.csv` for the given instant
pub fn default_filename(at: DateTime<Local>) -> String {
    format!("commits_{}.csv", at.format("%Y%m%d_%H%M%S"))
}

/// Encode header and rows in project → repository → commit order
fn write_csv<W: Write>(result: &ExportResult, out: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(out);

    writer.write_record(HEADER)?;
    for (project, repository, commit) in result.rows() {
        writer.write_record([
            project,
            repository,
            commit.commit_id.as_str(),
            commit.author.as_str(),
            commit.date.as_str(),
            commit.message.as_str(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
