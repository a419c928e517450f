//! Data models module
//!
//! Defines the export tree: ExportResult → ProjectExport → RepositoryCommits → CommitRecord.

pub mod commit;

pub use commit::{CommitRecord, ExportResult, ProjectExport, RepositoryCommits};
