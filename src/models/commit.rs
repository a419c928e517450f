use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single commit matched by the author/date filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Full commit id as reported by the hosting service
    pub commit_id: String,
    /// Author display name
    pub author: String,
    /// Author timestamp, verbatim from the remote API
    pub date: String,
    /// Commit message
    pub message: String,
}

impl CommitRecord {
    /// Parsed `date`, if it is an RFC 3339 timestamp
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.date)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Commits of one repository, oldest first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryCommits {
    pub name: String,
    pub commits: Vec<CommitRecord>,
}

impl RepositoryCommits {
    pub fn new(name: impl Into<String>, commits: Vec<CommitRecord>) -> Self {
        Self {
            name: name.into(),
            commits,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }
}

/// Repositories of one project, in enumeration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectExport {
    pub name: String,
    pub repositories: Vec<RepositoryCommits>,
}

impl ProjectExport {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            repositories: Vec::new(),
        }
    }

    /// True when at least one repository has a matching commit
    pub fn has_commits(&self) -> bool {
        self.repositories.iter().any(|r| !r.is_empty())
    }

    pub fn commit_count(&self) -> usize {
        self.repositories.iter().map(|r| r.commits.len()).sum()
    }
}

/// Everything exported by one run
///
/// Only projects with at least one commit are kept by the aggregator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportResult {
    pub projects: Vec<ProjectExport>,
}

impl ExportResult {
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn commit_count(&self) -> usize {
        self.projects.iter().map(|p| p.commit_count()).sum()
    }

    /// Flatten into `(project, repository, commit)` in stored order
    pub fn rows(&self) -> impl Iterator<Item = (&str, &str, &CommitRecord)> {
        self.projects.iter().flat_map(|project| {
            project.repositories.iter().flat_map(move |repo| {
                repo.commits
                    .iter()
                    .map(move |commit| (project.name.as_str(), repo.name.as_str(), commit))
            })
        })
    }
}
