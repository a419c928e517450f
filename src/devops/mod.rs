//! Hosting service access
//!
//! `DevOpsApi` is the remote capability the exporter depends on: list projects,
//! list repositories, query commits. `AzureDevOpsClient` implements it over
//! the REST API; `CommitQueryService` turns its answers into commit records.

mod client;
mod query;

pub use client::AzureDevOpsClient;
pub use query::{date_minus_one_day, CommitQueryService};

#[cfg(test)]
pub(crate) use query::tests::FakeApi;

use serde::Deserialize;

use crate::error::Result;

/// A project visible to the credential
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProjectRef {
    #[allow(dead_code)]
    pub id: String,
    pub name: String,
}

/// A git repository inside a project
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepositoryRef {
    pub id: String,
    pub name: String,
}

/// Commit search filter; there is no upper date bound
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitCriteria {
    pub author: String,
    pub from_date: String,
}

/// Commit as returned by the commits endpoint
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitCommitRef {
    pub commit_id: String,
    #[serde(default)]
    pub author: Option<GitUserDate>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitUserDate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    #[allow(dead_code)]
    pub email: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

/// List envelope used by every collection endpoint
#[derive(Debug, Deserialize)]
pub(crate) struct ValueList<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
}

/// Remote hosting service operations used by the export
pub trait DevOpsApi {
    fn list_projects(&self) -> Result<Vec<ProjectRef>>;

    fn list_repositories(&self, project: &str) -> Result<Vec<RepositoryRef>>;

    fn get_commits(
        &self,
        project: &str,
        repository_id: &str,
        criteria: &CommitCriteria,
    ) -> Result<Vec<GitCommitRef>>;
}
