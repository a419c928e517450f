use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use url::Url;

use super::{
    CommitCriteria, DevOpsApi, GitCommitRef, ProjectRef, RepositoryRef, ValueList,
};
use crate::error::{ExportError, Result};

const API_VERSION: &str = "7.1";

/// REST client for the hosting service
///
/// Authenticates with HTTP Basic auth, empty user name and the personal
/// access token as password. Built once per run and shared by reference.
pub struct AzureDevOpsClient {
    http: Client,
    base_url: Url,
    token: String,
}

impl AzureDevOpsClient {
    pub fn new(organization_url: &str, token: &str) -> Result<Self> {
        let base_url = parse_organization_url(organization_url)?;
        let http = Client::builder()
            .user_agent(concat!("commit-export/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            token: token.to_string(),
        })
    }

    /// Build `{base}/{segments...}?{query}&api-version=7.1`
    fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ExportError::Config(format!(
                    "organization url cannot be used as a base: {}",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        url.query_pairs_mut()
            .extend_pairs(query)
            .append_pair("api-version", API_VERSION);
        Ok(url)
    }

    fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        tracing::debug!(url = %url, "GET");

        let response = self
            .http
            .get(url.clone())
            .basic_auth("", Some(&self.token))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExportError::Api {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text()?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl DevOpsApi for AzureDevOpsClient {
    fn list_projects(&self) -> Result<Vec<ProjectRef>> {
        let url = self.endpoint(&["_apis", "projects"], &[])?;
        let list: ValueList<ProjectRef> = self.get_json(url)?;
        Ok(list.value)
    }

    fn list_repositories(&self, project: &str) -> Result<Vec<RepositoryRef>> {
        let url = self.endpoint(&[project, "_apis", "git", "repositories"], &[])?;
        let list: ValueList<RepositoryRef> = self.get_json(url)?;
        Ok(list.value)
    }

    fn get_commits(
        &self,
        project: &str,
        repository_id: &str,
        criteria: &CommitCriteria,
    ) -> Result<Vec<GitCommitRef>> {
        let url = self.endpoint(
            &[project, "_apis", "git", "repositories", repository_id, "commits"],
            &[
                ("searchCriteria.author", criteria.author.as_str()),
                ("searchCriteria.fromDate", criteria.from_date.as_str()),
            ],
        )?;
        let list: ValueList<GitCommitRef> = self.get_json(url)?;
        Ok(list.value)
    }
}

/// Accept `dev.azure.com/org`, `https://dev.azure.com/org/` and similar
fn parse_organization_url(url: &str) -> Result<Url> {
    let mut url = url.trim().to_string();

    if !url.starts_with("http://") && !url.starts_with("https://") {
        url = format!("https://{}", url);
    }

    let url = url.trim_end_matches('/');
    Url::parse(url)
        .map_err(|e| ExportError::Config(format!("invalid organization url '{}': {}", url, e)))
}
