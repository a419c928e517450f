//! Result aggregation
//!
//! Walks every project, collects its repositories' commits and keeps only
//! projects with at least one matching commit.

use crate::config::FailurePolicy;
use crate::devops::{CommitQueryService, DevOpsApi, ProjectRef};
use crate::error::{ExportError, Result};
use crate::models::{ExportResult, ProjectExport, RepositoryCommits};

/// Collect commits by `author_email` since `from_date` across all projects
///
/// Project enumeration and date errors are always fatal. Repository-level
/// failures follow `policy`.
pub fn aggregate<A: DevOpsApi + ?Sized>(
    service: &CommitQueryService<'_, A>,
    author_email: &str,
    from_date: &str,
    policy: FailurePolicy,
) -> Result<ExportResult> {
    let projects = service.list_projects()?;
    tracing::info!(projects = projects.len(), "enumerated projects");

    let mut result = ExportResult::default();
    for project in &projects {
        let export = collect_project(service, project, author_email, from_date, policy)?;

        if export.has_commits() {
            tracing::info!(
                project = %export.name,
                commits = export.commit_count(),
                "project has matching commits"
            );
            result.projects.push(export);
        } else {
            tracing::debug!(project = %project.name, "no matching commits, dropping project");
        }
    }

    Ok(result)
}

/// Build one project's export, applying `policy` to failed repositories
pub fn collect_project<A: DevOpsApi + ?Sized>(
    service: &CommitQueryService<'_, A>,
    project: &ProjectRef,
    author_email: &str,
    from_date: &str,
    policy: FailurePolicy,
) -> Result<ProjectExport> {
    let mut export = ProjectExport::new(project.name.clone());

    let outcomes = match service.query_commits(project, author_email, from_date) {
        Ok(outcomes) => outcomes,
        Err(err @ ExportError::RemoteQuery { .. }) if policy == FailurePolicy::Skip => {
            tracing::warn!(project = %project.name, error = %err, "skipping project");
            return Ok(export);
        }
        Err(err) => return Err(err),
    };

    for outcome in outcomes {
        match outcome {
            Ok(repo) => export.repositories.push(repo),
            Err(ExportError::RemoteQuery {
                repository,
                message,
            }) if policy == FailurePolicy::Skip => {
                tracing::warn!(
                    project = %project.name,
                    repository = %repository,
                    error = %message,
                    "error fetching commits, treating repository as empty"
                );
                export
                    .repositories
                    .push(RepositoryCommits::new(repository, Vec::new()));
            }
            Err(err) => return Err(err),
        }
    }

    Ok(export)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devops::FakeApi;

    #[test]
    fn test_aggregate_keeps_projects_with_commits() {
        let api = FakeApi::default()
            .project("ProjA", &["repo1", "repo2"])
            .project("ProjB", &["empty1", "empty2"])
            .commit("repo1", "abc123", "2024-01-05T10:00:00Z", "fix bug");
        let service = CommitQueryService::new(&api);

        let result = aggregate(&service, "jdoe@example.com", "2024-01-01", FailurePolicy::Skip)
            .unwrap();

        assert_eq!(result.projects.len(), 1);
        let project = &result.projects[0];
        assert_eq!(project.name, "ProjA");
        // Empty sibling repositories stay inside a kept project
        assert_eq!(project.repositories.len(), 2);
        assert_eq!(project.repositories[0].commits[0].commit_id, "abc123");
        assert!(project.repositories[1].is_empty());
    }

    #[test]
    fn test_aggregate_never_keeps_empty_projects() {
        let api = FakeApi::default()
            .project("A", &["a1"])
            .project("B", &["b1"])
            .project("C", &[])
            .project("D", &["d1"])
            .commit("a1", "1", "2024-01-05T10:00:00Z", "m")
            .commit("d1", "2", "2024-01-05T10:00:00Z", "m");
        let service = CommitQueryService::new(&api);

        let result = aggregate(&service, "jdoe@example.com", "2024-01-01", FailurePolicy::Skip)
            .unwrap();

        let names: Vec<_> = result.projects.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["A", "D"]);
        assert!(result.projects.iter().all(|p| p.has_commits()));
    }

    #[test]
    fn test_skip_policy_treats_failure_as_empty() {
        let api = FakeApi::default()
            .project("ProjA", &["broken", "ok"])
            .project("ProjB", &["other"])
            .commit("ok", "abc", "2024-01-05T10:00:00Z", "m")
            .commit("other", "def", "2024-01-06T10:00:00Z", "m")
            .failing("broken");
        let service = CommitQueryService::new(&api);

        let result = aggregate(&service, "jdoe@example.com", "2024-01-01", FailurePolicy::Skip)
            .unwrap();

        assert_eq!(result.projects.len(), 2);
        let broken = &result.projects[0].repositories[0];
        assert_eq!(broken.name, "broken");
        assert!(broken.is_empty());
    }

    #[test]
    fn test_fail_policy_propagates() {
        let api = FakeApi::default()
            .project("ProjA", &["broken", "ok"])
            .commit("ok", "abc", "2024-01-05T10:00:00Z", "m")
            .failing("broken");
        let service = CommitQueryService::new(&api);

        let err = aggregate(&service, "jdoe@example.com", "2024-01-01", FailurePolicy::Fail)
            .unwrap_err();
        assert!(matches!(err, ExportError::RemoteQuery { .. }));
    }

    #[test]
    fn test_repository_listing_failure_skips_project() {
        let mut api = FakeApi::default()
            .project("Down", &["x"])
            .project("Up", &["y"])
            .commit("x", "1", "2024-01-05T10:00:00Z", "m")
            .commit("y", "2", "2024-01-05T10:00:00Z", "m");
        api.failing_projects.push("Down".to_string());
        let service = CommitQueryService::new(&api);

        let result = aggregate(&service, "jdoe@example.com", "2024-01-01", FailurePolicy::Skip)
            .unwrap();
        let names: Vec<_> = result.projects.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Up"]);
    }

    #[test]
    fn test_enumeration_failure_is_fatal() {
        let api = FakeApi {
            fail_enumeration: true,
            ..Default::default()
        };
        let service = CommitQueryService::new(&api);

        let err = aggregate(&service, "jdoe@example.com", "2024-01-01", FailurePolicy::Skip)
            .unwrap_err();
        assert!(matches!(err, ExportError::ProjectEnumeration(_)));
    }

    #[test]
    fn test_invalid_date_is_fatal_under_skip() {
        let api = FakeApi::default().project("ProjA", &["repo1"]);
        let service = CommitQueryService::new(&api);

        let err = aggregate(&service, "jdoe@example.com", "01/01/2024", FailurePolicy::Skip)
            .unwrap_err();
        assert!(matches!(err, ExportError::InvalidDateFormat(_)));
    }
}
