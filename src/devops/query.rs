use chrono::{Duration, NaiveDate};

use super::{CommitCriteria, DevOpsApi, GitCommitRef, ProjectRef};
use crate::error::{ExportError, Result};
use crate::models::{CommitRecord, RepositoryCommits};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Outcome of querying one repository
///
/// Failures carry `ExportError::RemoteQuery`; the caller decides whether
/// they abort the run.
pub type RepositoryQuery = Result<RepositoryCommits>;

/// Return the calendar day before `date` (`YYYY-MM-DD`)
pub fn date_minus_one_day(date: &str) -> Result<String> {
    let parsed = NaiveDate::parse_from_str(date.trim(), DATE_FORMAT)
        .map_err(|e| ExportError::InvalidDateFormat(format!("'{}' ({}), expected YYYY-MM-DD", date, e)))?;

    let previous = parsed
        .checked_sub_signed(Duration::days(1))
        .ok_or_else(|| ExportError::InvalidDateFormat(format!("'{}' is out of range", date)))?;

    Ok(previous.format(DATE_FORMAT).to_string())
}

/// Order commits oldest first
///
/// RFC 3339 dates compare by instant; anything unparseable sorts ahead of
/// them, and equal instants fall back to the raw string.
pub fn sort_commits(commits: &mut [CommitRecord]) {
    commits.sort_by_cached_key(|c| (c.timestamp(), c.date.clone()));
}

/// Commit queries against the hosting service
pub struct CommitQueryService<'a, A: DevOpsApi + ?Sized> {
    api: &'a A,
}

impl<'a, A: DevOpsApi + ?Sized> CommitQueryService<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// All projects visible to the credential
    pub fn list_projects(&self) -> Result<Vec<ProjectRef>> {
        self.api
            .list_projects()
            .map_err(|e| ExportError::ProjectEnumeration(e.to_string()))
    }

    /// Query every repository of `project` for commits by `author_email`
    ///
    /// The search starts one day before `from_date`. Each repository gets its
    /// own result so one failing repository does not hide its siblings.
    pub fn query_commits(
        &self,
        project: &ProjectRef,
        author_email: &str,
        from_date: &str,
    ) -> Result<Vec<RepositoryQuery>> {
        let criteria = CommitCriteria {
            author: author_email.to_string(),
            from_date: date_minus_one_day(from_date)?,
        };

        let repositories = self.api.list_repositories(&project.name).map_err(|e| {
            ExportError::RemoteQuery {
                repository: format!("{}/*", project.name),
                message: e.to_string(),
            }
        })?;

        let mut results = Vec::with_capacity(repositories.len());
        for repo in repositories {
            let outcome = self
                .api
                .get_commits(&project.name, &repo.id, &criteria)
                .map(|raw| {
                    let mut commits: Vec<CommitRecord> =
                        raw.into_iter().map(to_commit_record).collect();
                    sort_commits(&mut commits);
                    RepositoryCommits::new(repo.name.clone(), commits)
                })
                .map_err(|e| ExportError::RemoteQuery {
                    repository: repo.name.clone(),
                    message: e.to_string(),
                });

            if let Ok(repo_commits) = &outcome {
                tracing::debug!(
                    project = %project.name,
                    repository = %repo.name,
                    commits = repo_commits.commits.len(),
                    "queried repository"
                );
            }
            results.push(outcome);
        }

        Ok(results)
    }
}

fn to_commit_record(commit: GitCommitRef) -> CommitRecord {
    let author = commit.author.unwrap_or_default();
    CommitRecord {
        commit_id: commit.commit_id,
        author: author.name.unwrap_or_default(),
        date: author.date.unwrap_or_default(),
        message: commit.comment.unwrap_or_default(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::devops::{GitUserDate, RepositoryRef};
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// In-memory hosting service
    #[derive(Default)]
    pub(crate) struct FakeApi {
        pub projects: Vec<ProjectRef>,
        pub repositories: HashMap<String, Vec<RepositoryRef>>,
        pub commits: HashMap<String, Vec<GitCommitRef>>,
        pub failing_repositories: Vec<String>,
        pub failing_projects: Vec<String>,
        pub fail_enumeration: bool,
        pub seen_criteria: RefCell<Vec<CommitCriteria>>,
    }

    impl FakeApi {
        pub fn project(mut self, name: &str, repos: &[&str]) -> Self {
            self.projects.push(ProjectRef {
                id: format!("id-{}", name),
                name: name.to_string(),
            });
            self.repositories.insert(
                name.to_string(),
                repos
                    .iter()
                    .map(|r| RepositoryRef {
                        id: format!("id-{}", r),
                        name: r.to_string(),
                    })
                    .collect(),
            );
            self
        }

        pub fn commit(mut self, repo: &str, id: &str, date: &str, message: &str) -> Self {
            self.commits
                .entry(format!("id-{}", repo))
                .or_default()
                .push(GitCommitRef {
                    commit_id: id.to_string(),
                    author: Some(GitUserDate {
                        name: Some("J. Doe".to_string()),
                        email: Some("jdoe@example.com".to_string()),
                        date: Some(date.to_string()),
                    }),
                    comment: Some(message.to_string()),
                });
            self
        }

        pub fn failing(mut self, repo: &str) -> Self {
            self.failing_repositories.push(format!("id-{}", repo));
            self
        }
    }

    impl DevOpsApi for FakeApi {
        fn list_projects(&self) -> Result<Vec<ProjectRef>> {
            if self.fail_enumeration {
                return Err(ExportError::Api {
                    status: 401,
                    url: "https://dev.azure.com/acme/_apis/projects".to_string(),
                });
            }
            Ok(self.projects.clone())
        }

        fn list_repositories(&self, project: &str) -> Result<Vec<RepositoryRef>> {
            if self.failing_projects.iter().any(|p| p == project) {
                return Err(ExportError::Api {
                    status: 503,
                    url: format!("https://dev.azure.com/acme/{}", project),
                });
            }
            Ok(self.repositories.get(project).cloned().unwrap_or_default())
        }

        fn get_commits(
            &self,
            _project: &str,
            repository_id: &str,
            criteria: &CommitCriteria,
        ) -> Result<Vec<GitCommitRef>> {
            self.seen_criteria.borrow_mut().push(criteria.clone());
            if self.failing_repositories.iter().any(|r| r == repository_id) {
                return Err(ExportError::Api {
                    status: 500,
                    url: format!("https://dev.azure.com/acme/{}", repository_id),
                });
            }
            Ok(self.commits.get(repository_id).cloned().unwrap_or_default())
        }
    }

    fn record(id: &str, date: &str) -> CommitRecord {
        CommitRecord {
            commit_id: id.to_string(),
            author: "J. Doe".to_string(),
            date: date.to_string(),
            message: String::new(),
        }
    }

    #[test]
    fn test_date_minus_one_day() {
        assert_eq!(date_minus_one_day("2024-01-05").unwrap(), "2024-01-04");
        assert_eq!(date_minus_one_day("2024-01-01").unwrap(), "2023-12-31");
    }

    #[test]
    fn test_date_minus_one_day_leap_year() {
        assert_eq!(date_minus_one_day("2024-03-01").unwrap(), "2024-02-29");
        assert_eq!(date_minus_one_day("2023-03-01").unwrap(), "2023-02-28");
    }

    #[test]
    fn test_date_minus_one_day_is_exactly_one_day() {
        let mut day = NaiveDate::from_ymd_opt(2023, 12, 25).unwrap();
        for _ in 0..100 {
            let input = day.format(DATE_FORMAT).to_string();
            let output = date_minus_one_day(&input).unwrap();
            let back = NaiveDate::parse_from_str(&output, DATE_FORMAT).unwrap();
            let seconds = day.and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp()
                - back.and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp();
            assert_eq!(seconds, 86_400);
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_date_minus_one_day_invalid() {
        for input in ["2024/01/05", "05-01-2024", "2024-02-30", "", "yesterday"] {
            match date_minus_one_day(input) {
                Err(ExportError::InvalidDateFormat(_)) => {}
                other => panic!("expected InvalidDateFormat for {:?}, got {:?}", input, other),
            }
        }
    }

    #[test]
    fn test_sort_commits_by_instant() {
        let mut commits = vec![
            record("late", "2024-01-05T10:00:00Z"),
            // Same day, earlier instant once the offset is applied
            record("offset", "2024-01-05T11:00:00+02:00"),
            record("early", "2024-01-01T00:00:00Z"),
        ];
        sort_commits(&mut commits);

        let ids: Vec<_> = commits.iter().map(|c| c.commit_id.as_str()).collect();
        assert_eq!(ids, vec!["early", "offset", "late"]);
    }

    #[test]
    fn test_sort_commits_unparseable_first() {
        let mut commits = vec![
            record("parsed", "2024-01-01T00:00:00Z"),
            record("b", "not a date b"),
            record("a", "not a date a"),
        ];
        sort_commits(&mut commits);

        let ids: Vec<_> = commits.iter().map(|c| c.commit_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "parsed"]);
    }

    #[test]
    fn test_query_commits_widens_date_and_sorts() {
        let api = FakeApi::default()
            .project("ProjA", &["repo1"])
            .commit("repo1", "second", "2024-01-06T09:00:00Z", "second")
            .commit("repo1", "first", "2024-01-05T10:00:00Z", "fix bug");
        let service = CommitQueryService::new(&api);
        let project = api.projects[0].clone();

        let results = service
            .query_commits(&project, "jdoe@example.com", "2024-03-01")
            .unwrap();

        assert_eq!(results.len(), 1);
        let repo = results[0].as_ref().unwrap();
        assert_eq!(repo.name, "repo1");
        assert_eq!(repo.commits[0].commit_id, "first");
        assert_eq!(repo.commits[0].author, "J. Doe");
        assert_eq!(repo.commits[0].message, "fix bug");
        assert_eq!(repo.commits[1].commit_id, "second");

        let criteria = api.seen_criteria.borrow();
        assert_eq!(criteria[0].from_date, "2024-02-29");
        assert_eq!(criteria[0].author, "jdoe@example.com");
    }

    #[test]
    fn test_query_commits_isolates_failing_repository() {
        let api = FakeApi::default()
            .project("ProjA", &["broken", "ok"])
            .commit("ok", "abc", "2024-01-05T10:00:00Z", "msg")
            .failing("broken");
        let service = CommitQueryService::new(&api);
        let project = api.projects[0].clone();

        let results = service
            .query_commits(&project, "jdoe@example.com", "2024-01-01")
            .unwrap();

        assert_eq!(results.len(), 2);
        match &results[0] {
            Err(ExportError::RemoteQuery { repository, .. }) => assert_eq!(repository, "broken"),
            other => panic!("expected RemoteQuery, got {:?}", other),
        }
        assert_eq!(results[1].as_ref().unwrap().commits.len(), 1);
    }

    #[test]
    fn test_query_commits_invalid_date_queries_nothing() {
        let api = FakeApi::default().project("ProjA", &["repo1"]);
        let service = CommitQueryService::new(&api);
        let project = api.projects[0].clone();

        let result = service.query_commits(&project, "jdoe@example.com", "2024-13-01");
        assert!(matches!(result, Err(ExportError::InvalidDateFormat(_))));
        assert!(api.seen_criteria.borrow().is_empty());
    }

    #[test]
    fn test_list_projects_failure_is_enumeration_error() {
        let api = FakeApi {
            fail_enumeration: true,
            ..Default::default()
        };
        let service = CommitQueryService::new(&api);

        let err = service.list_projects().unwrap_err();
        assert!(matches!(err, ExportError::ProjectEnumeration(_)));
        assert!(err.to_string().contains("401"));
    }

    #[test]
    fn test_missing_author_fields_become_empty() {
        let record = to_commit_record(GitCommitRef {
            commit_id: "abc".to_string(),
            author: None,
            comment: None,
        });
        assert_eq!(record.author, "");
        assert_eq!(record.date, "");
        assert_eq!(record.message, "");
    }
}
