use std::fmt::Write;

use crate::models::ExportResult;

const COMMIT_RULE: &str = "------------------------------";
const REPOSITORY_RULE: &str = "==============================";

/// Render projects, their non-empty repositories and each commit's fields
pub fn render_tree(result: &ExportResult) -> String {
    let mut out = String::new();

    for project in &result.projects {
        let _ = writeln!(out, "Project: {}", project.name);

        for repo in project.repositories.iter().filter(|r| !r.is_empty()) {
            let _ = writeln!(out, "  Repository: {}", repo.name);
            for commit in &repo.commits {
                let _ = writeln!(out, "    Commit ID: {}", commit.commit_id);
                let _ = writeln!(out, "    Author: {}", commit.author);
                let _ = writeln!(out, "    Date: {}", commit.date);
                let _ = writeln!(out, "    Message: {}", commit.message);
                let _ = writeln!(out, "    {}", COMMIT_RULE);
            }
            let _ = writeln!(out, "  {}", REPOSITORY_RULE);
        }
    }

    out
}
