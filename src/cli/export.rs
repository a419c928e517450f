use std::path::PathBuf;

use crate::aggregate::aggregate;
use crate::config::{self, Config, ExportTarget, FailurePolicy};
use crate::devops::{date_minus_one_day, AzureDevOpsClient, CommitQueryService, DevOpsApi};
use crate::display;
use crate::error::{ExportError, Result};
use crate::export::{to_csv_string, write_csv_file};
use crate::logging;
use crate::storage::{self, ObjectStore, S3Target};

/// Command-line overrides for an export run
#[derive(Debug, Default)]
pub struct ExportOptions {
    pub config: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub target: Option<ExportTarget>,
    pub dry_run: bool,
    pub strict: bool,
    pub fail_on_upload_error: bool,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
}

impl ExportOptions {
    /// Flags win over file and environment values
    fn apply(&self, config: &mut Config) {
        if let Some(dir) = &self.output_dir {
            config.export.output_dir = dir.clone();
        }
        if let Some(target) = self.target {
            config.export.target = target;
        }
        if self.strict {
            config.export.on_repository_error = FailurePolicy::Fail;
        }
        if self.fail_on_upload_error {
            config.export.fail_on_upload_error = true;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.logging.format = format.clone();
        }
    }
}

/// Resolve settings, start logging and run the export against the hosting service
pub fn run(options: ExportOptions) -> Result<()> {
    let (mut config, rejected) = config::resolve(options.config.as_deref())?;
    options.apply(&mut config);

    logging::init_tracing(&config.logging.level, &config.logging.format)?;
    for message in &rejected {
        tracing::warn!("{}", message);
    }

    // A bad cutoff date must stop the run before anything is queried
    date_minus_one_day(config.azure.date_from()?)?;
    config.azure.author_email()?;

    let client = AzureDevOpsClient::new(
        config.azure.organization_url()?,
        config.azure.personal_token()?,
    )?;

    run_with(&config, &client, storage::connect_s3, options.dry_run)
}

/// Query, report, write and optionally upload
///
/// Missing S3 settings always fail the run; other upload failures only do
/// when `fail_on_upload_error` is set.
pub fn run_with<F>(config: &Config, api: &dyn DevOpsApi, connect: F, dry_run: bool) -> Result<()>
where
    F: FnOnce(&S3Target) -> Result<Box<dyn ObjectStore>>,
{
    let date_from = config.azure.date_from()?;
    date_minus_one_day(date_from)?;
    let author_email = config.azure.author_email()?;

    let service = CommitQueryService::new(api);

    tracing::info!(author = %author_email, from = %date_from, "querying commits");
    let result = aggregate(
        &service,
        author_email,
        date_from,
        config.export.on_repository_error,
    )?;
    if result.is_empty() {
        tracing::info!("no matching commits in any project");
    }

    display::print_tree(&result);

    if dry_run {
        print!("{}", to_csv_string(&result)?);
        return Ok(());
    }

    let path = write_csv_file(&result, &config.export.output_dir, None)?;
    println!("Data saved to {}", path.display());

    if config.export.target == ExportTarget::S3 {
        match storage::upload(&path, &config.s3, connect) {
            Ok(location) => println!("Access to {}", location),
            Err(err @ ExportError::Config(_)) => return Err(err),
            Err(err) if config.export.fail_on_upload_error => return Err(err),
            Err(err) => {
                tracing::error!(error = %err, "Error uploading to S3");
            }
        }
    }

    Ok(())
}
