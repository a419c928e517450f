use crate::config;
use crate::error::Result;
use std::path::PathBuf;

/// Initialize commit-export.toml configuration file
pub fn init(path: Option<PathBuf>) -> Result<()> {
    let config_path = path.unwrap_or_else(|| PathBuf::from("commit-export.toml"));

    if config_path.exists() {
        eprintln!(
            "Configuration file already exists at: {}",
            config_path.display()
        );
        eprintln!("Remove it first if you want to reinitialize.");
        return Ok(());
    }

    config::write_template(&config_path)?;

    println!("Configuration file created: {}", config_path.display());
    println!("\nNext steps:");
    println!(
        "1. Edit {} or set AZURE_ORGANIZATION_URL, AZURE_PERSONAL_TOKEN, GIT_AUTHOR_EMAIL and GIT_DATE_FROM",
        config_path.display()
    );
    println!(
        "2. Run 'commit-export export --config {}'",
        config_path.display()
    );

    Ok(())
}
