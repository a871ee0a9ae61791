use crate::errors::CliError;
use crate::utils::config;
use camino::Utf8PathBuf;
use colored::Colorize;
use miette::Result;

pub fn show_config() -> Result<()> {
    let cfg = config::load_config();
    let config_path = config::default_config_path()
        .map(|path| path.to_string())
        .unwrap_or_else(|| "Unknown".to_string());

    println!();
    println!("  {} {}", "config_file:".bright_white(), config_path);
    match cfg.profile_dir.as_ref() {
        Some(path) => {
            let status = if path.is_dir() {
                "✓".bright_green()
            } else {
                "✗".bright_red()
            };
            println!("  {} {} {}", "profile_dir:".bright_white(), path, status);
        }
        None => println!(
            "  {} {}",
            "profile_dir:".bright_white(),
            "(not set)".bright_yellow()
        ),
    }
    println!();
    Ok(())
}

pub fn set_profile_dir(path: String) -> Result<()> {
    let path = Utf8PathBuf::from(path);
    if !path.is_dir() {
        return Err(CliError::ProfileNotFound { path }.into());
    }

    let mut cfg = config::load_config();
    cfg.profile_dir = Some(path.clone());
    config::save_config(&cfg).map_err(|e| miette::miette!("Failed to save config: {}", e))?;

    println!(
        "{} {}",
        "✓ Default profile set to".bright_green(),
        path.as_str().bright_cyan()
    );
    Ok(())
}
