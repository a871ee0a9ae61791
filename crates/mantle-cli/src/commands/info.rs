use crate::errors::CliError;
use crate::println_pad;
use camino::Utf8PathBuf;
use colored::Colorize;
use mantle_mod::{ModData, OptionData};
use miette::Result;
use std::fs;

pub struct InfoArgs {
    pub file_path: String,
}

pub fn info_mod_file(args: InfoArgs) -> Result<()> {
    let path = Utf8PathBuf::from(&args.file_path);
    let content =
        fs::read_to_string(&path).map_err(|_| CliError::FileNotFound { path: path.clone() })?;
    let data: ModData =
        serde_json::from_str(&content).map_err(|source| CliError::parse_error(path, source))?;

    println_pad!(
        "{} {}",
        "📦 Mod:".bright_blue().bold(),
        data.name.bright_cyan().bold()
    );
    if let Some(description) = &data.description {
        println_pad!(
            "{} {}",
            "📝 Description:".bright_yellow(),
            description.bright_white()
        );
    }
    println_pad!(
        "{} {}",
        "🏷️ Intrinsic priority:".bright_green(),
        data.priority.to_string().bright_white().bold()
    );

    println_pad!("\n{}", "🗂️ Contents:".bright_magenta().bold());
    print_option_line("default", &data.default_option, "   ");
    for group in &data.groups {
        println_pad!(
            "   {} {} {}",
            "•".bright_cyan(),
            group.name.bright_cyan().bold(),
            format!("({:?} select, priority {})", group.kind, group.priority).dimmed()
        );
        for option in &group.options {
            print_option_line(&option.name, &option.data, "      ");
        }
    }
    Ok(())
}

fn print_option_line(label: &str, data: &OptionData, indent: &str) {
    println_pad!(
        "{}{} {} {}",
        indent,
        "•".bright_cyan(),
        label.bright_white(),
        format!(
            "({} files, {} swaps, {} patches)",
            data.files.len(),
            data.file_swaps.len(),
            data.manipulations.len()
        )
        .dimmed()
    );
}
