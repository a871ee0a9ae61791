use crate::errors::CliError;
use crate::println_pad;
use crate::profile::Profile;
use crate::utils::effective_profile;
use colored::Colorize;
use mantle_overlay::ConflictRecord;
use miette::Result;

pub struct ConflictsArgs {
    pub profile: Option<String>,
    pub collection: String,
    pub mod_name: Option<String>,
}

pub fn list_conflicts(args: ConflictsArgs) -> Result<()> {
    let root = effective_profile(args.profile);
    let profile = Profile::load(&root)?;
    let cache = profile.build_cache(&args.collection)?;

    let records: Vec<&ConflictRecord> = match &args.mod_name {
        Some(name) => {
            let id = profile
                .find_installed(name)
                .ok_or_else(|| CliError::mod_not_found(name.clone()))?;
            cache.conflicts(id)
        }
        None => cache.all_conflicts().collect(),
    };

    if records.is_empty() {
        println_pad!("{}", "No conflicts.".bright_green().bold());
        return Ok(());
    }

    println_pad!(
        "{} {}",
        "⚔️ Conflicts:".bright_magenta().bold(),
        format!("({})", records.len()).dimmed()
    );
    for record in records {
        let [x, y] = record.mods();
        let verdict = match record.winner() {
            Some(winner) => format!(
                "winner: {}",
                profile.mod_label(winner, &args.collection)
            )
            .bright_green(),
            None => "unresolved (equal priority)".bright_yellow(),
        };
        println_pad!(
            "\n{} {} {} {}",
            profile.mod_label(x, &args.collection).bright_cyan().bold(),
            "vs".dimmed(),
            profile.mod_label(y, &args.collection).bright_cyan().bold(),
            verdict
        );
        for item in record.items() {
            println_pad!("   {} {}", "•".bright_cyan(), item);
        }
    }
    Ok(())
}
