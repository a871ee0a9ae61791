use crate::errors::CliError;
use crate::println_pad;
use crate::profile::Profile;
use crate::utils::effective_profile;
use colored::Colorize;
use mantle_mod::{GamePath, SourcePath};
use miette::Result;

pub struct ResolveArgs {
    pub profile: Option<String>,
    pub collection: String,
    pub reverse: bool,
    pub paths: Vec<String>,
}

pub fn resolve_paths(args: ResolveArgs) -> Result<()> {
    let root = effective_profile(args.profile);
    let profile = Profile::load(&root)?;
    let cache = profile.build_cache(&args.collection)?;

    println_pad!(
        "{} {} {}",
        "🗂️ Collection:".bright_blue().bold(),
        args.collection.bright_cyan().bold(),
        format!("({} paths resolved)", cache.resolved().len()).dimmed()
    );

    if args.reverse {
        for raw in &args.paths {
            let source = SourcePath::from(raw.as_str());
            let covered = cache.reverse_resolve(&source);
            if covered.is_empty() {
                println_pad!("{} {}", raw.bright_cyan(), "(covers nothing)".dimmed());
                continue;
            }
            println_pad!("{}", raw.bright_cyan());
            for path in covered {
                println_pad!("   {} {}", "•".bright_cyan(), path.as_str().bright_white());
            }
        }
        return Ok(());
    }

    if args.paths.is_empty() {
        let mut entries: Vec<_> = cache.resolved().iter().collect();
        entries.sort_by(|a, b| a.0.as_str().cmp(b.0.as_str()));
        for (path, file) in entries {
            println_pad!(
                "{} {} {} {}",
                path.as_str().bright_cyan(),
                "->".dimmed(),
                file.source.as_str().bright_white(),
                format!("[{}]", profile.mod_label(file.owner, &args.collection)).dimmed()
            );
        }
        return Ok(());
    }

    for raw in &args.paths {
        let path =
            GamePath::new(raw).map_err(|_| CliError::invalid_game_path(raw.clone()))?;
        match cache.resolve_path(&path) {
            Some(source) => println_pad!(
                "{} {} {}",
                path.as_str().bright_cyan(),
                "->".dimmed(),
                source.as_str().bright_white()
            ),
            None => println_pad!("{} {}", path.as_str().bright_cyan(), "(unchanged)".dimmed()),
        }
    }
    Ok(())
}
