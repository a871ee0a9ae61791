use crate::println_pad;
use crate::profile::Profile;
use crate::utils::effective_profile;
use colored::Colorize;
use mantle_meta::MetaIdentifier;
use mantle_mod::GamePath;
use mantle_overlay::{ChangedItemValue, ItemIdentifier};
use miette::{IntoDiagnostic, Result};

pub struct ChangedItemsArgs {
    pub profile: Option<String>,
    pub collection: String,
    pub json: bool,
}

/// Names changed items after the final path segment. Hosts with access to
/// real game data plug richer identifiers into the library; on the command
/// line the file name is the most useful stand-in.
struct FileNameIdentifier;

impl ItemIdentifier for FileNameIdentifier {
    fn identify_path(
        &self,
        path: &GamePath,
    ) -> mantle_overlay::Result<Vec<(String, ChangedItemValue)>> {
        let name = path.as_str().rsplit('/').next().unwrap_or(path.as_str());
        Ok(vec![(name.to_string(), ChangedItemValue::Counter(1))])
    }

    fn identify_manipulation(
        &self,
        identifier: &MetaIdentifier,
    ) -> mantle_overlay::Result<Vec<(String, ChangedItemValue)>> {
        Ok(vec![(identifier.to_string(), ChangedItemValue::Counter(1))])
    }
}

pub fn list_changed_items(args: ChangedItemsArgs) -> Result<()> {
    let root = effective_profile(args.profile);
    let profile = Profile::load(&root)?;
    let mut cache = profile.build_cache(&args.collection)?;
    let items = cache.changed_items(&FileNameIdentifier);

    if args.json {
        println!("{}", serde_json::to_string_pretty(items).into_diagnostic()?);
        return Ok(());
    }

    if items.is_empty() {
        println_pad!("{}", "No changed items.".bright_green().bold());
        return Ok(());
    }

    println_pad!(
        "{} {}",
        "🧾 Changed items:".bright_magenta().bold(),
        format!("({})", items.len()).dimmed()
    );
    for (name, item) in items.iter() {
        let value = match &item.value {
            ChangedItemValue::Counter(count) => format!("{count} changes"),
            ChangedItemValue::Label(label) => label.clone(),
        };
        let mods = item
            .mods
            .iter()
            .map(|id| profile.mod_label(*id, &args.collection))
            .collect::<Vec<_>>()
            .join(", ");
        println_pad!(
            "{} {} {} {}",
            "•".bright_cyan(),
            name.bright_white().bold(),
            value.dimmed(),
            format!("[{mods}]").bright_cyan()
        );
    }
    Ok(())
}
