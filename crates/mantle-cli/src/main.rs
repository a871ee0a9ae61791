use clap::builder::{styling::AnsiColor, Styles};
use clap::ColorChoice;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use commands::{
    info_mod_file, list_changed_items, list_conflicts, resolve_paths, set_profile_dir,
    show_config, ChangedItemsArgs, ConflictsArgs, InfoArgs, ResolveArgs,
};
use miette::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;
mod errors;
mod profile;
mod utils;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve virtual game paths through a collection's overlay
    Resolve {
        /// The profile directory to read
        #[arg(short, long)]
        profile: Option<String>,

        /// The collection to resolve with
        #[arg(short, long, default_value = "default")]
        collection: String,

        /// Treat the paths as source files and list the game paths they cover
        #[arg(short, long)]
        reverse: bool,

        /// Paths to resolve; lists every resolved path when omitted
        paths: Vec<String>,
    },
    /// Show conflicts between mods of a collection
    Conflicts {
        /// The profile directory to read
        #[arg(short, long)]
        profile: Option<String>,

        /// The collection to resolve with
        #[arg(short, long, default_value = "default")]
        collection: String,

        /// Only show conflicts involving this mod
        #[arg(short, long = "mod")]
        mod_name: Option<String>,
    },
    /// Print the changed-items index of a collection
    ChangedItems {
        /// The profile directory to read
        #[arg(short, long)]
        profile: Option<String>,

        /// The collection to resolve with
        #[arg(short, long, default_value = "default")]
        collection: String,

        /// Print the raw index as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show information about a mod file
    Info {
        /// The path to the mod JSON file
        #[arg(short, long)]
        file_path: String,
    },
    /// Show or edit the application configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the current configuration
    Show,
    /// Set the default profile directory
    SetProfile { path: String },
}

fn parse_args() -> Args {
    // Configure colored/styled help output
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default())
        .placeholder(AnsiColor::Blue.on_default());

    let matches = Args::command()
        .styles(styles)
        .color(ColorChoice::Auto)
        .get_matches();

    Args::from_arg_matches(&matches).expect("failed to parse arguments")
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "mantle_cli=debug,mantle_overlay=debug,mantle_meta=debug,mantle_mod=debug"
    } else {
        "mantle_cli=info,mantle_overlay=warn,mantle_meta=warn,mantle_mod=warn"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_target(false),
        )
        .init();
}

fn main() -> Result<()> {
    let args = parse_args();
    init_logging(args.verbose);

    match args.command {
        Commands::Resolve {
            profile,
            collection,
            reverse,
            paths,
        } => resolve_paths(ResolveArgs {
            profile,
            collection,
            reverse,
            paths,
        }),
        Commands::Conflicts {
            profile,
            collection,
            mod_name,
        } => list_conflicts(ConflictsArgs {
            profile,
            collection,
            mod_name,
        }),
        Commands::ChangedItems {
            profile,
            collection,
            json,
        } => list_changed_items(ChangedItemsArgs {
            profile,
            collection,
            json,
        }),
        Commands::Info { file_path } => info_mod_file(InfoArgs { file_path }),
        Commands::Config { command } => match command {
            ConfigCommands::Show => show_config(),
            ConfigCommands::SetProfile { path } => set_profile_dir(path),
        },
    }
}
