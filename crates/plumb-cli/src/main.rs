//! Plumb CLI - Validate and repair scenes from the command line

mod commands;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use commands::{checks, collections, fix, run};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "plumb")]
#[command(about = "Scene validation and auto-remediation", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List collections and the categories they cover
    Collections {
        /// Collections TOML file (defaults to the built-in collections)
        #[arg(long)]
        collections: Option<String>,
    },

    /// List the available checks
    Checks {
        /// Only checks belonging to this collection
        #[arg(long)]
        collection: Option<String>,

        /// Collections TOML file
        #[arg(long)]
        collections: Option<String>,
    },

    /// Run discovery against a scene
    Run {
        /// Path to scene file
        scene: String,

        /// Collection to run (defaults to $PLUMB_COLLECTION, then the
        /// configured default)
        #[arg(short, long)]
        collection: Option<String>,

        /// Collections TOML file
        #[arg(long)]
        collections: Option<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Fix errors found in a scene and save it
    Fix {
        /// Path to scene file
        scene: String,

        /// Collection to run
        #[arg(short, long)]
        collection: Option<String>,

        /// Collections TOML file
        #[arg(long)]
        collections: Option<String>,

        /// Errors to fix for selectable checks: "Check Name" for all of its
        /// errors or "Check Name:0,2" for some. Bulk-only checks are always
        /// fixed.
        #[arg(short, long)]
        select: Vec<String>,

        /// Write the fixed scene here instead of over the input
        #[arg(short, long)]
        output: Option<String>,

        /// Report what would be fixed without saving
        #[arg(long)]
        dry_run: bool,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if std::env::var_os("RUST_LOG").is_some() {
        EnvFilter::from_default_env()
    } else {
        match cli.verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Collections { collections } => collections::run(collections.as_deref()),
        Commands::Checks {
            collection,
            collections,
        } => checks::run(collection.as_deref(), collections.as_deref()),
        Commands::Run {
            scene,
            collection,
            collections,
            format,
        } => run::run(run::RunArgs {
            scene,
            collection,
            collections,
            format,
        }),
        Commands::Fix {
            scene,
            collection,
            collections,
            select,
            output,
            dry_run,
            format,
        } => fix::run(fix::FixArgs {
            scene,
            collection,
            collections,
            select,
            output,
            dry_run,
            format,
        }),
    }
}
