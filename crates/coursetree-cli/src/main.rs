//! coursetree CLI: browse a course repository and judge its exercises.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "coursetree", version, about = "Course content tree and exercise judge")]
struct Cli {
    /// Settings file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Course repository root (overrides the configured one)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the content tree
    Tree {
        /// Only follow links carrying one of these tags (comma-separated)
        #[arg(long)]
        tags: Option<String>,

        /// Follow every link, including those hidden by default
        #[arg(long, conflicts_with = "tags")]
        all: bool,
    },

    /// Print the documentation of a leaf
    Show {
        /// Comma-separated tree path of an exercise or explanation
        path: String,
    },

    /// Check that topics are introduced before they are used
    Check,

    /// List the topics each node introduces and requires
    Topics,

    /// Judge exercises and cache the verdicts
    Judge {
        /// Comma-separated tree path of the subtree to judge (default: everything)
        path: Option<String>,

        /// Skip exercises that already have a cached verdict
        #[arg(long)]
        only_unknown: bool,
    },

    /// Show cached judgments
    Status,

    /// Manage the judgment cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Create a starter settings file and course
    Init,
}

#[derive(Subcommand)]
enum CacheAction {
    /// Print the location of the cache file
    Path,
    /// Delete the cache file
    Clear,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("coursetree=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let options = commands::GlobalOptions {
        config: cli.config,
        root: cli.root,
    };

    let result = match cli.command {
        Commands::Tree { tags, all } => commands::tree::execute(&options, tags, all),
        Commands::Show { path } => commands::show::execute(&options, &path),
        Commands::Check => commands::check::execute(&options),
        Commands::Topics => commands::topics::execute(&options),
        Commands::Judge { path, only_unknown } => {
            commands::judge::execute(&options, path, only_unknown).await
        }
        Commands::Status => commands::status::execute(&options),
        Commands::Cache { action } => match action {
            CacheAction::Path => commands::cache::path(&options),
            CacheAction::Clear => commands::cache::clear(&options),
        },
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
