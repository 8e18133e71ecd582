//! Lorebook CLI - Build a searchable knowledge store from game reference data

mod commands;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use commands::ingest::{IngestOptions, Pipeline};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Lorebook - Build a searchable knowledge store from game reference data
#[derive(Parser)]
#[command(name = "lorebook")]
#[command(version)]
#[command(about = "Extract API docs, asset schemas and recipes into a searchable store", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this database file instead of the configured one
    #[arg(long, global = true, env = "LOREBOOK_DATABASE")]
    database: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize Lorebook (create config and database)
    Init,

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Extract scripting API functions from Markdown reference docs
    Api(IngestArgs),

    /// Recover asset schemas from engine source files
    Assets(IngestArgs),

    /// Extract recipes, transformation tables and research trees
    Recipes(IngestArgs),

    /// Show knowledge store statistics
    Stats,

    /// Search the knowledge store
    Search {
        /// Search query
        query: String,

        /// Maximum results
        #[arg(short, long, default_value = "20")]
        limit: i64,

        /// Pass the query to the full-text engine unquoted
        #[arg(long)]
        raw: bool,
    },
}

#[derive(Args)]
struct IngestArgs {
    /// Root directory to scan
    root: String,

    /// Show what would be extracted without writing to the store
    #[arg(long)]
    dry_run: bool,

    /// Source name to file records under (default: from config)
    #[arg(short, long)]
    source: Option<String>,

    /// Source version
    #[arg(long)]
    source_version: Option<String>,

    /// Source URL
    #[arg(long)]
    source_url: Option<String>,

    /// Source description
    #[arg(long)]
    source_description: Option<String>,
}

impl From<IngestArgs> for IngestOptions {
    fn from(args: IngestArgs) -> Self {
        Self {
            root: args.root,
            dry_run: args.dry_run,
            source: args.source,
            source_version: args.source_version,
            source_url: args.source_url,
            source_description: args.source_description,
        }
    }
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Print the config file location
    Path,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., policy.overload)
        key: String,
        /// Value to set
        value: String,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("lorebook=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lorebook=info,warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let database = cli.database.as_deref();

    let result = match cli.command {
        Commands::Init => commands::init::run(database),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => commands::config::show(),
            ConfigCommands::Path => commands::config::path(),
            ConfigCommands::Set { key, value } => commands::config::set(&key, &value),
        },
        Commands::Api(args) => commands::ingest::run(Pipeline::Api, args.into(), database),
        Commands::Assets(args) => commands::ingest::run(Pipeline::Assets, args.into(), database),
        Commands::Recipes(args) => commands::ingest::run(Pipeline::Recipes, args.into(), database),
        Commands::Stats => commands::stats::run(database),
        Commands::Search { query, limit, raw } => {
            commands::search::run(database, &query, limit, raw)
        }
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
