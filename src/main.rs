//! Vertex CLI - diagram persistence backend

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use vertex::config::{self, VertexConfig};
use vertex::storage::{Database, SqliteDocumentStore};

#[derive(Parser)]
#[command(name = "vertex")]
#[command(version)]
#[command(about = "Diagram persistence backend - stores schema diagrams and serves them over HTTP")]
#[command(long_about = r#"
Vertex stores database-schema diagrams. Each saved diagram is split into
its tables, relationships, dependencies, areas, custom types, notes and
filter, and reassembled when it is loaded.

Example usage:
  vertex init
  vertex serve --port 8080
  vertex stats --database .vertex/vertex.db
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Path to the config file (defaults to vertex.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// Write a default config file
    Init {
        /// Where to write the config
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Overwrite an existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Show record counts per collection
    Stats {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    config::load_dotenv();

    match cli.command {
        Commands::Serve { config: config_path, port, database } => {
            let mut file_config = config::load_config(config_path.as_deref())?.unwrap_or_default();
            file_config.apply_env()?;

            let mut settings = file_config.resolve();
            if let Some(port) = port {
                settings.port = port;
            }
            if let Some(database) = database {
                settings.database = database;
            }

            config::ensure_db_dir(&settings.database)?;
            vertex::server::start_server(settings).await?;
        }

        Commands::Init { path, force } => {
            let path = path.unwrap_or_else(config::default_config_path);
            let defaults = VertexConfig::with_defaults();
            config::write_config(&path, &defaults, force)?;

            let settings = defaults.resolve();
            config::ensure_db_dir(&settings.database)?;
            println!("✅ Wrote {}", path.display());
            println!("🗄️  Database: {}", settings.database.display());
        }

        Commands::Stats { database } => {
            let database = match database {
                Some(database) => database,
                None => {
                    let mut file_config = config::load_config(None)?.unwrap_or_default();
                    file_config.apply_env()?;
                    file_config.resolve().database
                }
            };
            if !database.exists() {
                anyhow::bail!("no database at {}", database.display());
            }

            let db = Database::open(&database)?;
            let stats = SqliteDocumentStore::new(db.clone()).stats().await?;
            println!("{}", stats);
            db.close()?;
        }
    }

    Ok(())
}
