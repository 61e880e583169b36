use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod crawl;
mod reception;

#[derive(Debug, Parser)]
#[command(name = "ficdb-cli")]
#[command(about = "FICDB reception pipeline command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database utilities
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Review crawling
    Crawl {
        #[command(subcommand)]
        command: crawl::CrawlCommands,
    },
    /// Reception analysis
    Analyze {
        #[command(subcommand)]
        command: reception::AnalyzeCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Verify database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ficdb_core::load_app_config()?;
    init_tracing(&config.log_level);
    tracing::debug!(?config, "configuration loaded");

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Db { command }) => run_db_command(&config, command).await,
        Some(Commands::Crawl { command }) => crawl::run(&config, command).await,
        Some(Commands::Analyze { command }) => reception::run(&config, command).await,
        None => {
            println!("ficdb-cli: pass a subcommand (db, crawl, analyze); see --help");
            Ok(())
        }
    }
}

fn init_tracing(log_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run_db_command(
    config: &ficdb_core::AppConfig,
    command: DbCommands,
) -> anyhow::Result<()> {
    let pool = connect_pool(config).await?;
    match command {
        DbCommands::Ping => {
            ficdb_db::ping(&pool).await?;
            println!("database connection ok");
        }
        DbCommands::Migrate => {
            let applied = ficdb_db::run_migrations(&pool).await?;
            println!("applied {applied} migrations");
        }
    }
    Ok(())
}

async fn connect_pool(config: &ficdb_core::AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = ficdb_db::PoolConfig {
        max_connections: config.db_max_connections,
        min_connections: config.db_min_connections,
        acquire_timeout_secs: config.db_acquire_timeout_secs,
    };
    let pool = ficdb_db::connect_pool(&config.database_url, pool_config).await?;
    Ok(pool)
}
