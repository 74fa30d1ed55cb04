mod report;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "serpbot-cli")]
#[command(about = "serpbot rank tracking command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// List the websites a client owns
    Websites {
        /// Client username
        #[arg(long)]
        owner: String,
    },
    /// Compute a website's rank trend
    Trend {
        /// Client username the website must belong to
        #[arg(long)]
        owner: String,
        /// Website id
        #[arg(long)]
        website: Uuid,
        /// Search engine (google, bing)
        #[arg(long, default_value = "google")]
        engine: String,
        /// Look-back period (7d, 30d, all)
        #[arg(long, default_value = "30d")]
        period: String,
        /// Print a date-by-keyword table instead of JSON
        #[arg(long)]
        table: bool,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
    /// Load clients, websites, keywords, and rank history from a YAML file
    Seed {
        /// Path to the fixtures file
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("serpbot-cli: run with --help to list commands");
        return Ok(());
    };

    let config = serpbot_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = serpbot_db::PoolConfig::from_app_config(&config);
    let pool = serpbot_db::connect_pool(&config.database_url, pool_config).await?;

    match command {
        Commands::Db { command } => match command {
            DbCommands::Ping => {
                serpbot_db::health_check(&pool).await?;
                println!("database ok");
            }
            DbCommands::Migrate => {
                let applied = serpbot_db::run_migrations(&pool).await?;
                println!("applied {applied} migration(s)");
            }
            DbCommands::Seed { path } => {
                let fixtures = serpbot_core::load_fixtures(&path)?;
                let summary = serpbot_db::seed_fixtures(&pool, &fixtures).await?;
                println!(
                    "seeded {} client(s), {} website(s), {} keyword(s), {} observation(s)",
                    summary.clients, summary.websites, summary.keywords, summary.observations
                );
            }
        },
        Commands::Websites { owner } => report::run_websites(&pool, &owner).await?,
        Commands::Trend {
            owner,
            website,
            engine,
            period,
            table,
        } => {
            report::run_trend(
                &pool,
                &config,
                report::TrendArgs {
                    owner: &owner,
                    website_id: website,
                    engine: &engine,
                    period: &period,
                    table,
                },
            )
            .await?;
        }
    }

    pool.close().await;
    Ok(())
}
