mod query;
mod refresh;
mod seed;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "trendwatch-cli")]
#[command(about = "Trendwatch command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply migrations and load the bundled seed trends
    InitAndSeed,
    /// Fetch fresh interest series for every stored trend
    RefreshTrends,
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// List stored trends
    List {
        /// Case-insensitive category substring
        #[arg(long)]
        category: Option<String>,
    },
    /// Show one trend with its interest series
    Show { id: i64 },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("trendwatch-cli: no command given; run with --help for usage");
        return Ok(());
    };

    let config = trendwatch_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = trendwatch_db::PoolConfig::from_app_config(&config);
    let pool = trendwatch_db::connect_pool(&config.database_url, pool_config).await?;

    match command {
        Commands::InitAndSeed => seed::run_init_and_seed(&pool, &config).await?,
        Commands::RefreshTrends => refresh::run_refresh_trends(&pool, &config).await?,
        Commands::Db {
            command: DbCommands::Ping,
        } => {
            trendwatch_db::health_check(&pool).await?;
            println!("database ok");
        }
        Commands::Db {
            command: DbCommands::Migrate,
        } => {
            let applied = trendwatch_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
        Commands::List { category } => query::run_list(&pool, category.as_deref()).await?,
        Commands::Show { id } => query::run_show(&pool, id).await?,
    }

    pool.close().await;
    Ok(())
}
