use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use marquee_sync::config::Config;
use marquee_sync::db::{create_pool, CatalogStore, PgCatalogStore};
use marquee_sync::services::backfill::PosterBackfill;
use marquee_sync::services::ingest::RecentIngest;
use marquee_sync::services::providers::{tmdb::TmdbProvider, MetadataProvider};

#[derive(Parser)]
#[command(name = "marquee-sync")]
#[command(about = "Reconciles the movie catalog against TMDB")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Backfill missing poster paths on existing catalog rows
    Posters {
        /// Compute decisions and counters without writing
        #[arg(long)]
        dry_run: bool,
    },
    /// Ingest recently released movies from the TMDB list endpoints
    Recent {
        /// Compute decisions and counters without writing
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut config = Config::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    let store: Arc<dyn CatalogStore> = Arc::new(PgCatalogStore::new(pool));
    let provider: Arc<dyn MetadataProvider> = Arc::new(TmdbProvider::new(&config)?);

    match cli.command {
        Commands::Posters { dry_run } => {
            config.dry_run |= dry_run;
            let summary = PosterBackfill::new(store, provider, &config).run().await?;
            println!("Done.");
            println!("{summary}");
        }
        Commands::Recent { dry_run } => {
            config.dry_run |= dry_run;
            let summary = RecentIngest::new(store, provider, &config).run().await?;
            println!("Done.");
            println!("{summary}");
        }
    }

    Ok(())
}
