use clap::{Args, Parser, Subcommand};
use serde_json::to_string_pretty;
use uuid::Uuid;

use geopoi_cli::App;
use geopoi_core::config::Config;
use geopoi_core::telemetry;
use geopoi_core::types::{Coordinate, SearchFilters};
use geopoi_vector::writer::Reindexer;

#[derive(Parser)]
#[command(name = "geopoi", version, about = "Hybrid point-of-interest search")]
struct Cli {
    /// Bypass the result cache.
    #[arg(long, global = true)]
    no_cache: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search POIs by free text and filters
    Search(SearchArgs),
    /// Fetch one POI by id
    Poi { id: Uuid },
    /// Print the category tree
    Categories,
    /// Embed every POI into the vector store
    Reindex {
        #[arg(long, default_value_t = 50)]
        batch_size: usize,
    },
}

#[derive(Args)]
struct SearchArgs {
    query: String,
    #[arg(long = "category")]
    categories: Vec<String>,
    #[arg(long, requires = "lng")]
    lat: Option<f64>,
    #[arg(long, requires = "lat")]
    lng: Option<f64>,
    #[arg(long, default_value_t = 0.0)]
    radius_km: f64,
    #[arg(long, default_value_t = 0)]
    limit: usize,
    #[arg(long, default_value_t = 0)]
    offset: usize,
    #[arg(long, default_value = "")]
    period: String,
}

impl SearchArgs {
    fn filters(&self) -> SearchFilters {
        SearchFilters {
            categories: self.categories.clone(),
            center: self.lat.zip(self.lng).map(|(lat, lng)| Coordinate::new(lat, lng)),
            radius_km: self.radius_km,
            period: self.period.clone(),
            limit: self.limit,
            offset: self.offset,
        }
    }
}

async fn run(cli: Cli, app: &App) -> anyhow::Result<()> {
    match cli.command {
        Commands::Search(args) => {
            let result = app.search.search(&args.query, args.filters()).await?;
            println!("{}", to_string_pretty(&result)?);
        }
        Commands::Poi { id } => println!("{}", to_string_pretty(&app.search.get_by_id(id).await?)?),
        Commands::Categories => println!("{}", to_string_pretty(&app.search.categories().await?)?),
        Commands::Reindex { batch_size } => {
            let Some(engine) = &app.semantic else {
                anyhow::bail!("embedding.enabled is false; nothing to index into");
            };
            let stats = Reindexer::new(app.store.as_ref(), engine).batch_size(batch_size).with_progress(true).run().await?;
            println!("{}", serde_json::json!({ "scanned": stats.scanned, "indexed": stats.indexed }));
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;
    let settings = config.settings()?;
    telemetry::init(&settings.logging);

    let app = App::build(&settings, !cli.no_cache).await?;
    tracing::info!(strategy = ?app.strategy, "geopoi ready");
    let outcome = run(cli, &app).await;
    app.shutdown().await;
    outcome
}
