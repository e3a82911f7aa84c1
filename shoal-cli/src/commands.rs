//! CLI command implementations

use std::net::IpAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Subcommand};
use shoal_core::params::{ListParams, SampleParams};
use shoal_core::{Catalog, ResourceRegistry, RuntimeMode, ShoalConfig};
use shoal_sim::CatalogFixture;
use shoal_web::{build_catalog, run_server};
use tracing::info;

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the JSON API server
    Server {
        /// Interface to bind
        #[arg(long)]
        host: Option<IpAddr>,
        /// Port to bind
        #[arg(short, long)]
        port: Option<u16>,
        #[command(flatten)]
        source: CatalogSource,
    },
    /// Print one page of a resource as JSON
    List {
        /// Resource type, e.g. playlists or quiz
        resource: String,
        #[arg(long)]
        page: Option<u64>,
        #[arg(long)]
        limit: Option<u64>,
        /// Sort expression: field or -field
        #[arg(long)]
        sort: Option<String>,
        /// Case-insensitive search over the resource's text fields
        #[arg(long)]
        keyword: Option<String>,
        /// Exact identifier lookup; wins over --keyword
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[command(flatten)]
        source: CatalogSource,
    },
    /// Print one randomized batch of a resource as JSON
    Sample {
        /// Resource type, e.g. videos or flashcard
        resource: String,
        #[arg(short, long)]
        batch_size: Option<i64>,
        #[arg(long)]
        category: Option<String>,
        /// Identifiers already seen; repeat the flag or separate with commas
        #[arg(long, value_delimiter = ',')]
        exclude: Vec<String>,
        #[command(flatten)]
        source: CatalogSource,
    },
    /// Describe the served resource types
    Resources,
    /// Write a synthetic catalog file loadable in production mode
    Generate {
        /// Destination JSON file
        #[arg(short, long)]
        output: PathBuf,
        /// Items per resource type
        #[arg(long, default_value = "200")]
        items: usize,
        /// Seed for a reproducible catalog
        #[arg(long)]
        seed: Option<u64>,
    },
}

/// Where the catalog comes from.
#[derive(Args, Debug, Clone)]
pub struct CatalogSource {
    /// Runtime mode: development generates data, production loads --data
    #[arg(long, value_enum, default_value_t = RuntimeMode::Development)]
    mode: RuntimeMode,
    /// JSON catalog file
    #[arg(long)]
    data: Option<PathBuf>,
}

impl CatalogSource {
    fn apply(&self, config: &mut ShoalConfig) {
        if let Some(path) = &self.data {
            config.storage.data_file = Some(path.clone());
        }
    }
}

impl Commands {
    /// Whether the command keeps running and deserves a trace file.
    pub fn is_long_running(&self) -> bool {
        matches!(self, Commands::Server { .. })
    }
}

/// Handle the CLI command
///
/// # Errors
/// Returns the failure of the command that ran, with context
pub async fn handle_command(command: Commands) -> anyhow::Result<()> {
    let mut config = ShoalConfig::from_env();

    match command {
        Commands::Server { host, port, source } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            source.apply(&mut config);
            run_server(config, source.mode)
                .await
                .context("catalog server failed")
        }
        Commands::List {
            resource,
            page,
            limit,
            sort,
            keyword,
            id,
            category,
            source,
        } => {
            let params = ListParams {
                page: page.map(|p| p.to_string()),
                limit: limit.map(|l| l.to_string()),
                sort,
                keyword,
                id,
                category,
            };
            let catalog = open_catalog(&mut config, &source).await?;
            let page = catalog.list(&resource, params).await?;
            print_json(&page)
        }
        Commands::Sample {
            resource,
            batch_size,
            category,
            exclude,
            source,
        } => {
            let params = SampleParams {
                category,
                batch_size,
                exclude_ids: exclude,
            };
            let catalog = open_catalog(&mut config, &source).await?;
            let batch = catalog.sample(&resource, params).await?;
            print_json(&batch)
        }
        Commands::Resources => {
            let registry = ResourceRegistry::standard();
            let descriptors: Vec<_> = registry.iter().collect();
            print_json(&descriptors)
        }
        Commands::Generate {
            output,
            items,
            seed,
        } => generate_catalog(output, items, seed).await,
    }
}

async fn open_catalog(config: &mut ShoalConfig, source: &CatalogSource) -> anyhow::Result<Catalog> {
    source.apply(config);
    build_catalog(config, source.mode)
        .await
        .context("failed to prepare catalog")
}

async fn generate_catalog(output: PathBuf, items: usize, seed: Option<u64>) -> anyhow::Result<()> {
    let mut fixture = match seed {
        Some(seed) => CatalogFixture::new(seed, items),
        None => CatalogFixture::random(items),
    };
    let catalog = fixture.generate_all();
    let document = serde_json::to_vec_pretty(&catalog)?;
    tokio::fs::write(&output, document)
        .await
        .with_context(|| format!("cannot write {}", output.display()))?;

    info!(
        path = %output.display(),
        items = catalog.values().map(Vec::len).sum::<usize>(),
        "Wrote synthetic catalog"
    );
    Ok(())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
