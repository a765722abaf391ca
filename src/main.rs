use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nav_route::{find_route, EdgeScorer, Graph, PathConverter, RouteServerConfig, RouteService};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "nav-route")]
#[command(version, about = "Edge scoring and path densification for robot route graphs", long_about = None)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start HTTP API server
    Serve {
        /// Graph file (JSON)
        #[arg(long)]
        graph: PathBuf,
        /// Route server config (TOML)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
    /// Find a route between two node ids and print the dense path as JSON
    Route {
        /// Graph file (JSON)
        #[arg(long)]
        graph: PathBuf,
        /// Route server config (TOML)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Start node id
        #[arg(long)]
        from: u32,
        /// Goal node id
        #[arg(long)]
        to: u32,
    },
    /// Validate a config file and list the edge cost functions it builds
    CheckConfig {
        /// Route server config (TOML)
        config: PathBuf,
    },
}

fn init_logging(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("nav_route=info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

fn load_config(path: Option<&Path>) -> Result<RouteServerConfig> {
    match path {
        Some(path) => RouteServerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(RouteServerConfig::default()),
    }
}

fn load_graph(path: &Path) -> Result<Graph> {
    Graph::load(path).with_context(|| format!("loading graph {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    match cli.command {
        Commands::Serve {
            graph,
            config,
            port,
        } => {
            let config = load_config(config.as_deref())?;
            let graph = load_graph(&graph)?;
            let service = RouteService::new(graph, config).context("building route service")?;
            nav_route::run_server(service, port).await?;
        }
        Commands::Route {
            graph,
            config,
            from,
            to,
        } => {
            let config = load_config(config.as_deref())?;
            let graph = load_graph(&graph)?;
            let scorer = EdgeScorer::new(&config.scoring)?;
            let converter = PathConverter::new(config.path_converter())?;

            let route = find_route(&graph, &scorer, from, to)
                .with_context(|| format!("routing {from} -> {to}"))?;
            let path = converter.densify(&graph, &route, None);

            println!("{}", serde_json::to_string_pretty(&path)?);
        }
        Commands::CheckConfig { config } => {
            let config = load_config(Some(&config))?;
            let scorer = EdgeScorer::new(&config.scoring)?;

            println!("route_frame: {}", config.route_frame);
            println!("path_density: {}", config.path_density);
            println!("edge cost functions ({}):", scorer.num_plugins());
            for name in scorer.plugin_names() {
                println!("  - {name}");
            }
        }
    }

    Ok(())
}
