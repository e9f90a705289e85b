//! Gateway startup binary.
//!
//! Loads the configuration tree, builds the sector registry, derives the
//! listener specifications, and prints the startup tables. The
//! load-balancing layer that accepts connections and drives the
//! [`sector_gateway::RequestRouter`] is an external collaborator; this
//! binary covers everything up to the hand-off.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sector_gateway::config::{ConfigError, ConfigLoader};
use sector_gateway::listeners;
use sector_gateway::modules::{ModuleRegistry, ModuleResolver};
use sector_gateway::registry::Registry;
use sector_gateway::report;
use sector_gateway::routing::RequestRouter;

#[derive(Parser)]
#[command(name = "sector-gateway")]
#[command(about = "Sector registry and listener-spec builder", long_about = None)]
struct Cli {
    /// Root directory holding conf/init.yaml and the sector trees.
    #[arg(long, default_value = "/etc/sector-gateway")]
    root: PathBuf,

    /// Validate the configuration tree and exit without printing the
    /// startup tables.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sector_gateway=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Configuration errors are fatal: log once, exit non-zero, never
    // linger half-initialized.
    if let Err(error) = run(&cli) {
        tracing::error!(%error, "startup failed");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), ConfigError> {
    tracing::info!(root = %cli.root.display(), "sector-gateway starting");

    let loader = ConfigLoader::new(&cli.root);
    let init = loader.load_init()?;

    tracing::info!(
        process_title = %init.process_title,
        policy = %init.load_balancer.policy,
        sectors = init.sector_paths.len(),
        "init document loaded"
    );

    // Worker-side module factories are registered here by the embedding
    // deployment; the bare binary validates configuration with none.
    let resolver = ModuleResolver::new(ModuleRegistry::new());
    let registry = Arc::new(Registry::build(&init, &loader, &resolver)?);

    if cli.check {
        tracing::info!(sectors = registry.len(), "configuration ok");
        return Ok(());
    }

    let specs = listeners::build_listener_specs(&registry);

    println!("{}", report::balancer_table(&init.load_balancer));
    println!("{}", report::sector_table(&registry));

    for spec in &specs {
        tracing::info!(
            protocol = %spec.protocol,
            port = spec.port,
            ssl = spec.ssl.is_some(),
            "listener spec"
        );
    }

    let _router = RequestRouter::new(registry);
    tracing::info!(
        listeners = specs.len(),
        "routing model ready; handing off to the load-balancing layer"
    );
    Ok(())
}
