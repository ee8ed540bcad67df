//! rackwise: rack-aware bare-metal placement from the command line.
//!
//! Operates on an inventory store under `--data-dir`:
//!
//! ```text
//! rackwise --data-dir /var/lib/rackwise import --file inventory.json
//! rackwise resolve --node <uuid> --network prod
//! rackwise --config rackwise.toml weigh --project p1 --role web \
//!     --workload-class bm.large --host <uuid> --host <uuid>
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rackwise_core::RackwiseConfig;
use rackwise_state::StateStore;
use tracing::debug;

mod commands;

#[derive(Parser)]
#[command(
    name = "rackwise",
    about = "Rack-aware bare-metal placement and network resolution",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Configuration file. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory holding the inventory store.
    #[arg(long, global = true, default_value = "/var/lib/rackwise")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load nodes, ports and instances from a JSON document.
    Import {
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Print the address a node uses on a logical network.
    Resolve {
        /// Node UUID.
        #[arg(long)]
        node: String,
        /// Logical network name, matched against the VLAN tag map.
        #[arg(long)]
        network: String,
    },
    /// Print the node listing (filtered when the inventory filter is on).
    Nodes,
    /// Weigh candidate hosts for one instance of a role.
    Weigh {
        #[command(flatten)]
        request: commands::RequestArgs,
        /// Candidate host UUID (repeatable).
        #[arg(long = "host", required = true)]
        hosts: Vec<String>,
    },
    /// Pick hosts for several instances of a role.
    Place {
        #[command(flatten)]
        request: commands::RequestArgs,
        /// Candidate host UUID (repeatable). All listed nodes when omitted.
        #[arg(long = "host")]
        hosts: Vec<String>,
        /// Number of instances to place.
        #[arg(long, default_value = "1")]
        count: usize,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,rackwise=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => RackwiseConfig::from_file(path)?,
        None => RackwiseConfig::default(),
    };
    debug!(config = ?cli.config, "configuration loaded");

    std::fs::create_dir_all(&cli.data_dir)?;
    let store = StateStore::open(&cli.data_dir.join("rackwise.redb"))?;

    match cli.command {
        Commands::Import { file } => {
            let summary = commands::import::import(&store, &file)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Resolve { node, network } => {
            let inventory = commands::inventory(&store, &config)?;
            let address = commands::resolve::resolve(inventory.as_ref(), &config, &node, &network)?;
            println!("{address}");
        }
        Commands::Nodes => {
            let inventory = commands::inventory(&store, &config)?;
            let nodes = commands::nodes::list(inventory.as_ref())?;
            println!("{}", serde_json::to_string_pretty(&nodes)?);
        }
        Commands::Weigh { request, hosts } => {
            let inventory = commands::inventory(&store, &config)?;
            let report = commands::weigh::weigh(&store, inventory.as_ref(), &request, &hosts)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Place {
            request,
            hosts,
            count,
        } => {
            let inventory = commands::inventory(&store, &config)?;
            let picks = commands::place::place(&store, inventory.as_ref(), &request, &hosts, count)?;
            println!("{}", serde_json::to_string_pretty(&picks)?);
        }
    }

    Ok(())
}
