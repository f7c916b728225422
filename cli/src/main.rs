//! falkor-export: dump a FalkorDB graph to nodes.csv and edges.csv

use anyhow::Context;
use clap::Parser;
use falkor_export::{export_graph, ExportConfig, LabelPolicy};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "falkor-export",
    version,
    about = "Export FalkorDB graph nodes and edges to CSV."
)]
struct Cli {
    /// Name of the graph to export
    graph_name: String,

    /// FalkorDB host
    #[arg(long, default_value = "localhost", env = "FALKORDB_HOST")]
    host: String,

    /// FalkorDB port
    #[arg(long, default_value_t = 6379, env = "FALKORDB_PORT")]
    port: u16,

    /// Directory receiving nodes.csv and edges.csv
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// How to write nodes that carry more than one label
    #[arg(long, value_enum, default_value = "first")]
    label_policy: LabelMode,

    /// Separator used by --label-policy join
    #[arg(long, default_value = falkor_export::DEFAULT_LABEL_SEPARATOR)]
    label_separator: String,

    /// Prefix for property columns, keeping them apart from id/label/type
    #[arg(long)]
    property_prefix: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum LabelMode {
    /// Keep only the first label
    First,
    /// Concatenate all labels
    Join,
    /// One row per label
    Explode,
}

impl Cli {
    fn into_config(self) -> ExportConfig {
        let label_policy = match self.label_policy {
            LabelMode::First => LabelPolicy::First,
            LabelMode::Join => LabelPolicy::Join(self.label_separator),
            LabelMode::Explode => LabelPolicy::Explode,
        };

        ExportConfig {
            host: self.host,
            port: self.port,
            graph: self.graph_name,
            output_dir: self.output_dir,
            label_policy,
            property_prefix: self.property_prefix,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run(Cli::parse()).await {
        tracing::error!("Export failed: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.into_config();
    let summary = export_graph(&config)
        .await
        .with_context(|| format!("exporting graph '{}' from {}:{}", config.graph, config.host, config.port))?;

    println!("✓ Exported {} nodes to {}", summary.nodes, summary.nodes_path.display());
    println!("✓ Exported {} edges to {}", summary.edges, summary.edges_path.display());
    tracing::debug!("Export of '{}' finished", config.graph);
    Ok(())
}
