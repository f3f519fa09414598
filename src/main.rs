use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use relgraph::graph::{load_dataset, save_dataset};
use relgraph::{Config, Dataset, Equality, MetricOptions, RelationGraph};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "relgraph")]
#[command(about = "Query a relationship dataset (JSON array of [node, [targets...]] pairs)")]
struct Args {
    /// Dataset file (overrides relgraph.dataset_path; with no config file,
    /// defaults are used)
    #[arg(short, long, global = true)]
    dataset: Option<PathBuf>,

    /// Treat nodes that differ only in ASCII case as the same node
    #[arg(short, long, global = true)]
    ignore_case: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Node, edge and cluster counts
    Stats,
    /// Nodes reachable from a node
    From {
        node: String,
        /// Hops to follow; omit for the configured default
        #[arg(long)]
        depth: Option<usize>,
    },
    /// Minimum hops between two nodes
    Depth { source: String, target: String },
    /// Weakly connected clusters, one per line
    Clusters,
    /// In-degree weight per node
    Weights(MetricArgs),
    /// Reachable-children count per node
    Entries(MetricArgs),
    /// Merge another dataset file into the configured dataset and save it
    Merge { other: PathBuf },
}

#[derive(ClapArgs, Debug)]
struct MetricArgs {
    #[arg(long)]
    log: bool,
    #[arg(long)]
    normalize: bool,
    #[arg(long)]
    to_scale: bool,
}

impl MetricArgs {
    /// Flags given on the command line win over the `[query]` defaults.
    fn resolve(&self, defaults: MetricOptions) -> MetricOptions {
        MetricOptions {
            log: self.log || defaults.log,
            normalize: self.normalize || self.to_scale || defaults.normalize,
            to_scale: self.to_scale || defaults.to_scale,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = match &args.dataset {
        Some(path) if !Config::config_path().exists() => Config::for_dataset(path.clone()),
        _ => Config::load()?,
    };

    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", config.relgraph.log_level.as_str())
    ).init();

    let dataset_path = args
        .dataset
        .clone()
        .unwrap_or_else(|| config.dataset_path().to_path_buf());
    let equality = if args.ignore_case || config.relgraph.ignore_case {
        Equality::structural(|a: &String, b: &String| a.eq_ignore_ascii_case(b))
    } else {
        Equality::strict()
    };

    let dataset: Dataset<String> = load_dataset(&dataset_path)
        .with_context(|| format!("Failed to load dataset: {}", dataset_path.display()))?;
    let mut graph = RelationGraph::with_dataset(dataset, equality);
    log::info!(
        "Loaded {} ({} sources, {} edges)",
        dataset_path.display(),
        graph.len(),
        graph.edge_count()
    );

    match args.command {
        Command::Stats => {
            println!("Nodes:    {}", graph.nodes().len());
            println!("Sources:  {}", graph.len());
            println!("Edges:    {}", graph.edge_count());
            println!("Clusters: {}", graph.clusters().len());
        }
        Command::From { node, depth } => {
            let depth = depth.or_else(|| config.default_depth());
            for reached in graph.subgraph(&node, depth).nodes() {
                println!("{}", reached);
            }
        }
        Command::Depth { source, target } => {
            println!("{}", graph.depth(&source, &target, false));
        }
        Command::Clusters => {
            for cluster in graph.clusters() {
                println!("{}", cluster.join(", "));
            }
        }
        Command::Weights(metric) => {
            let values = graph.weights(metric.resolve(config.metric_options()));
            print_metric(&graph, &values);
        }
        Command::Entries(metric) => {
            let values = graph.entries(metric.resolve(config.metric_options()));
            print_metric(&graph, &values);
        }
        Command::Merge { other } => {
            let incoming: Dataset<String> = load_dataset(&other)
                .with_context(|| format!("Failed to load dataset: {}", other.display()))?;
            graph.merge([incoming]);
            save_dataset(&dataset_path, &graph.dataset())?;
            log::info!(
                "Merged {} into {} ({} sources, {} edges)",
                other.display(),
                dataset_path.display(),
                graph.len(),
                graph.edge_count()
            );
        }
    }

    Ok(())
}

/// Print one `node value` line per node, in graph order.
fn print_metric(graph: &RelationGraph<String>, values: &HashMap<String, f64>) {
    for node in graph.nodes() {
        if let Some(value) = values.get(&node) {
            println!("{:<32} {:.4}", node, value);
        }
    }
}
