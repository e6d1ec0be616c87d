use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use itertools::Itertools;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use louvain_community::config::DetectorConfig;
use louvain_community::edge_list::read_edge_list;
use louvain_community::generator::erdos_renyi;
use louvain_community::logger::init_logger;
use louvain_community::{GraphBuilder, LouvainDetector, VInt};

/// Louvain community detection over a weighted edge list.
#[derive(Parser, Debug)]
#[command(name = "louvain", version)]
#[command(group(ArgGroup::new("source").required(true).args(["input", "random"])))]
struct Cli {
    /// Edge list file, one `src dst [weight]` per line.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Generate an Erdős–Rényi graph with this many nodes instead.
    #[arg(long, value_name = "ORDER")]
    random: Option<usize>,

    /// Edge probability of the generated graph.
    #[arg(long, default_value_t = 0.1)]
    prob: f64,

    /// YAML file with `max_layers` and `seed`.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    max_layers: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,

    /// Print the result as JSON.
    #[arg(long)]
    json: bool,

    /// Append logs to this file instead of stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Serialize)]
struct Report {
    modularity: f64,
    layers: usize,
    clusters: Vec<Vec<VInt>>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.log_file.as_deref())?;

    let mut config = match &cli.config {
        Some(path) => DetectorConfig::from_yaml_file(path)?,
        None => DetectorConfig::default(),
    };
    if let Some(max_layers) = cli.max_layers {
        config.max_layers = max_layers;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }

    let start = Instant::now();
    let graph = match (&cli.input, cli.random) {
        (Some(path), _) => GraphBuilder::from_edges(read_edge_list(path)?)
            .with_context(|| format!("Cannot build graph from {}", path.display()))?,
        (None, Some(order)) => {
            let mut rng = StdRng::seed_from_u64(config.seed);
            erdos_renyi(order, cli.prob, &mut rng).context("Cannot generate random graph")?
        }
        (None, None) => unreachable!("clap requires a graph source"),
    };
    info!("Graph loaded: {} nodes, total weight {} ({:?})", graph.order(), graph.size(), start.elapsed());

    let mut detector = LouvainDetector::from_config(graph, &config);
    detector.run(config.max_layers).context("Community detection failed")?;
    let report = Report {
        modularity: detector.modularity(),
        layers: detector.graphs().len(),
        clusters: detector.get_clusters()?,
    };
    info!("Detection done in {:?}", start.elapsed());

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Modularity: {:.6}", report.modularity);
        println!("Layers: {}", report.layers);
        println!("Clusters: {}", report.clusters.len());
        for (index, cluster) in report.clusters.iter().enumerate() {
            println!("{}: {}", index, cluster.iter().join(" "));
        }
    }
    Ok(())
}
