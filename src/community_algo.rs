use std::collections::BTreeMap;

use log::info;

use crate::community_algo::layer_mapper::LayerMapper;
use crate::community_algo::maximiser::Maximiser;
use crate::config::{DetectorConfig, DEFAULT_MAX_LAYERS};
use crate::error::{LouvainError, Result};
use crate::graph::builder::GraphBuilder;
use crate::graph::{CommID, Graph, VInt};

pub mod layer_mapper;
pub mod maximiser;

/// The Louvain method of community detection.
///
/// Each layer is optimised by the [`Maximiser`], then its communities are
/// collapsed into the nodes of the next layer, until a layer makes no move
/// or the layer cap is reached. Every layer's partitioning is finally
/// expressed over the nodes of the first graph.
pub struct LouvainDetector {
    total_moves: usize, // Moves made on the current layer.
    layer: usize, // Current community layer.
    graphs: Vec<Graph>, // One graph per layer, graphs[0] is the input.
    maximiser: Maximiser,
    mapper: LayerMapper,
    seed: u64,
    communities: Option<Vec<Vec<CommID>>>, // Filled once the run completes.
}

impl LouvainDetector {
    pub fn new(graph: Graph) -> Self {
        Self::with_seed(graph, 0)
    }

    pub fn with_seed(graph: Graph, seed: u64) -> Self {
        LouvainDetector {
            total_moves: 0,
            layer: 0,
            graphs: vec![graph],
            maximiser: Maximiser::new(),
            mapper: LayerMapper::new(),
            seed,
            communities: None,
        }
    }

    pub fn from_config(graph: Graph, config: &DetectorConfig) -> Self {
        Self::with_seed(graph, config.seed)
    }

    pub fn run_default(&mut self) -> Result<&[Vec<CommID>]> {
        self.run(DEFAULT_MAX_LAYERS)
    }

    /// Detect communities, coarse-graining at most `max_layers` times.
    ///
    /// A new layer is added while the current one moved a node and the layer
    /// count does not exceed `max_layers`, so up to `max_layers + 1` layers
    /// are optimised. Returns one assignment per layer, each over the nodes
    /// of the input graph. A detector runs once.
    pub fn run(&mut self, max_layers: usize) -> Result<&[Vec<CommID>]> {
        if max_layers == 0 {
            return Err(LouvainError::InvalidInput("max_layers must be at least 1".to_owned()));
        }
        if self.communities.is_some() {
            return Err(LouvainError::InvalidInput("detector already ran".to_owned()));
        }
        info!(
            "Start Louvain on {} nodes, total weight {}, seed {}",
            self.graphs[0].order(),
            self.graphs[0].size(),
            self.seed
        );

        loop {
            let graph = &mut self.graphs[self.layer];
            self.total_moves = self.maximiser.run(graph)?;
            info!(
                "Layer {}: {} nodes, {} moves, {} communities, modularity {:.6}",
                self.layer,
                graph.order(),
                self.total_moves,
                graph.partitioning().num_comms(),
                graph.modularity()
            );
            if self.total_moves > 0 && self.layer < max_layers {
                self.add_new_layer()?;
            } else {
                break;
            }
        }

        let communities = self.mapper.run(&self.graphs)?;
        info!(
            "Louvain finished with {} layers, modularity {:.6}",
            self.graphs.len(),
            self.modularity()
        );
        Ok(self.communities.insert(communities).as_slice())
    }

    fn add_new_layer(&mut self) -> Result<()> {
        let last = &mut self.graphs[self.layer];
        let layer_map = self.mapper.create_layer_map(last)?;
        let coarse = GraphBuilder::coarse_grain(last, layer_map)?;
        self.graphs.push(coarse);
        self.layer += 1;
        Ok(())
    }

    /// External ids of the input graph grouped by final community, groups in
    /// community order.
    pub fn get_clusters(&self) -> Result<Vec<Vec<VInt>>> {
        let communities = self
            .communities
            .as_ref()
            .ok_or_else(|| LouvainError::InvalidInput("detector has not run".to_owned()))?;
        let base = self.graphs[0].topology();

        let mut clusters = BTreeMap::<CommID, Vec<VInt>>::new();
        if let Some(final_communities) = communities.last() {
            for (node, &comm) in final_communities.iter().enumerate() {
                let node = node as VInt;
                let id = base
                    .external_id(node)
                    .ok_or_else(|| LouvainError::Invariant(format!("node {} has no external id", node)))?;
                clusters.entry(comm).or_default().push(id);
            }
        }
        Ok(clusters.into_values().collect())
    }

    /// Modularity of the last optimised layer.
    pub fn modularity(&self) -> f64 {
        self.graphs[self.layer].modularity()
    }

    pub fn communities(&self) -> Option<&[Vec<CommID>]> {
        self.communities.as_deref()
    }

    pub fn graphs(&self) -> &[Graph] {
        &self.graphs
    }

    pub fn layer(&self) -> usize {
        self.layer
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}
