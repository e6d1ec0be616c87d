use fixedbitset::FixedBitSet;
use log::debug;

use crate::error::{LouvainError, Result};
use crate::graph::{CommID, Graph, VInt};

/// Map from the communities of one layer to the nodes of the layer above.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerMap {
    targets: Vec<Option<VInt>>, // Indexed by community id.
    len: usize, // Number of mapped communities.
}

impl LayerMap {
    /// Node on the layer above that `comm` collapses into.
    pub fn target(&self, comm: CommID) -> Result<VInt> {
        self.targets
            .get(comm as usize)
            .copied()
            .flatten()
            .ok_or_else(|| LouvainError::Invariant(format!(
                "community {} has no node on the layer above",
                comm
            )))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Given a list of graphs where each node of graph `n + 1` is a community of
/// graph `n`, expresses the partitioning of every graph as a partitioning of
/// the first one.
#[derive(Debug, Default)]
pub struct LayerMapper {
    layer_maps: Vec<LayerMap>, // Append-only, one per coarsening.
}

impl LayerMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the community -> node map used to coarse-grain `graph`.
    ///
    /// Communities are numbered in order of first occurrence while scanning
    /// the nodes, which is the numbering the coarse graph is built with.
    pub fn create_layer_map(&mut self, graph: &Graph) -> Result<&LayerMap> {
        let order = graph.order();
        let mut is_found = FixedBitSet::with_capacity(order);
        let mut targets = vec![None; order];
        let mut count = 0usize;

        for &comm in graph.partitioning().communities() {
            if !is_found.put(comm as usize) {
                targets[comm as usize] = Some(count as VInt);
                count += 1;
            }
        }
        if count != graph.partitioning().num_comms() {
            return Err(LouvainError::Invariant(format!(
                "map creation failed: {} != {}",
                graph.partitioning().num_comms(),
                count
            )));
        }

        debug!("Layer map {}: {} communities", self.layer_maps.len(), count);
        self.layer_maps.push(LayerMap { targets, len: count });
        Ok(&self.layer_maps[self.layer_maps.len() - 1])
    }

    pub fn layer_maps(&self) -> &[LayerMap] {
        &self.layer_maps
    }

    /// Project the partitioning of every layer onto the nodes of layer 0.
    ///
    /// `graphs[i + 1]` must have been built from `graphs[i]` with the i-th
    /// recorded map. The result holds one assignment per layer, each as long
    /// as the base graph.
    pub fn run(&self, graphs: &[Graph]) -> Result<Vec<Vec<CommID>>> {
        if graphs.len() != self.layer_maps.len() + 1 {
            return Err(LouvainError::Invariant(format!(
                "{} layers recorded for {} graphs",
                self.layer_maps.len(),
                graphs.len()
            )));
        }

        let mut communities: Vec<Vec<CommID>> = Vec::with_capacity(graphs.len());
        communities.push(graphs[0].partitioning().communities().to_vec());
        for (layer, layer_map) in self.layer_maps.iter().enumerate() {
            let next = Self::map_to_next_layer(&communities[layer], layer_map, &graphs[layer + 1])?;
            communities.push(next);
        }
        Ok(communities)
    }

    /// Follow each base node's community on layer `l` to its node on layer
    /// `l + 1`, then read off that node's community.
    fn map_to_next_layer(comms_l1: &[CommID], layer_map: &LayerMap, upper: &Graph) -> Result<Vec<CommID>> {
        let partitioning = upper.partitioning();
        comms_l1
            .iter()
            .map(|&comm_l1| {
                let node_l2 = layer_map.target(comm_l1)?;
                partitioning.community(node_l2)
            })
            .collect()
    }
}
