use std::collections::HashMap;

use itertools::Itertools;
use log::debug;

use crate::community_algo::layer_mapper::LayerMap;
use crate::error::{LouvainError, Result};
use crate::graph::{range_check, Edge, Graph, Topology, VInt, Weight};
use crate::sparse_matrix::SparseWeightMatrix;

/// Single-use builder of a [`Graph`].
///
/// A layer-0 graph is assembled from external ids through [`add_node`] and
/// [`add_edge_sym`]; the next layer of the hierarchy comes from
/// [`GraphBuilder::coarse_grain`].
///
/// [`add_node`]: GraphBuilder::add_node
/// [`add_edge_sym`]: GraphBuilder::add_edge_sym
pub struct GraphBuilder {
    matrix: SparseWeightMatrix,
    adj_list: Vec<Vec<VInt>>,
    index: HashMap<VInt, VInt>,
    reverse_index: HashMap<VInt, VInt>,
    degrees: Vec<Weight>,
    capacity: usize, // Upper bound of the dense ids, needed for key packing.
    order: usize,
    size_dbl: Weight,
    layer: usize,
}

impl GraphBuilder {
    /// Create a builder able to hold up to `capacity` nodes.
    pub fn new(capacity: usize) -> Self {
        GraphBuilder {
            matrix: SparseWeightMatrix::new(capacity),
            adj_list: vec![Vec::new(); capacity],
            index: HashMap::new(),
            reverse_index: HashMap::new(),
            degrees: vec![0; capacity],
            capacity,
            order: 0,
            size_dbl: 0,
            layer: 0,
        }
    }

    /// Register an external id, returns its dense id. Repeated ids are no-ops.
    pub fn add_node(&mut self, id: VInt) -> Result<VInt> {
        if let Some(dense) = self.index.get(&id) {
            return Ok(*dense);
        }
        if self.order >= self.capacity {
            return Err(LouvainError::InvalidInput(format!(
                "cannot add node {}, builder capacity {} reached",
                id, self.capacity
            )));
        }
        let dense = self.order as VInt;
        self.index.insert(id, dense);
        self.reverse_index.insert(dense, id);
        self.order += 1;
        Ok(dense)
    }

    /// Add a symmetrical edge between two external ids added through
    /// [`GraphBuilder::add_node`]. A self-loop is stored once.
    pub fn add_edge_sym(&mut self, n1: VInt, n2: VInt, weight: Weight) -> Result<()> {
        if weight < 0 {
            return Err(LouvainError::InvalidInput(format!(
                "negative weight {} on edge ({}, {})",
                weight, n1, n2
            )));
        }
        let d1 = *self.index.get(&n1).ok_or(LouvainError::UnknownNode(n1))?;
        let d2 = *self.index.get(&n2).ok_or(LouvainError::UnknownNode(n2))?;
        self.insert_edge(d1, d2, weight);
        if d1 != d2 {
            self.insert_edge(d2, d1, weight);
        }
        Ok(())
    }

    /// Parallel edges merge into one adjacency entry with the summed weight.
    fn insert_edge(&mut self, n1: VInt, n2: VInt, weight: Weight) {
        if !self.matrix.contains(n1, n2) {
            self.adj_list[n1 as usize].push(n2);
        }
        self.matrix.add(n1, n2, weight);
        self.degrees[n1 as usize] += weight;
        self.size_dbl += weight;
    }

    /// Build a graph from external-id edges, nodes numbered in order of first
    /// appearance.
    pub fn from_edges<I>(edges: I) -> Result<Graph>
    where
        I: IntoIterator<Item = Edge>,
    {
        let edges: Vec<Edge> = edges.into_iter().collect();
        let capacity = edges
            .iter()
            .flat_map(|&(n1, n2, _)| [n1, n2])
            .unique()
            .count();
        let mut builder = GraphBuilder::new(capacity);
        for &(n1, n2, _) in &edges {
            builder.add_node(n1)?;
            builder.add_node(n2)?;
        }
        for (n1, n2, weight) in edges {
            builder.add_edge_sym(n1, n2, weight)?;
        }
        builder.build()
    }

    /// Collapse every community of `fine` into one node of a new graph one
    /// layer up. Inter-community weights become edges, the weight inside a
    /// community becomes a self-loop.
    pub fn coarse_grain(fine: &mut Graph, layer_map: &LayerMap) -> Result<Graph> {
        let order = fine.partitioning().num_comms();
        let expected = fine.topology().size_dbl;
        let mut builder = GraphBuilder::new(order);
        builder.order = order;
        builder.layer = fine.layer() + 1;

        let mut sum: Weight = 0;
        for (c1, c2, weight) in fine.partitioning_mut().comm_weight_iter() {
            let n1 = layer_map.target(c1)?;
            let n2 = layer_map.target(c2)?;
            range_check(n1, order)?;
            range_check(n2, order)?;
            builder.insert_edge(n1, n2, weight);
            sum += weight;
        }

        if sum != expected {
            return Err(LouvainError::Invariant(format!(
                "coarse-grain received wrong weights: {} != {}",
                sum, expected
            )));
        }
        if sum != builder.size_dbl {
            return Err(LouvainError::Invariant(format!(
                "coarse-grain error: {} != {}",
                sum, builder.size_dbl
            )));
        }
        debug!(
            "Coarse-grained layer {} ({} nodes) into layer {} ({} nodes)",
            fine.layer(),
            fine.order(),
            builder.layer,
            order
        );
        builder.build()
    }

    /// Induced subgraph over `members`; member `i` becomes node `i` and keeps
    /// its external id.
    pub fn from_community(graph: &Graph, members: &[VInt]) -> Result<Graph> {
        let positions: HashMap<VInt, VInt> = members
            .iter()
            .enumerate()
            .map(|(position, &member)| (member, position as VInt))
            .collect();
        if positions.len() != members.len() {
            return Err(LouvainError::InvalidInput("duplicate community members".to_owned()));
        }

        let mut builder = GraphBuilder::new(members.len());
        builder.order = members.len();
        builder.layer = graph.layer();
        for (new_node, &old_node) in members.iter().enumerate() {
            let new_node = new_node as VInt;
            if let Some(external) = graph.topology().external_id(old_node) {
                builder.index.insert(external, new_node);
                builder.reverse_index.insert(new_node, external);
            }
            for &old_neigh in graph.neighbours(old_node)? {
                if let Some(&new_neigh) = positions.get(&old_neigh) {
                    builder.insert_edge(new_node, new_neigh, graph.weight(old_node, old_neigh)?);
                }
            }
        }
        builder.build()
    }

    pub fn build(mut self) -> Result<Graph> {
        if !self.matrix.is_symmetric() {
            return Err(LouvainError::Invariant("asymmetric matrix".to_owned()));
        }
        self.adj_list.truncate(self.order);
        self.degrees.truncate(self.order);
        Ok(Graph::from_topology(Topology {
            matrix: self.matrix,
            adj_list: self.adj_list,
            degrees: self.degrees,
            order: self.order,
            size_dbl: self.size_dbl,
            layer: self.layer,
            index: self.index,
            reverse_index: self.reverse_index,
        }))
    }
}
