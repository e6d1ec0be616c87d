use std::collections::HashMap;

use crate::error::{LouvainError, Result};
use crate::graph::partitioning::Partitioning;
use crate::sparse_matrix::SparseWeightMatrix;

pub mod builder;
pub mod partitioning;

pub type VInt = u32;

/// Community ids live in the same index space as the nodes of their layer.
pub type CommID = VInt;

pub type Weight = i64;

/// An undirected weighted edge given by external ids.
pub type Edge = (VInt, VInt, Weight);

/// Reject any node or community id outside `[0, order)`.
#[inline]
pub(crate) fn range_check(index: VInt, order: usize) -> Result<usize> {
    if (index as usize) < order {
        Ok(index as usize)
    } else {
        Err(LouvainError::OutOfRange { index, order })
    }
}

/// Immutable topology of one layer: adjacency, weights and degrees.
#[derive(Debug, Clone)]
pub struct Topology {
    pub(crate) matrix: SparseWeightMatrix, // Adjacency matrix with weight info.
    pub(crate) adj_list: Vec<Vec<VInt>>, // Neighbours of each node, insertion order.
    pub(crate) degrees: Vec<Weight>, // Weighted degree of each node.
    pub(crate) order: usize, // Number of nodes.
    pub(crate) size_dbl: Weight, // Sum of edge weights * 2, self-loops counted once.
    pub(crate) layer: usize, // If > 0, a coarse-grained community graph.
    pub(crate) index: HashMap<VInt, VInt>, // External id -> dense id.
    pub(crate) reverse_index: HashMap<VInt, VInt>, // Dense id -> external id.
}

impl Topology {
    pub fn order(&self) -> usize {
        self.order
    }

    /// Sum of the undirected edge weights.
    pub fn size(&self) -> Weight {
        self.size_dbl / 2
    }

    /// Sum of all weighted degrees, the normaliser of the modularity.
    pub fn m2(&self) -> f64 {
        self.size_dbl as f64
    }

    pub fn layer(&self) -> usize {
        self.layer
    }

    pub fn degree(&self, node: VInt) -> Result<Weight> {
        let node = range_check(node, self.order)?;
        Ok(self.degrees[node])
    }

    pub fn weight(&self, n1: VInt, n2: VInt) -> Result<Weight> {
        range_check(n1, self.order)?;
        range_check(n2, self.order)?;
        Ok(self.matrix.get(n1, n2))
    }

    pub fn neighbours(&self, node: VInt) -> Result<&[VInt]> {
        let node = range_check(node, self.order)?;
        Ok(&self.adj_list[node])
    }

    pub fn adj_list(&self) -> &[Vec<VInt>] {
        &self.adj_list
    }

    pub fn index(&self) -> &HashMap<VInt, VInt> {
        &self.index
    }

    pub fn reverse_index(&self) -> &HashMap<VInt, VInt> {
        &self.reverse_index
    }

    /// External id of a dense node, if this layer carries one.
    pub fn external_id(&self, node: VInt) -> Option<VInt> {
        self.reverse_index.get(&node).copied()
    }
}

/// An undirected, weighted graph whose topology never changes once built.
/// Nodes can still be moved between communities through the owned
/// [`Partitioning`].
#[derive(Debug, Clone)]
pub struct Graph {
    pub(crate) topology: Topology,
    partitioning: Partitioning,
}

impl Graph {
    pub(crate) fn from_topology(topology: Topology) -> Graph {
        let partitioning = Partitioning::new(&topology);
        Graph {
            topology,
            partitioning,
        }
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn partitioning(&self) -> &Partitioning {
        &self.partitioning
    }

    pub(crate) fn partitioning_mut(&mut self) -> &mut Partitioning {
        &mut self.partitioning
    }

    pub fn order(&self) -> usize {
        self.topology.order()
    }

    pub fn size(&self) -> Weight {
        self.topology.size()
    }

    pub fn m2(&self) -> f64 {
        self.topology.m2()
    }

    pub fn layer(&self) -> usize {
        self.topology.layer()
    }

    pub fn degree(&self, node: VInt) -> Result<Weight> {
        self.topology.degree(node)
    }

    pub fn weight(&self, n1: VInt, n2: VInt) -> Result<Weight> {
        self.topology.weight(n1, n2)
    }

    pub fn neighbours(&self, node: VInt) -> Result<&[VInt]> {
        self.topology.neighbours(node)
    }

    /// Move `node` into `comm`, returns whether anything changed.
    pub fn move_to_comm(&mut self, node: VInt, comm: CommID) -> Result<bool> {
        self.partitioning.move_to_comm(&self.topology, node, comm)
    }

    /// Weight between `node` and the members of `comm`, `node` itself excluded.
    pub fn dnodecomm(&self, node: VInt, comm: CommID) -> Result<Weight> {
        self.partitioning.dnodecomm(&self.topology, node, comm)
    }

    pub fn modularity(&self) -> f64 {
        self.partitioning.modularity()
    }

    /// Load a full assignment, moving every node in index order.
    pub fn load_partitioning(&mut self, assignment: &[CommID]) -> Result<()> {
        if assignment.len() != self.order() {
            return Err(LouvainError::SizeMismatch {
                expected: self.order(),
                found: assignment.len(),
            });
        }
        for (node, comm) in assignment.iter().enumerate() {
            self.move_to_comm(node as VInt, *comm)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test_graph {
    use crate::error::LouvainError;
    use crate::graph::builder::GraphBuilder;
    use crate::graph::Graph;

    fn example_graph() -> Graph {
        GraphBuilder::from_edges(vec![
            (0, 1, 12),
            (1, 2, 14),
            (0, 2, 5),
            (3, 4, 10),
            (4, 4, 10),
            (3, 5, 10),
            (4, 6, 11),
            (5, 6, 17),
        ])
        .unwrap()
    }

    #[test]
    fn test_basics() {
        let g = example_graph();
        assert_eq!(g.order(), 7);
        assert_eq!(g.size(), 84);
        assert_eq!(g.m2(), 168.0);
        assert_eq!(g.degree(1).unwrap(), 26);
        assert_eq!(g.degree(0).unwrap(), 17);
        assert_eq!(g.degree(4).unwrap(), 31);
        assert_eq!(g.weight(4, 4).unwrap(), 10);
        assert_eq!(g.neighbours(4).unwrap(), &[3, 4, 6]);
        assert_eq!(g.layer(), 0);
    }

    #[test]
    fn test_symmetric_weights() {
        let g = example_graph();
        for a in 0..g.order() as u32 {
            for b in 0..g.order() as u32 {
                assert_eq!(g.weight(a, b).unwrap(), g.weight(b, a).unwrap());
            }
        }
    }

    #[test]
    fn test_range_check() {
        let g = example_graph();
        assert_eq!(g.degree(7), Err(LouvainError::OutOfRange { index: 7, order: 7 }));
        assert!(g.weight(0, 100).is_err());
        assert!(g.neighbours(7).is_err());
    }

    #[test]
    fn test_load_partitioning() {
        let mut g = example_graph();
        assert_eq!(
            g.load_partitioning(&[0, 0, 0]),
            Err(LouvainError::SizeMismatch { expected: 7, found: 3 })
        );

        g.load_partitioning(&[0, 0, 0, 3, 3, 3, 6]).unwrap();
        assert_eq!(g.partitioning().communities(), &[0, 0, 0, 3, 3, 3, 6]);
        assert_eq!(g.partitioning().num_comms(), 3);
        assert_eq!(g.dnodecomm(6, 3).unwrap(), 28);
    }
}
