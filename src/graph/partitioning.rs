use log::trace;

use crate::error::{LouvainError, Result};
use crate::graph::{range_check, CommID, Topology, VInt, Weight};
use crate::sparse_matrix::SparseWeightMatrix;

/// Clustering state layered over one [`Topology`].
///
/// Every quantity the modularity needs is kept up to date incrementally, so a
/// single-node move costs time proportional to the node's degree:
/// - `tot_degrees[c]` is the sum of the member degrees of `c`.
/// - `int_degrees[c]` is twice the weight inside `c` plus member self-loops.
/// - `cmatrix[c1][c2]` is the weight between two communities; its diagonal
///   equals `int_degrees`.
#[derive(Debug, Clone)]
pub struct Partitioning {
    cmatrix: SparseWeightMatrix, // Weights between communities.
    num_comms: usize, // Number of non-empty communities.
    communities: Vec<CommID>, // Community of each node.
    comm_sizes: Vec<usize>, // Member count of each community.
    tot_degrees: Vec<Weight>, // Total degree of each community.
    int_degrees: Vec<Weight>, // Internal degree of each community.
    order: usize,
    m2: f64,
}

impl Partitioning {
    /// Every node starts in its own singleton community.
    pub(crate) fn new(topology: &Topology) -> Partitioning {
        let order = topology.order;
        let mut tot_degrees = Vec::with_capacity(order);
        let mut int_degrees = Vec::with_capacity(order);
        for node in 0..order {
            tot_degrees.push(topology.degrees[node]);
            // Catches self-edges.
            int_degrees.push(topology.matrix.get(node as VInt, node as VInt));
        }
        Partitioning {
            cmatrix: topology.matrix.clone(),
            num_comms: order,
            communities: (0..order as CommID).collect(),
            comm_sizes: vec![1; order],
            tot_degrees,
            int_degrees,
            order,
            m2: topology.m2(),
        }
    }

    pub(crate) fn move_to_comm(&mut self, topology: &Topology, node: VInt, new_comm: CommID) -> Result<bool> {
        let node_idx = range_check(node, self.order)?;
        let new_idx = range_check(new_comm, self.order)?;

        let old_comm = self.communities[node_idx];
        if old_comm == new_comm {
            return Ok(false);
        }
        let old_idx = old_comm as usize;
        let degree = topology.degrees[node_idx];
        if self.tot_degrees[old_idx] - degree < 0 {
            return Err(LouvainError::Invariant(format!(
                "negative total degree for community {} when moving node {}",
                old_comm, node
            )));
        }

        self.communities[node_idx] = new_comm;
        self.tot_degrees[old_idx] -= degree;
        self.tot_degrees[new_idx] += degree;

        for &neighbour in &topology.adj_list[node_idx] {
            if neighbour == node {
                continue;
            }
            let weight = topology.matrix.get(node, neighbour);
            let neigh_comm = self.communities[neighbour as usize];
            self.cmatrix.add(new_comm, neigh_comm, weight);
            self.cmatrix.add(neigh_comm, new_comm, weight);
            self.cmatrix.add(old_comm, neigh_comm, -weight);
            self.cmatrix.add(neigh_comm, old_comm, -weight);
            if neigh_comm == new_comm {
                self.int_degrees[new_idx] += weight * 2;
            }
            if neigh_comm == old_comm {
                self.int_degrees[old_idx] -= weight * 2;
            }
        }

        // The self-loop travels with the node.
        let self_weight = topology.matrix.get(node, node);
        self.cmatrix.add(new_comm, new_comm, self_weight);
        self.cmatrix.add(old_comm, old_comm, -self_weight);
        self.int_degrees[old_idx] -= self_weight;
        self.int_degrees[new_idx] += self_weight;

        self.comm_sizes[old_idx] -= 1;
        self.comm_sizes[new_idx] += 1;
        if self.comm_sizes[old_idx] == 0 {
            self.num_comms -= 1;
        }
        if self.comm_sizes[new_idx] == 1 {
            self.num_comms += 1;
        }

        trace!("Move node {} from community {} to community {}", node, old_comm, new_comm);
        Ok(true)
    }

    pub(crate) fn dnodecomm(&self, topology: &Topology, node: VInt, comm: CommID) -> Result<Weight> {
        let node_idx = range_check(node, self.order)?;
        range_check(comm, self.order)?;

        let dnodecomm: Weight = topology.adj_list[node_idx]
            .iter()
            .filter(|&&neigh| neigh != node && self.communities[neigh as usize] == comm)
            .map(|&neigh| topology.matrix.get(node, neigh))
            .sum();
        Ok(dnodecomm)
    }

    #[inline]
    fn contribution(&self, comm: usize) -> f64 {
        if self.m2 == 0.0 {
            return 0.0;
        }
        let ctot = self.tot_degrees[comm] as f64;
        let cint = self.int_degrees[comm] as f64;
        (cint / self.m2) - (ctot / self.m2) * (ctot / self.m2)
    }

    /// Modularity of the current partitioning.
    pub fn modularity(&self) -> f64 {
        let mut q = 0f64;
        for comm in 0..self.order {
            q += self.contribution(comm);
        }
        q
    }

    /// The contribution a single community makes to the total modularity.
    pub fn modularity_contribution(&self, comm: CommID) -> Result<f64> {
        let comm = range_check(comm, self.order)?;
        Ok(self.contribution(comm))
    }

    pub fn communities(&self) -> &[CommID] {
        &self.communities
    }

    pub fn num_comms(&self) -> usize {
        self.num_comms
    }

    pub fn community(&self, node: VInt) -> Result<CommID> {
        let node = range_check(node, self.order)?;
        Ok(self.communities[node])
    }

    pub fn tot_degree(&self, comm: CommID) -> Result<Weight> {
        let comm = range_check(comm, self.order)?;
        Ok(self.tot_degrees[comm])
    }

    pub fn int_degree(&self, comm: CommID) -> Result<Weight> {
        let comm = range_check(comm, self.order)?;
        Ok(self.int_degrees[comm])
    }

    pub fn community_weight(&self, c1: CommID, c2: CommID) -> Result<Weight> {
        range_check(c1, self.order)?;
        range_check(c2, self.order)?;
        Ok(self.cmatrix.get(c1, c2))
    }

    /// Non-zero `(c1, c2, weight)` entries of the inter-community matrix.
    pub fn comm_weight_iter(&mut self) -> impl Iterator<Item = (CommID, CommID, Weight)> + '_ {
        self.cmatrix.compress_and_iter()
    }

    /// Consistency check of the inter-community matrix.
    pub fn is_symmetric(&self) -> bool {
        self.cmatrix.is_symmetric()
    }
}

#[cfg(test)]
mod test_partitioning {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use crate::error::LouvainError;
    use crate::generator::erdos_renyi;
    use crate::graph::builder::GraphBuilder;
    use crate::graph::{Graph, VInt, Weight};

    /// Seven nodes in two disconnected groups, 0-2 and 3-6.
    fn example_graph() -> Graph {
        let mut builder = GraphBuilder::new(7);
        for i in 0..=6 {
            builder.add_node(i).unwrap();
        }
        builder.add_edge_sym(0, 1, 12).unwrap();
        builder.add_edge_sym(1, 2, 14).unwrap();
        builder.add_edge_sym(0, 2, 5).unwrap();
        builder.add_edge_sym(3, 4, 10).unwrap();
        builder.add_edge_sym(4, 4, 10).unwrap();
        builder.add_edge_sym(3, 5, 10).unwrap();
        builder.add_edge_sym(4, 6, 11).unwrap();
        builder.add_edge_sym(5, 6, 17).unwrap();
        let mut g = builder.build().unwrap();

        g.move_to_comm(1, 0).unwrap();
        g.move_to_comm(2, 0).unwrap();
        g.move_to_comm(4, 3).unwrap();
        g.move_to_comm(5, 3).unwrap();
        g
    }

    fn snapshot(g: &Graph) -> (Vec<Weight>, Vec<Weight>, Vec<Weight>) {
        let p = g.partitioning();
        let n = g.order() as VInt;
        let tot = (0..n).map(|c| p.tot_degree(c).unwrap()).collect();
        let int = (0..n).map(|c| p.int_degree(c).unwrap()).collect();
        let mut weights = vec![];
        for c1 in 0..n {
            for c2 in 0..n {
                weights.push(p.community_weight(c1, c2).unwrap());
            }
        }
        (tot, int, weights)
    }

    fn assert_conserved(g: &Graph) {
        let p = g.partitioning();
        let n = g.order() as VInt;
        let tot: Weight = (0..n).map(|c| p.tot_degree(c).unwrap()).sum();
        let int: Weight = (0..n).map(|c| p.int_degree(c).unwrap()).sum();
        let diag: Weight = (0..n).map(|c| p.community_weight(c, c).unwrap()).sum();
        assert_eq!(tot as f64, g.m2());
        assert_eq!(int, diag);
        assert!(p.is_symmetric());
        assert!((0..n).all(|c| p.tot_degree(c).unwrap() >= 0));
    }

    #[test]
    fn test_example_scenario() {
        let g = example_graph();
        let p = g.partitioning();
        assert_eq!(g.order(), 7);
        assert_eq!(g.size(), 84);
        assert_eq!(g.degree(1).unwrap(), 26);
        assert_eq!(g.degree(0).unwrap(), 17);
        assert_eq!(g.dnodecomm(6, 3).unwrap(), 28);

        assert_eq!(p.tot_degree(3).unwrap(), 78);
        assert_eq!(
            p.tot_degree(3).unwrap(),
            g.degree(3).unwrap() + g.degree(4).unwrap() + g.degree(5).unwrap()
        );
        assert_eq!(p.tot_degree(1).unwrap(), 0);
        assert_eq!(p.tot_degree(5).unwrap(), 0);
        assert_eq!(p.int_degree(0).unwrap(), 62);
        assert_eq!(p.int_degree(3).unwrap(), 50);
        assert_eq!(p.int_degree(1).unwrap(), 0);
        assert_eq!(p.int_degree(2).unwrap(), 0);
        assert_eq!(p.int_degree(6).unwrap(), 0);
        assert_eq!(p.num_comms(), 3);

        assert_eq!(p.community_weight(0, 0).unwrap(), 62);
        assert_eq!(p.community_weight(3, 0).unwrap(), 0);
        assert_eq!(p.community_weight(3, 6).unwrap(), 28);
        assert_eq!(p.community_weight(3, 3).unwrap(), 50);
        assert_eq!(p.community_weight(6, 6).unwrap(), 0);
        assert_conserved(&g);
    }

    #[test]
    fn test_modularity_decomposition() {
        let g = example_graph();
        let p = g.partitioning();
        let mut q = 0f64;
        for comm in 0..g.order() as VInt {
            q += p.modularity_contribution(comm).unwrap();
        }
        assert_eq!(p.modularity(), q);
        assert!(p.modularity() > 0.0);
    }

    #[test]
    fn test_singletons() {
        let g = GraphBuilder::from_edges(vec![(10, 20, 3), (20, 30, 4), (30, 30, 2)]).unwrap();
        let p = g.partitioning();
        assert_eq!(p.communities(), &[0, 1, 2]);
        assert_eq!(p.num_comms(), 3);
        assert_eq!(p.int_degree(2).unwrap(), 2);
        assert_eq!(p.tot_degree(1).unwrap(), 7);
        assert_conserved(&g);
    }

    #[test]
    fn test_same_community_move_is_noop() {
        let mut g = example_graph();
        let before = snapshot(&g);
        let num_comms = g.partitioning().num_comms();
        assert!(!g.move_to_comm(4, 3).unwrap());
        assert!(!g.move_to_comm(6, 6).unwrap());
        assert_eq!(snapshot(&g), before);
        assert_eq!(g.partitioning().num_comms(), num_comms);
    }

    #[test]
    fn test_inverse_move() {
        let mut g = example_graph();
        let before = snapshot(&g);
        // Node 4 carries a self-loop.
        assert!(g.move_to_comm(4, 0).unwrap());
        assert_ne!(snapshot(&g), before);
        assert_conserved(&g);
        assert!(g.move_to_comm(4, 3).unwrap());
        assert_eq!(snapshot(&g), before);

        assert!(g.move_to_comm(6, 3).unwrap());
        assert_eq!(g.partitioning().num_comms(), 2);
        assert!(g.move_to_comm(6, 6).unwrap());
        assert_eq!(snapshot(&g), before);
        assert_eq!(g.partitioning().num_comms(), 3);
    }

    #[test]
    fn test_isolated_node_counts_as_community() {
        let mut builder = GraphBuilder::new(3);
        for id in [1, 2, 3] {
            builder.add_node(id).unwrap();
        }
        builder.add_edge_sym(1, 2, 4).unwrap();
        let mut g = builder.build().unwrap();
        assert_eq!(g.degree(2).unwrap(), 0);
        assert_eq!(g.partitioning().num_comms(), 3);

        // Moving the zero-degree node empties its community.
        assert!(g.move_to_comm(2, 0).unwrap());
        assert_eq!(g.partitioning().num_comms(), 2);
        assert_eq!(g.partitioning().tot_degree(0).unwrap(), 4);
        assert!(g.move_to_comm(2, 1).unwrap());
        assert_eq!(g.partitioning().num_comms(), 2);
        assert!(g.move_to_comm(2, 2).unwrap());
        assert_eq!(g.partitioning().num_comms(), 3);
        assert_conserved(&g);
    }

    #[test]
    fn test_move_into_empty_community() {
        let mut g = example_graph();
        // Community 1 emptied out earlier, node 6 reopens it.
        assert!(g.move_to_comm(6, 1).unwrap());
        assert_eq!(g.partitioning().num_comms(), 3);
        assert_eq!(g.partitioning().tot_degree(1).unwrap(), 28);
        assert_eq!(g.partitioning().tot_degree(6).unwrap(), 0);
        assert_conserved(&g);
    }

    #[test]
    fn test_move_out_of_range() {
        let mut g = example_graph();
        assert_eq!(
            g.move_to_comm(7, 0),
            Err(LouvainError::OutOfRange { index: 7, order: 7 })
        );
        assert!(g.move_to_comm(0, 9).is_err());
        assert!(g.dnodecomm(0, 7).is_err());
        assert!(g.partitioning().community_weight(7, 0).is_err());
        assert!(g.partitioning().modularity_contribution(7).is_err());
    }

    #[test]
    fn test_random_moves_conserve() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut g = erdos_renyi(40, 0.15, &mut rng).unwrap();
        let size = g.size();
        for _ in 0..500 {
            let node = rng.gen_range(0..40);
            let comm = rng.gen_range(0..40);
            g.move_to_comm(node, comm).unwrap();
        }
        assert_conserved(&g);
        assert_eq!(g.size(), size);

        let mut q = 0f64;
        for comm in 0..40 {
            q += g.partitioning().modularity_contribution(comm).unwrap();
        }
        assert_eq!(g.modularity(), q);

        let distinct = g.partitioning().communities().iter().collect::<std::collections::BTreeSet<_>>();
        assert_eq!(distinct.len(), g.partitioning().num_comms());
    }
}
