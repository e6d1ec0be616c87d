use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::config::{PRECISION, SHUFFLE_SEED};
use crate::error::Result;
use crate::graph::{CommID, Graph, VInt};

/// Local-move phase of the Louvain method: moves single nodes to the
/// neighbouring community with the best modularity gain until one layer
/// reaches a local maximum.
#[derive(Debug)]
pub struct Maximiser {
    precision: f64, // Minimal modularity gain for another pass.
    shuffled_nodes: Vec<VInt>, // Visiting order of the nodes.
    total_moves: usize,
}

impl Default for Maximiser {
    fn default() -> Self {
        Self::new()
    }
}

impl Maximiser {
    pub fn new() -> Self {
        Maximiser {
            precision: PRECISION,
            shuffled_nodes: Vec::new(),
            total_moves: 0,
        }
    }

    /// Optimise the partitioning of `graph`, returns the number of moves made.
    pub fn run(&mut self, graph: &mut Graph) -> Result<usize> {
        self.fill_randomly(graph.order());
        self.total_moves = 0;

        self.reassign_communities(graph)?;

        Ok(self.total_moves)
    }

    /// The generator is re-seeded on every call, so each layer is visited in
    /// the same order whatever seed the detector was given.
    fn fill_randomly(&mut self, order: usize) {
        self.shuffled_nodes = (0..order as VInt).collect();
        let mut rng = StdRng::seed_from_u64(SHUFFLE_SEED);
        self.shuffled_nodes.shuffle(&mut rng);
    }

    fn reassign_communities(&mut self, graph: &mut Graph) -> Result<()> {
        let mut modularity = graph.modularity();
        let mut pass = 0usize;

        loop {
            let old_modularity = modularity;
            let moves = self.maximise_local_modularity(graph)?;
            self.total_moves += moves;
            modularity = graph.modularity();
            pass += 1;
            debug!(
                "Layer {} pass {}: {} moves, modularity {:.6}",
                graph.layer(),
                pass,
                moves,
                modularity
            );
            if moves == 0 || modularity - old_modularity <= self.precision {
                break;
            }
        }
        Ok(())
    }

    /// One pass over every node in the shuffled order.
    fn maximise_local_modularity(&self, graph: &mut Graph) -> Result<usize> {
        let mut moves = 0usize;
        for &node in &self.shuffled_nodes {
            if Self::make_best_move(graph, node)? {
                moves += 1;
            }
        }
        Ok(moves)
    }

    /// Move `node` into the neighbouring community with the strictly largest
    /// positive gain. The first community reaching the maximum wins.
    pub(crate) fn make_best_move(graph: &mut Graph, node: VInt) -> Result<bool> {
        let mut max = 0f64;
        let mut best: Option<CommID> = None;

        for &neighbour in graph.neighbours(node)? {
            let community = graph.partitioning().community(neighbour)?;
            let inc = Self::delta_modularity(graph, node, community)?;
            if inc > max {
                max = inc;
                best = Some(community);
            }
        }

        match best {
            Some(community) if community != graph.partitioning().community(node)? => {
                graph.move_to_comm(node, community)
            }
            _ => Ok(false),
        }
    }

    /// Change in modularity (up to a constant factor) if `node` joins
    /// `community`.
    fn delta_modularity(graph: &Graph, node: VInt, community: CommID) -> Result<f64> {
        let dnodecomm = graph.dnodecomm(node, community)? as f64;
        let ctot = graph.partitioning().tot_degree(community)? as f64;
        let wdeg = graph.degree(node)? as f64;
        Ok(dnodecomm - ((ctot * wdeg) / graph.m2()))
    }
}
