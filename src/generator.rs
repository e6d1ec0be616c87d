use rand::Rng;

use crate::error::{LouvainError, Result};
use crate::graph::builder::GraphBuilder;
use crate::graph::{Graph, VInt};

fn check_probability(name: &str, prob: f64) -> Result<()> {
    if (0.0..=1.0).contains(&prob) {
        Ok(())
    } else {
        Err(LouvainError::InvalidInput(format!("{} must lie in [0, 1], got {}", name, prob)))
    }
}

/// Erdős–Rényi G(n, p) graph with unit weights, node `i` has external id `i`.
pub fn erdos_renyi<R: Rng + ?Sized>(order: usize, prob: f64, rng: &mut R) -> Result<Graph> {
    check_probability("prob", prob)?;
    let mut builder = GraphBuilder::new(order);
    for node in 0..order as VInt {
        builder.add_node(node)?;
    }
    for n1 in 0..order as VInt {
        for n2 in (n1 + 1)..order as VInt {
            if rng.gen_bool(prob) {
                builder.add_edge_sym(n1, n2, 1)?;
            }
        }
    }
    builder.build()
}

/// Planted partition graph: `groups` blocks of `group_size` nodes, an edge
/// inside a block with probability `p_in`, across blocks with `p_out`.
/// Node `i` belongs to block `i / group_size`.
pub fn planted_partition<R: Rng + ?Sized>(
    groups: usize,
    group_size: usize,
    p_in: f64,
    p_out: f64,
    rng: &mut R,
) -> Result<Graph> {
    check_probability("p_in", p_in)?;
    check_probability("p_out", p_out)?;
    let order = groups * group_size;
    let mut builder = GraphBuilder::new(order);
    for node in 0..order as VInt {
        builder.add_node(node)?;
    }
    for n1 in 0..order {
        for n2 in (n1 + 1)..order {
            let prob = if n1 / group_size == n2 / group_size { p_in } else { p_out };
            if rng.gen_bool(prob) {
                builder.add_edge_sym(n1 as VInt, n2 as VInt, 1)?;
            }
        }
    }
    builder.build()
}

#[cfg(test)]
mod test_generator {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::generator::{erdos_renyi, planted_partition};

    #[test]
    fn test_erdos_renyi() {
        let mut rng = StdRng::seed_from_u64(1);
        let g = erdos_renyi(30, 1.0, &mut rng).unwrap();
        assert_eq!(g.order(), 30);
        assert_eq!(g.size(), 30 * 29 / 2);

        let empty = erdos_renyi(30, 0.0, &mut rng).unwrap();
        assert_eq!(empty.size(), 0);
        assert!(erdos_renyi(3, 1.5, &mut rng).is_err());
    }

    #[test]
    fn test_planted_partition() {
        let mut rng = StdRng::seed_from_u64(2);
        let g = planted_partition(3, 5, 1.0, 0.0, &mut rng).unwrap();
        assert_eq!(g.order(), 15);
        assert_eq!(g.size(), 3 * 10);
        assert_eq!(g.weight(0, 4).unwrap(), 1);
        assert_eq!(g.weight(4, 5).unwrap(), 0);
        assert!(planted_partition(2, 2, 0.5, -0.1, &mut rng).is_err());
    }
}
