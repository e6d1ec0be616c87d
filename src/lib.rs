//! Community detection on undirected weighted graphs with the Louvain method.
//!
//! Build a layer-0 [`Graph`] with a [`GraphBuilder`], hand it to a
//! [`LouvainDetector`] and read back the clusters:
//!
//! ```
//! use louvain_community::{GraphBuilder, LouvainDetector};
//!
//! let graph = GraphBuilder::from_edges(vec![(1, 2, 5), (2, 3, 5), (1, 3, 5), (3, 4, 1)]).unwrap();
//! let mut detector = LouvainDetector::new(graph);
//! detector.run_default().unwrap();
//! let clusters = detector.get_clusters().unwrap();
//! assert_eq!(clusters.iter().map(Vec::len).sum::<usize>(), 4);
//! ```

pub mod community_algo;
pub mod config;
pub mod edge_list;
pub mod error;
pub mod generator;
pub mod graph;
pub mod logger;
pub mod sparse_matrix;

pub use community_algo::LouvainDetector;
pub use config::DetectorConfig;
pub use error::{LouvainError, Result};
pub use graph::builder::GraphBuilder;
pub use graph::{CommID, Edge, Graph, VInt, Weight};
