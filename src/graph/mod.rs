pub mod csr;
pub mod edge_list;
pub mod partition_strategy;
pub mod subgraph;

pub use csr::{CsrGraph, DegreeSummary};
pub use partition_strategy::RandomEdgeCut;
pub use subgraph::{EdgeTarget, Subgraph};
