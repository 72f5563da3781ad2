//! Olive: vertex-centric bulk-synchronous graph processing over a directed
//! graph whose vertices are partitioned across per-partition workers.
//!
//! Applications express computation as a [`VertexProgram`] (cond / update /
//! pack / unpack) and drive it with [`Engine::run`], which executes BSP
//! supersteps until every partition has drained its work.

pub mod alg;
pub mod engine;
pub mod error;
pub mod graph;

/// Global vertex identifier, as read from the edge list.
pub type VertexId = u32;
/// Index into a partition's edge array.
pub type EdgeId = u32;
/// Identifier of a partition (and of its worker).
pub type PartitionId = u32;

pub use engine::{Engine, VertexProgram};
pub use error::{Error, Result};
