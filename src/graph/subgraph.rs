use crate::{EdgeId, PartitionId, VertexId};

/// Destination of a partitioned edge: which shard, and which local slot in
/// that shard. Cross-partition targets are what the engine turns into
/// messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeTarget {
    pub partition_id: PartitionId,
    pub local_id: VertexId,
}

/// One shard of the partitioned graph, as handed to the engine.
///
/// `global_ids` maps local index to global vertex id and is ordered
/// ascending. `offsets`/`edges` form a CSR over the shard's local vertices
/// whose destinations are already remapped to `(partition, local)` pairs.
/// `cross_counts[j]` is the number of edges this shard sends to peer `j`;
/// the engine sizes its message boxes from these.
#[derive(Debug, Clone)]
pub struct Subgraph {
    pub partition_id: PartitionId,
    pub num_parts: u32,
    pub global_ids: Vec<VertexId>,
    pub offsets: Vec<EdgeId>,
    pub edges: Vec<EdgeTarget>,
    pub cross_counts: Vec<usize>,
}

impl Subgraph {
    /// Wraps a remapped shard, deriving `cross_counts` from the edges.
    pub fn new(
        partition_id: PartitionId,
        num_parts: u32,
        global_ids: Vec<VertexId>,
        offsets: Vec<EdgeId>,
        edges: Vec<EdgeTarget>,
    ) -> Self {
        let mut cross_counts = vec![0usize; num_parts as usize];
        for e in &edges {
            if e.partition_id != partition_id {
                cross_counts[e.partition_id as usize] += 1;
            }
        }
        Subgraph {
            partition_id,
            num_parts,
            global_ids,
            offsets,
            edges,
            cross_counts,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.global_ids.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}
