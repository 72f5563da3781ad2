use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::csr::CsrGraph;
use super::subgraph::{EdgeTarget, Subgraph};
use crate::error::{Error, Result};
use crate::{EdgeId, PartitionId, VertexId};

/// Default seed for [`RandomEdgeCut`]. A fixed seed keeps the cut
/// reproducible across runs of the same binary.
pub const DEFAULT_SEED: u64 = 0x01_1f_e5;

/// Random edge-cut partitioning: every vertex is assigned to a uniformly
/// random shard, and every edge whose endpoints land in different shards
/// becomes a message at runtime.
#[derive(Debug, Clone, Copy)]
pub struct RandomEdgeCut {
    seed: u64,
}

impl Default for RandomEdgeCut {
    fn default() -> Self {
        RandomEdgeCut { seed: DEFAULT_SEED }
    }
}

impl RandomEdgeCut {
    pub fn new(seed: u64) -> Self {
        RandomEdgeCut { seed }
    }

    pub fn partition(&self, g: &CsrGraph, num_parts: u32) -> Result<Vec<Subgraph>> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let assignment: Vec<PartitionId> =
            (0..g.n()).map(|_| rng.gen_range(0..num_parts.max(1))).collect();
        edge_cut(g, num_parts, &assignment)
    }
}

/// Cuts `g` into `num_parts` shards according to an explicit vertex →
/// partition assignment, remapping every edge destination to a
/// `(partition, local)` pair.
pub fn edge_cut(
    g: &CsrGraph,
    num_parts: u32,
    assignment: &[PartitionId],
) -> Result<Vec<Subgraph>> {
    if num_parts == 0 {
        return Err(Error::Config("at least one partition is required".into()));
    }
    if assignment.len() != g.n() {
        return Err(Error::Config(format!(
            "assignment covers {} vertices, graph has {}",
            assignment.len(),
            g.n()
        )));
    }
    if let Some(&p) = assignment.iter().find(|&&p| p >= num_parts) {
        return Err(Error::Config(format!(
            "vertex assigned to partition {p}, only {num_parts} requested"
        )));
    }

    let k = num_parts as usize;
    let n = g.n();

    // Local index of each vertex within its shard; ascending global id
    // yields the ordered global_ids sequence the engine expects.
    let mut local_index = vec![0 as VertexId; n];
    let mut counts = vec![0 as VertexId; k];
    for v in 0..n {
        let p = assignment[v] as usize;
        local_index[v] = counts[p];
        counts[p] += 1;
    }

    let mut subgraphs = Vec::with_capacity(k);
    for p in 0..k {
        let mut global_ids = Vec::with_capacity(counts[p] as usize);
        let mut offsets: Vec<EdgeId> = Vec::with_capacity(counts[p] as usize + 1);
        let mut edges: Vec<EdgeTarget> = Vec::new();

        offsets.push(0);
        for v in 0..n {
            if assignment[v] as usize != p {
                continue;
            }
            global_ids.push(v as VertexId);
            for &d in g.neighbors(v as VertexId) {
                edges.push(EdgeTarget {
                    partition_id: assignment[d as usize],
                    local_id: local_index[d as usize],
                });
            }
            offsets.push(edges.len() as EdgeId);
        }

        subgraphs.push(Subgraph::new(
            p as PartitionId,
            num_parts,
            global_ids,
            offsets,
            edges,
        ));
    }

    Ok(subgraphs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_graph(n: usize) -> CsrGraph {
        let edges: Vec<(u32, u32)> = (0..n as u32 - 1).map(|v| (v, v + 1)).collect();
        CsrGraph::from_edges(n, &edges, None)
    }

    #[test]
    fn explicit_cut_remaps_edges() {
        // 0 -> 1 -> 2 -> 3 -> 4, even vertices in shard 0.
        let g = path_graph(5);
        let subs = edge_cut(&g, 2, &[0, 1, 0, 1, 0]).unwrap();

        assert_eq!(subs[0].global_ids, vec![0, 2, 4]);
        assert_eq!(subs[1].global_ids, vec![1, 3]);
        // every edge of the alternating path crosses the cut
        assert_eq!(subs[0].cross_counts, vec![0, 2]);
        assert_eq!(subs[1].cross_counts, vec![2, 0]);
        // 0's single edge targets global 1 = shard 1, local 0
        assert_eq!(
            subs[0].edges[0],
            EdgeTarget { partition_id: 1, local_id: 0 }
        );
        // 3's single edge targets global 4 = shard 0, local 2
        assert_eq!(
            subs[1].edges[1],
            EdgeTarget { partition_id: 0, local_id: 2 }
        );
    }

    #[test]
    fn random_cut_covers_every_vertex() {
        let g = path_graph(64);
        let subs = RandomEdgeCut::new(7).partition(&g, 4).unwrap();
        let mut seen = vec![false; 64];
        for sub in &subs {
            for &id in &sub.global_ids {
                assert!(!seen[id as usize], "vertex {id} in two shards");
                seen[id as usize] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
        let total_edges: usize = subs.iter().map(|s| s.edge_count()).sum();
        assert_eq!(total_edges, g.m());
    }

    #[test]
    fn random_cut_is_reproducible() {
        let g = path_graph(32);
        let a = RandomEdgeCut::new(3).partition(&g, 3).unwrap();
        let b = RandomEdgeCut::new(3).partition(&g, 3).unwrap();
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.global_ids, y.global_ids);
        }
    }

    #[test]
    fn zero_partitions_rejected() {
        let g = path_graph(4);
        assert!(edge_cut(&g, 0, &[]).is_err());
    }

    #[test]
    fn more_parts_than_vertices_leaves_empty_shards() {
        let g = path_graph(2);
        let subs = edge_cut(&g, 4, &[3, 0]).unwrap();
        assert_eq!(subs[1].vertex_count(), 0);
        assert_eq!(subs[3].global_ids, vec![0]);
    }
}
