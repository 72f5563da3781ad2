//! The same program on the same graph must produce the same answer for any
//! partition count. Checked against the host oracle and across partition
//! counts on randomly generated graphs.

use proptest::prelude::*;

use olive::alg;
use olive::graph::CsrGraph;
use olive::{Engine, VertexProgram};

struct Bfs;

impl VertexProgram for Bfs {
    type VertexValue = i32;
    type MessageValue = i32;
    fn cond(&self, v: i32) -> bool {
        v < 0
    }
    fn update(&self, v: i32) -> i32 {
        v + 1
    }
    fn pack(&self, v: i32) -> i32 {
        v
    }
    fn unpack(&self, m: i32) -> i32 {
        m
    }
}

fn engine_bfs(g: &CsrGraph, num_parts: u32, source: u32) -> Vec<i32> {
    let mut engine = Engine::from_graph(g, num_parts).unwrap();
    engine.vertex_map(|_| -1).unwrap();
    engine.vertex_filter(source, |_| 0).unwrap();
    engine.run(Bfs).unwrap();
    let mut dist = vec![-1i32; g.n()];
    engine.gather(|id, v| dist[id as usize] = v).unwrap();
    dist
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn bfs_is_partition_count_invariant(
        n in 2usize..24,
        raw_edges in prop::collection::vec((0u32..24, 0u32..24), 0..80),
        source_pick in 0u32..24,
    ) {
        let edges: Vec<(u32, u32)> = raw_edges
            .into_iter()
            .map(|(u, v)| (u % n as u32, v % n as u32))
            .collect();
        let source = source_pick % n as u32;
        let g = CsrGraph::from_edges(n, &edges, None);

        let oracle = alg::bfs::bfs(&g, source);
        for num_parts in [1u32, 2, 3] {
            let dist = engine_bfs(&g, num_parts, source);
            prop_assert_eq!(&dist, &oracle, "num_parts = {}", num_parts);
        }
    }
}
