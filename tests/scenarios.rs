//! End-to-end runs of the engine on small, fully understood graphs.

use olive::alg;
use olive::graph::partition_strategy::edge_cut;
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

/// cond never holds, so nothing ever activates or changes.
struct Frozen;

impl VertexProgram for Frozen {
    type VertexValue = u32;
    type MessageValue = u32;
    fn cond(&self, _v: u32) -> bool {
        false
    }
    fn update(&self, v: u32) -> u32 {
        v
    }
    fn pack(&self, v: u32) -> u32 {
        v
    }
    fn unpack(&self, m: u32) -> u32 {
        m
    }
}

fn engine_bfs(engine: &mut Engine<i32, i32>, source: u32) -> Vec<i32> {
    engine.vertex_map(|_| -1).unwrap();
    engine.vertex_filter(source, |_| 0).unwrap();
    engine.run(Bfs).unwrap();
    let mut dist = vec![-1i32; engine.vertex_count()];
    engine.gather(|id, v| dist[id as usize] = v).unwrap();
    dist
}

#[test]
fn bfs_on_two_partition_path() {
    // 0 -> 1 -> 2 -> 3 -> 4, P0 = {0, 2, 4}, P1 = {1, 3}: every edge is a
    // cross edge, so each depth travels as a message.
    let g = CsrGraph::from_edges(5, &[(0, 1), (1, 2), (2, 3), (3, 4)], None);
    let subs = edge_cut(&g, 2, &[0, 1, 0, 1, 0]).unwrap();
    let mut engine = Engine::from_subgraphs(5, subs).unwrap();

    let dist = engine_bfs(&mut engine, 0);
    assert_eq!(dist, vec![0, 1, 2, 3, 4]);
    // seed round, three relay rounds, and the round draining vertex 4
    assert_eq!(engine.superstep_count(), 5);
}

#[test]
fn bfs_matches_petgraph_on_a_dag() {
    let edges: &[(u32, u32)] = &[
        (0, 1),
        (0, 2),
        (1, 3),
        (2, 3),
        (3, 4),
        (1, 4),
        (5, 6), // island off the source
    ];
    let g = CsrGraph::from_edges(7, edges, None);
    let mut engine = Engine::from_graph(&g, 3).unwrap();
    let dist = engine_bfs(&mut engine, 0);

    let pg = petgraph::graph::DiGraph::<(), ()>::from_edges(edges.iter().copied());
    let oracle = petgraph::algo::dijkstra(&pg, 0.into(), None, |_| 1i32);
    for v in 0..7u32 {
        let expected = oracle
            .get(&petgraph::graph::NodeIndex::new(v as usize))
            .copied()
            .unwrap_or(-1);
        assert_eq!(dist[v as usize], expected, "vertex {v}");
    }
}

#[test]
fn components_of_isolated_vertices_terminate_immediately() {
    // Four vertices, no edges. Labels are seeded per vertex; a program that
    // never fires must leave everything untouched in superstep 0.
    let g = CsrGraph::from_edges(4, &[], None);
    let mut engine = Engine::<u32, u32>::from_graph(&g, 2).unwrap();
    engine.vertex_map_with_id(|id, _| id).unwrap();
    engine.run(Frozen).unwrap();

    assert_eq!(engine.superstep_count(), 0);
    let mut labels = vec![0u32; 4];
    engine.gather(|id, v| labels[id as usize] = v).unwrap();
    assert_eq!(labels, vec![0, 1, 2, 3]);
}

#[test]
fn weighted_triangle_via_unit_chains() {
    // 0 -> 1 (w=1), 1 -> 2 (w=2), 0 -> 2 (w=5), emulated by expanding each
    // weighted edge into a chain of unit edges, so BFS depth = distance.
    //   1 -> 3 -> 2          (weight 2)
    //   0 -> 4 -> 5 -> 6 -> 7 -> 2   (weight 5)
    let chains: &[(u32, u32)] = &[
        (0, 1),
        (1, 3),
        (3, 2),
        (0, 4),
        (4, 5),
        (5, 6),
        (6, 7),
        (7, 2),
    ];
    let g = CsrGraph::from_edges(8, chains, None);
    let mut engine = Engine::from_graph(&g, 2).unwrap();
    let dist = engine_bfs(&mut engine, 0);

    let weighted = CsrGraph::from_edges(3, &[(0, 1), (1, 2), (0, 2)], Some(&[1, 2, 5]));
    let oracle = alg::sssp::shortest_paths(&weighted, 0).unwrap();
    assert_eq!(oracle, vec![Some(0), Some(1), Some(3)]);
    for v in 0..3 {
        assert_eq!(Some(dist[v] as u64), oracle[v], "vertex {v}");
    }
}

#[test]
fn converged_engine_reruns_in_zero_supersteps() {
    let g = CsrGraph::from_edges(4, &[(0, 1), (1, 2), (2, 3)], None);
    let mut engine = Engine::from_graph(&g, 2).unwrap();
    let first = engine_bfs(&mut engine, 0);

    engine.run(Bfs).unwrap();
    assert_eq!(engine.superstep_count(), 0);
    let mut second = vec![-1i32; 4];
    engine.gather(|id, v| second[id as usize] = v).unwrap();
    assert_eq!(first, second);
}

#[test]
fn edgeless_graph_terminates_within_one_superstep() {
    let g = CsrGraph::from_edges(3, &[], None);
    let mut engine = Engine::from_graph(&g, 2).unwrap();
    let dist = engine_bfs(&mut engine, 1);
    assert_eq!(dist, vec![-1, 0, -1]);
    assert!(engine.superstep_count() <= 1);
}

#[test]
fn filtering_an_absent_vertex_changes_nothing() {
    let g = CsrGraph::from_edges(3, &[(0, 1), (1, 2)], None);
    let mut engine = Engine::from_graph(&g, 2).unwrap();
    engine.vertex_map(|_| -1).unwrap();
    engine.vertex_filter(17, |_| 0).unwrap();
    engine.run(Bfs).unwrap();

    assert_eq!(engine.superstep_count(), 0);
    let mut values = Vec::new();
    engine.gather(|_, v| values.push(v)).unwrap();
    assert!(values.iter().all(|&v| v == -1));
}
