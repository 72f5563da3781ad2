use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use olive::alg;
use olive::graph::edge_list;
use olive::{Engine, VertexProgram};

/// Breadth-first search driven by the BSP engine.
#[derive(Parser)]
#[command(name = "bfs", about = "BFS over a partitioned edge-list graph")]
struct Args {
    /// Path to the edge-list file (`source target [edgeValue]` per line).
    graph: PathBuf,

    /// Source vertex to start the traversal from.
    #[arg(short, long, default_value_t = 0)]
    source: u32,

    /// Number of partitions to cut the graph into.
    #[arg(short, long, default_value_t = 2)]
    partitions: u32,

    /// Re-run BFS on the host and compare the depth vectors.
    #[arg(long)]
    check: bool,

    /// Print degree statistics before running.
    #[arg(long)]
    stats: bool,
}

struct BfsProgram;

impl VertexProgram for BfsProgram {
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

fn bfs_stats(dist: &[i32]) -> (u64, i32) {
    let mut reached: u64 = 0;
    let mut maxd: i32 = -1;
    for &d in dist {
        if d >= 0 {
            reached += 1;
            if d > maxd {
                maxd = d;
            }
        }
    }
    (reached, maxd)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    let graph = edge_list::read_graph(&args.graph).unwrap_or_else(|e| {
        eprintln!("Load graph failed: {e}");
        std::process::exit(1);
    });
    println!("Graph: n={}, m={}", graph.n(), graph.m());

    if args.stats {
        let degrees = graph.degree_summary();
        println!(
            "Degrees: min={}, max={}, mean={:.2}",
            degrees.min, degrees.max, degrees.mean
        );
    }

    let mut engine = Engine::<i32, i32>::from_graph(&graph, args.partitions).unwrap_or_else(|e| {
        eprintln!("Engine init failed: {e}");
        std::process::exit(1);
    });

    let run = |e: &mut Engine<i32, i32>| -> olive::Result<Vec<i32>> {
        e.vertex_map(|_| -1)?;
        e.vertex_filter(args.source, |_| 0)?;
        e.run(BfsProgram)?;
        let mut dist = vec![-1i32; e.vertex_count()];
        e.gather(|id, v| dist[id as usize] = v)?;
        Ok(dist)
    };

    let t = Instant::now();
    let dist = run(&mut engine).unwrap_or_else(|e| {
        eprintln!("BFS run failed: {e}");
        std::process::exit(1);
    });
    let engine_ms = t.elapsed().as_secs_f64() * 1000.0;

    let (reached, maxd) = bfs_stats(&dist);
    println!(
        "[Engine BFS] time={:.3} ms, supersteps={}, reached={}, maxd={}",
        engine_ms,
        engine.superstep_count(),
        reached,
        maxd
    );
    let (all_ms, comp_ms, comm_ms) = engine.profile_ms();
    println!("[Profile] comp={comp_ms:.3} ms, comm={comm_ms:.3} ms, all={all_ms:.3} ms");

    if args.check {
        let expected = alg::bfs::bfs(&graph, args.source);
        let mismatches = dist
            .iter()
            .zip(&expected)
            .filter(|(a, b)| a != b)
            .count();
        if mismatches != 0 {
            eprintln!("[CHECK] FAILED: {mismatches} vertices differ from host BFS");
            std::process::exit(1);
        }
        println!("[CHECK] engine BFS matches host BFS");
    }
}
