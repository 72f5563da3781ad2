use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use olive::graph::edge_list;
use olive::{Engine, VertexProgram};

/// Forward reachability from a source vertex.
#[derive(Parser)]
#[command(name = "reach", about = "Reachable set of a vertex, engine-driven")]
struct Args {
    /// Path to the edge-list file.
    graph: PathBuf,

    /// Source vertex.
    #[arg(short, long, default_value_t = 0)]
    source: u32,

    /// Number of partitions to cut the graph into.
    #[arg(short, long, default_value_t = 2)]
    partitions: u32,
}

struct ReachProgram;

impl VertexProgram for ReachProgram {
    type VertexValue = u32;
    type MessageValue = u32;

    fn cond(&self, v: u32) -> bool {
        v == 0
    }
    fn update(&self, _v: u32) -> u32 {
        1
    }
    fn pack(&self, v: u32) -> u32 {
        v
    }
    fn unpack(&self, m: u32) -> u32 {
        m
    }
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

    let result = (|| -> olive::Result<u64> {
        let mut engine = Engine::<u32, u32>::from_graph(&graph, args.partitions)?;
        engine.vertex_filter(args.source, |_| 1)?;
        engine.run(ReachProgram)?;
        let mut reached: u64 = 0;
        engine.gather(|_, v| reached += v as u64)?;
        Ok(reached)
    })();

    match result {
        Ok(reached) => {
            println!(
                "{} of {} vertices reachable from {}",
                reached,
                graph.n(),
                args.source
            );
        }
        Err(e) => {
            eprintln!("Reachability run failed: {e}");
            std::process::exit(1);
        }
    }
}
