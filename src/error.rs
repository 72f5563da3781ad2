use std::path::PathBuf;

use thiserror::Error;

use crate::PartitionId;

/// Errors surfaced by graph loading, partitioning, and the engine.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read graph {path:?}: {source}")]
    GraphIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("bad edge list line {line} in {path:?}: {reason}")]
    Parse {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(
        "message box {src}->{dst} overflowed its capacity of {capacity} \
         messages in superstep {superstep}"
    )]
    CapacityOverflow {
        src: PartitionId,
        dst: PartitionId,
        capacity: usize,
        superstep: usize,
    },

    #[error("partition worker failed: {0}")]
    Worker(String),
}

pub type Result<T> = std::result::Result<T, Error>;
