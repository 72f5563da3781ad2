//! The multi-partition BSP execution engine.
//!
//! Each partition owns one worker stream; the host drives all partitions
//! through strict superstep phases (scatter, compact, termination probe,
//! expand, all-to-all exchange, sync, buffer swap) and blocks only at the
//! probe and at the end-of-step sync. Messages produced in superstep `t`
//! are visible to scatter only in step `t+1`.

pub mod kernels;
pub mod message;
pub mod partition;
pub mod program;
pub mod stream;

use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::graph::partition_strategy::RandomEdgeCut;
use crate::graph::subgraph::Subgraph;
use crate::graph::{edge_list, CsrGraph};
use crate::{PartitionId, VertexId};

use partition::Partition;
use stream::Stream;

pub use program::VertexProgram;

/// Drives a [`VertexProgram`] to a fixed point over edge-cut partitions.
pub struct Engine<V, M> {
    partitions: Vec<Arc<Partition<V, M>>>,
    streams: Vec<Stream>,
    vertex_count: usize,
    supersteps: usize,
    terminate: bool,
    total_ms: f64,
    total_comp_ms: f64,
    total_comm_ms: f64,
}

impl<V, M> Engine<V, M>
where
    V: Copy + Default + Send + Sync + 'static,
    M: Copy + Default + Send + Sync + 'static,
{
    /// Reads an edge-list file, cuts it into `num_parts` shards with the
    /// default random edge-cut, and builds the engine.
    pub fn init(path: impl AsRef<Path>, num_parts: u32) -> Result<Self> {
        let graph = edge_list::read_graph(path)?;
        Self::from_graph(&graph, num_parts)
    }

    /// Partitions an already-loaded logical graph.
    pub fn from_graph(graph: &CsrGraph, num_parts: u32) -> Result<Self> {
        graph.validate()?;
        let subgraphs = RandomEdgeCut::default().partition(graph, num_parts)?;
        Self::from_subgraphs(graph.n(), subgraphs)
    }

    /// Builds the engine from explicit shard descriptors, the seam the
    /// partitioner contract defines. The shards must form a disjoint cover
    /// of `0..vertex_count` and their edges must point at valid peers.
    pub fn from_subgraphs(vertex_count: usize, subgraphs: Vec<Subgraph>) -> Result<Self> {
        let k = subgraphs.len();
        if k == 0 {
            return Err(Error::Config("at least one partition is required".into()));
        }
        let mut seen = vec![false; vertex_count];
        for (i, sub) in subgraphs.iter().enumerate() {
            if sub.partition_id as usize != i {
                return Err(Error::Config(format!(
                    "subgraph {i} carries partition id {}",
                    sub.partition_id
                )));
            }
            if sub.num_parts as usize != k {
                return Err(Error::Config(format!(
                    "subgraph {i} was cut for {} partitions, engine has {k}",
                    sub.num_parts
                )));
            }
            if sub.cross_counts.len() != k {
                return Err(Error::Config(format!(
                    "subgraph {i} reports cross counts for {} peers, expected {k}",
                    sub.cross_counts.len()
                )));
            }
            for &id in &sub.global_ids {
                match seen.get_mut(id as usize) {
                    Some(slot) => {
                        if *slot {
                            return Err(Error::Config(format!(
                                "vertex {id} appears in more than one shard"
                            )));
                        }
                        *slot = true;
                    }
                    None => {
                        return Err(Error::Config(format!(
                            "vertex {id} out of range for vertex count {vertex_count}"
                        )))
                    }
                }
            }
        }
        if let Some(missing) = seen.iter().position(|&s| !s) {
            return Err(Error::Config(format!(
                "vertex {missing} is not covered by any shard"
            )));
        }
        for sub in &subgraphs {
            for e in &sub.edges {
                let peer = e.partition_id as usize;
                if peer >= k || e.local_id as usize >= subgraphs[peer].vertex_count() {
                    return Err(Error::Config(format!(
                        "edge target ({}, {}) out of range",
                        e.partition_id, e.local_id
                    )));
                }
            }
        }

        // Box (i, j) capacity is the exact number of edges i sends to j, as
        // reported by the partitioner; the push-time and receive-time bounds
        // checks remain the backstop for inconsistent hand-built shards.
        let mut partitions = Vec::with_capacity(k);
        for (i, sub) in subgraphs.iter().enumerate() {
            let outbox_caps = sub.cross_counts.clone();
            let inbox_caps: Vec<usize> = subgraphs
                .iter()
                .map(|peer| peer.cross_counts[i])
                .collect();
            partitions.push(Partition::from_subgraph(sub, &outbox_caps, &inbox_caps)?);
        }

        Ok(Self::from_partitions(vertex_count, partitions))
    }

    /// Wires already-built partitions to their streams. Capacities are
    /// whatever the partitions were constructed with; nothing here assumes
    /// they are pairwise symmetric.
    pub(crate) fn from_partitions(vertex_count: usize, partitions: Vec<Partition<V, M>>) -> Self {
        let k = partitions.len();
        if let Ok(parallelism) = std::thread::available_parallelism() {
            if k > parallelism.get() {
                warn!(
                    partitions = k,
                    workers = parallelism.get(),
                    "more partitions than available parallelism; workers will share cores"
                );
            }
        }

        let streams = (0..k)
            .map(|i| Stream::new(&format!("partition-{i}")))
            .collect();

        info!(
            vertices = vertex_count,
            partitions = k,
            "engine initialized"
        );

        Engine {
            partitions: partitions.into_iter().map(Arc::new).collect(),
            streams,
            vertex_count,
            supersteps: 0,
            terminate: false,
            total_ms: 0.0,
            total_comp_ms: 0.0,
            total_comm_ms: 0.0,
        }
    }

    /// Number of vertices in the whole graph.
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn num_partitions(&self) -> usize {
        self.partitions.len()
    }

    /// Completed supersteps of the most recent [`run`](Self::run).
    pub fn superstep_count(&self) -> usize {
        self.supersteps
    }

    /// Accumulated (total, computation, communication) milliseconds across
    /// every superstep of the engine's lifetime. Diagnostic only.
    pub fn profile_ms(&self) -> (f64, f64, f64) {
        (self.total_ms, self.total_comp_ms, self.total_comm_ms)
    }

    fn launch_on(
        &self,
        i: usize,
        task: impl FnOnce() + Send + 'static,
    ) -> Result<()> {
        self.streams[i]
            .launch(task)
            .map_err(|_| Error::Worker(format!("partition {i} worker terminated")))
    }

    fn sync(&self, i: usize) -> Result<()> {
        self.streams[i]
            .synchronize()
            .map_err(|_| Error::Worker(format!("partition {i} worker terminated")))
    }

    /// Applies `f` to every vertex value in every partition.
    pub fn vertex_map<F>(&mut self, f: F) -> Result<()>
    where
        F: Fn(V) -> V + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        for i in 0..self.partitions.len() {
            let part = Arc::clone(&self.partitions[i]);
            debug!(
                partition = i,
                elements = part.vertex_count,
                "launching vertexMap kernel"
            );
            let f = Arc::clone(&f);
            self.launch_on(i, move || kernels::vertex_map(&part, f.as_ref()))?;
            self.sync(i)?;
        }
        Ok(())
    }

    /// Like [`vertex_map`](Self::vertex_map), but `f` also receives the
    /// vertex's global id, for per-vertex seeding that must not touch the
    /// workset.
    pub fn vertex_map_with_id<F>(&mut self, f: F) -> Result<()>
    where
        F: Fn(VertexId, V) -> V + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        for i in 0..self.partitions.len() {
            let part = Arc::clone(&self.partitions[i]);
            let f = Arc::clone(&f);
            self.launch_on(i, move || kernels::vertex_map_with_id(&part, f.as_ref()))?;
            self.sync(i)?;
        }
        Ok(())
    }

    /// Applies `f` to the single vertex with global id `id` (if present)
    /// and marks it active, seeding the next run.
    pub fn vertex_filter<F>(&mut self, id: VertexId, f: F) -> Result<()>
    where
        F: Fn(V) -> V + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        for i in 0..self.partitions.len() {
            let part = Arc::clone(&self.partitions[i]);
            debug!(
                partition = i,
                elements = part.vertex_count,
                "launching vertexFilter kernel"
            );
            let f = Arc::clone(&f);
            self.launch_on(i, move || kernels::vertex_filter(&part, id, f.as_ref()))?;
            self.sync(i)?;
        }
        Ok(())
    }

    /// Runs supersteps until every partition is quiescent: no queued work
    /// and no inbound message that reactivates anything.
    pub fn run<P>(&mut self, program: P) -> Result<()>
    where
        P: VertexProgram<VertexValue = V, MessageValue = M>,
    {
        let program = Arc::new(program);
        self.supersteps = 0;
        let start = Instant::now();

        loop {
            self.terminate = true;
            self.superstep(&program)?;
            if self.terminate {
                break;
            }
        }

        info!(
            supersteps = self.supersteps,
            total_ms = start.elapsed().as_secs_f64() * 1000.0,
            comp_ms = self.total_comp_ms,
            comm_ms = self.total_comm_ms,
            "run converged"
        );
        Ok(())
    }

    pub(crate) fn superstep<P>(&mut self, program: &Arc<P>) -> Result<()>
    where
        P: VertexProgram<VertexValue = V, MessageValue = M>,
    {
        debug!(superstep = self.supersteps, "--- superstep ---");
        let num = self.partitions.len();
        let step_start = Instant::now();

        // Scatter: fold last step's deliveries into local state.
        for i in 0..num {
            for j in 0..num {
                if i == j || self.partitions[i].inboxes[j].is_empty() {
                    continue;
                }
                debug!(
                    partition = i,
                    peer = j,
                    messages = self.partitions[i].inboxes[j].len(),
                    "launching scatter kernel"
                );
                let part = Arc::clone(&self.partitions[i]);
                let program = Arc::clone(program);
                self.launch_on(i, move || {
                    let t = Instant::now();
                    kernels::scatter(&part, j, program.as_ref());
                    part.timings
                        .scatter
                        .fetch_add(t.elapsed().as_nanos() as u64, Ordering::Relaxed);
                })?;
            }
        }

        // Compact the workset into the workqueue.
        for i in 0..num {
            debug!(
                partition = i,
                elements = self.partitions[i].vertex_count,
                "launching compaction kernel"
            );
            let part = Arc::clone(&self.partitions[i]);
            self.launch_on(i, move || {
                let t = Instant::now();
                kernels::compact(&part);
                part.timings
                    .compact
                    .fetch_add(t.elapsed().as_nanos() as u64, Ordering::Relaxed);
            })?;
        }

        // Termination probe: fence each partition and read its queue size.
        // Runs after scatter and compact, so this step's deliveries have
        // already had their chance to light up workset bits.
        for i in 0..num {
            self.sync(i)?;
            let size = self.partitions[i].workqueue_len();
            debug!(partition = i, workqueue = size, "probe");
            if size != 0 {
                self.terminate = false;
            }
        }
        if self.terminate {
            return Ok(());
        }

        // Expand: partitions with no queued work are skipped entirely.
        for i in 0..num {
            if self.partitions[i].workqueue_len() == 0 {
                continue;
            }
            debug!(
                partition = i,
                elements = self.partitions[i].workqueue_len(),
                "launching expansion kernel"
            );
            let part = Arc::clone(&self.partitions[i]);
            let program = Arc::clone(program);
            self.launch_on(i, move || {
                for j in 0..part.outboxes.len() {
                    if j != part.partition_id as usize {
                        part.outboxes[j].clear();
                    }
                }
                let t = Instant::now();
                kernels::expand(&part, program.as_ref());
                part.timings
                    .expand
                    .fetch_add(t.elapsed().as_nanos() as u64, Ordering::Relaxed);
            })?;
        }

        // All-to-all exchange. Each copy runs on the source partition's
        // stream, strictly after that partition's expand.
        for i in 0..num {
            for j in (i + 1)..num {
                let dst = Arc::clone(&self.partitions[i]);
                let src = Arc::clone(&self.partitions[j]);
                self.launch_on(j, move || dst.inboxes[src.partition_id as usize]
                    .recv_msgs(&src.outboxes[dst.partition_id as usize]))?;

                let dst = Arc::clone(&self.partitions[j]);
                let src = Arc::clone(&self.partitions[i]);
                self.launch_on(i, move || dst.inboxes[src.partition_id as usize]
                    .recv_msgs(&src.outboxes[dst.partition_id as usize]))?;
            }
        }

        // End-of-step synchronization: the global barrier.
        for i in 0..num {
            self.sync(i)?;
        }

        // Overflow can trip on either side: an outbox whose shard
        // under-reported its cross cut, or an inbox sized below the peer's
        // outbox. Both fail the superstep with the same distinguished error.
        for i in 0..num {
            for j in 0..num {
                if i == j {
                    continue;
                }
                if self.partitions[i].outboxes[j].overflowed() {
                    return Err(Error::CapacityOverflow {
                        src: i as PartitionId,
                        dst: j as PartitionId,
                        capacity: self.partitions[i].outboxes[j].capacity(),
                        superstep: self.supersteps,
                    });
                }
                if self.partitions[i].inboxes[j].overflowed() {
                    return Err(Error::CapacityOverflow {
                        src: j as PartitionId,
                        dst: i as PartitionId,
                        capacity: self.partitions[i].inboxes[j].capacity(),
                        superstep: self.supersteps,
                    });
                }
            }
        }

        // Swap inboxes so the next scatter reads this step's deliveries.
        for i in 0..num {
            for j in 0..num {
                if i != j {
                    self.partitions[i].inboxes[j].swap_buffers();
                }
            }
        }

        // Profiling: the lagging partition represents the computation time.
        let total_ms = step_start.elapsed().as_secs_f64() * 1000.0;
        let mut max_comp_ms: f64 = 0.0;
        for (i, part) in self.partitions.iter().enumerate() {
            let (scatter_ms, compact_ms, expand_ms) = part.timings.take_ms();
            let comp = scatter_ms + compact_ms + expand_ms;
            debug!(
                partition = i,
                comp_ms = comp,
                scatter_ms,
                compact_ms,
                expand_ms,
                "kernel timings"
            );
            max_comp_ms = max_comp_ms.max(comp);
        }
        let comm_ms = (total_ms - max_comp_ms).max(0.0);
        info!(
            superstep = self.supersteps,
            total_ms,
            comp = max_comp_ms / total_ms.max(f64::EPSILON),
            comm = comm_ms / total_ms.max(f64::EPSILON),
            "superstep finished"
        );
        self.total_ms += total_ms;
        self.total_comp_ms += max_comp_ms;
        self.total_comm_ms += comm_ms;

        self.supersteps += 1;
        Ok(())
    }

    /// Pulls every partition's vertex state to the host and invokes the
    /// callback with each vertex's global id, partition-major and
    /// local-index-major. Callers needing global-id order must sort.
    pub fn gather<F>(&mut self, mut callback: F) -> Result<()>
    where
        F: FnMut(VertexId, V),
    {
        let start = Instant::now();
        for i in 0..self.partitions.len() {
            self.sync(i)?;
            let part = &self.partitions[i];
            for j in 0..part.vertex_count {
                callback(part.global_ids[j], part.value(j));
            }
        }
        info!(
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "aggregated results"
        );
        Ok(())
    }
}
