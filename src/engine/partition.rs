use std::sync::atomic::{AtomicU32, AtomicU64, AtomicUsize, Ordering};

use sync_cell_slice::SyncCell;

use super::message::MessageBox;
use crate::error::Result;
use crate::graph::csr::check_row_offsets;
use crate::graph::subgraph::{EdgeTarget, Subgraph};
use crate::{EdgeId, PartitionId, VertexId};

/// Nanosecond accumulators for the three per-superstep kernels. Tasks add
/// their elapsed time; the driver drains them once per superstep.
#[derive(Debug, Default)]
pub(crate) struct KernelTimings {
    pub scatter: AtomicU64,
    pub compact: AtomicU64,
    pub expand: AtomicU64,
}

impl KernelTimings {
    /// Returns (scatter, compact, expand) in milliseconds and resets.
    pub fn take_ms(&self) -> (f64, f64, f64) {
        let ms = |a: &AtomicU64| a.swap(0, Ordering::Relaxed) as f64 / 1e6;
        (ms(&self.scatter), ms(&self.compact), ms(&self.expand))
    }
}

/// One shard's worth of engine state.
///
/// A partition is a plain state bag: it exposes no behavior of its own, and
/// the superstep driver reaches in to run kernels. Kernel-mutable slots use
/// `SyncCell`/atomics because the driver shares partitions with the worker
/// streams; between host fences, each slot is written by at most one worker
/// (its own, except inbox back buffers, which the exchange writes from the
/// source partition's worker).
pub struct Partition<V, M> {
    pub partition_id: PartitionId,
    pub vertex_count: usize,
    pub global_ids: Vec<VertexId>,
    /// CSR row offsets over local outgoing edges, length `vertex_count + 1`.
    pub vertices: Vec<EdgeId>,
    pub edges: Vec<EdgeTarget>,
    pub(crate) vertex_values: Box<[SyncCell<V>]>,
    pub(crate) workset: Box<[AtomicU32]>,
    pub(crate) workqueue: Box<[SyncCell<VertexId>]>,
    pub(crate) workqueue_size: AtomicUsize,
    pub(crate) outboxes: Vec<MessageBox<M>>,
    pub(crate) inboxes: Vec<MessageBox<M>>,
    pub(crate) timings: KernelTimings,
}

impl<V, M> Partition<V, M>
where
    V: Copy + Default + Send + Sync,
    M: Copy + Default + Send + Sync,
{
    /// Builds the partition from a remapped shard descriptor, zeroing the
    /// per-vertex state and sizing one outbox/inbox pair per peer from the
    /// exchanged cross-cut counts. Self-addressed slots get capacity zero;
    /// they are never written.
    pub(crate) fn from_subgraph(
        sub: &Subgraph,
        outbox_caps: &[usize],
        inbox_caps: &[usize],
    ) -> Result<Self> {
        let n = sub.vertex_count();
        check_row_offsets(
            &format!("partition {}", sub.partition_id),
            &sub.offsets,
            n,
            sub.edges.len(),
        )?;

        let outboxes = outbox_caps.iter().map(|&c| MessageBox::new(c)).collect();
        let inboxes = inbox_caps.iter().map(|&c| MessageBox::new(c)).collect();

        Ok(Partition {
            partition_id: sub.partition_id,
            vertex_count: n,
            global_ids: sub.global_ids.clone(),
            vertices: sub.offsets.clone(),
            edges: sub.edges.clone(),
            vertex_values: (0..n).map(|_| SyncCell::new(V::default())).collect(),
            workset: (0..n).map(|_| AtomicU32::new(0)).collect(),
            workqueue: (0..n).map(|_| SyncCell::new(0)).collect(),
            workqueue_size: AtomicUsize::new(0),
            outboxes,
            inboxes,
            timings: KernelTimings::default(),
        })
    }

    pub(crate) fn workqueue_len(&self) -> usize {
        self.workqueue_size.load(Ordering::Acquire).min(self.vertex_count)
    }

    /// Reads one vertex value. Host side only, after a stream fence.
    pub(crate) fn value(&self, local: usize) -> V {
        unsafe { self.vertex_values[local].get() }
    }

    #[cfg(test)]
    pub(crate) fn workset_is_zero(&self) -> bool {
        self.workset
            .iter()
            .all(|w| w.load(Ordering::Relaxed) == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shard() -> Subgraph {
        Subgraph::new(
            0,
            2,
            vec![0, 2],
            vec![0, 1, 2],
            vec![
                EdgeTarget { partition_id: 1, local_id: 0 },
                EdgeTarget { partition_id: 0, local_id: 0 },
            ],
        )
    }

    #[test]
    fn builds_zeroed_state() {
        let part: Partition<i32, i32> =
            Partition::from_subgraph(&shard(), &[0, 1], &[0, 3]).unwrap();
        assert_eq!(part.vertex_count, 2);
        assert_eq!(part.workqueue_len(), 0);
        assert!(part.workset_is_zero());
        assert_eq!(part.value(0), 0);
        assert_eq!(part.outboxes[1].capacity(), 1);
        assert_eq!(part.inboxes[1].capacity(), 3);
        assert_eq!(part.outboxes[0].capacity(), 0);
    }

    #[test]
    fn rejects_short_offsets() {
        let mut sub = shard();
        sub.offsets.pop();
        assert!(Partition::<i32, i32>::from_subgraph(&sub, &[0, 1], &[0, 1]).is_err());
    }

    #[test]
    fn rejects_mismatched_edge_count() {
        let mut sub = shard();
        sub.edges.pop();
        assert!(Partition::<i32, i32>::from_subgraph(&sub, &[0, 1], &[0, 1]).is_err());
    }
}
