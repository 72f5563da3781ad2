//! The per-partition kernels. Each is a one-pass routine over a flat index
//! space, run as a single task on the owning partition's stream; writes go
//! to slots this partition owns, plus atomically reserved outbox slots.

use std::sync::atomic::Ordering;

use super::message::VertexMessage;
use super::partition::Partition;
use super::program::VertexProgram;
use crate::VertexId;

/// Folds one peer inbox into local vertex state: every message whose
/// receiver still satisfies `cond` gets updated and flagged in the workset.
pub(crate) fn scatter<P>(
    part: &Partition<P::VertexValue, P::MessageValue>,
    peer: usize,
    program: &P,
) where
    P: VertexProgram,
{
    let inbox = &part.inboxes[peer];
    for i in 0..inbox.len() {
        let msg = inbox.message(i);
        let r = msg.receiver as usize;
        if program.cond(part.value(r)) {
            let incoming = program.unpack(msg.value);
            unsafe { part.vertex_values[r].set(program.update(incoming)) };
            part.workset[r].store(1, Ordering::Relaxed);
        }
    }
}

/// Condenses the workset into a dense workqueue, clearing every flag it
/// consumes. Queue order is unspecified.
pub(crate) fn compact<V, M>(part: &Partition<V, M>)
where
    V: Copy + Default + Send + Sync,
    M: Copy + Default + Send + Sync,
{
    part.workqueue_size.store(0, Ordering::Relaxed);
    for u in 0..part.vertex_count {
        if part.workset[u].swap(0, Ordering::Relaxed) == 1 {
            let offset = part.workqueue_size.fetch_add(1, Ordering::Relaxed);
            unsafe { part.workqueue[offset].set(u as VertexId) };
        }
    }
}

/// Walks the outgoing edges of every queued vertex. Local destinations are
/// updated in place and re-flagged; remote destinations become packed
/// messages in the peer-facing outbox.
pub(crate) fn expand<P>(part: &Partition<P::VertexValue, P::MessageValue>, program: &P)
where
    P: VertexProgram,
{
    let this_pid = part.partition_id;
    let queued = part.workqueue_len();
    for i in 0..queued {
        let u = unsafe { part.workqueue[i].get() } as usize;
        let first = part.vertices[u] as usize;
        let last = part.vertices[u + 1] as usize;

        for e in first..last {
            let target = part.edges[e];
            if target.partition_id == this_pid {
                let d = target.local_id as usize;
                if program.cond(part.value(d)) {
                    unsafe { part.vertex_values[d].set(program.update(part.value(u))) };
                    part.workset[d].store(1, Ordering::Relaxed);
                }
            } else {
                part.outboxes[target.partition_id as usize].push(VertexMessage {
                    receiver: target.local_id,
                    value: program.pack(part.value(u)),
                });
            }
        }
    }
}

/// Applies `f` to every local vertex value.
pub(crate) fn vertex_map<V, M, F>(part: &Partition<V, M>, f: &F)
where
    V: Copy + Default + Send + Sync,
    M: Copy + Default + Send + Sync,
    F: Fn(V) -> V,
{
    for u in 0..part.vertex_count {
        unsafe { part.vertex_values[u].set(f(part.value(u))) };
    }
}

/// Applies `f` to every local vertex value, passing the global id as well.
pub(crate) fn vertex_map_with_id<V, M, F>(part: &Partition<V, M>, f: &F)
where
    V: Copy + Default + Send + Sync,
    M: Copy + Default + Send + Sync,
    F: Fn(VertexId, V) -> V,
{
    for u in 0..part.vertex_count {
        unsafe {
            part.vertex_values[u].set(f(part.global_ids[u], part.value(u)));
        }
    }
}

/// Scans for the vertex with global id `id`; on a match, applies `f` and
/// activates the vertex. The global id is not indexed, so this is a full
/// scan of the shard.
pub(crate) fn vertex_filter<V, M, F>(part: &Partition<V, M>, id: VertexId, f: &F)
where
    V: Copy + Default + Send + Sync,
    M: Copy + Default + Send + Sync,
    F: Fn(V) -> V,
{
    for u in 0..part.vertex_count {
        if part.global_ids[u] == id {
            unsafe { part.vertex_values[u].set(f(part.value(u))) };
            part.workset[u].store(1, Ordering::Relaxed);
        }
    }
}
