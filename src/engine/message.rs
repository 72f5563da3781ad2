use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use sync_cell_slice::SyncCell;

use crate::VertexId;

/// One cross-partition update: which local slot of the receiving partition,
/// and the packed payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct VertexMessage<M> {
    pub receiver: VertexId,
    pub value: M,
}

/// Fixed-capacity, double-buffered message queue between one ordered pair of
/// partitions.
///
/// The front buffer is the readable side: an outbox's front is filled by
/// `push` during expand and read by the peer's receive copy; an inbox's
/// front is read by scatter. `recv_msgs` always lands in the back buffer, so
/// messages produced in superstep `t` become visible to scatter only after
/// `swap_buffers`, in step `t+1`.
///
/// Capacity is fixed at construction from the partitioner's cross-cut count
/// and is never resized. `push` bounds-checks the atomically reserved
/// offset; an out-of-range reservation drops the message and trips the
/// overflow flag, which the driver turns into a superstep-level error.
pub struct MessageBox<M> {
    buffers: [Box<[SyncCell<VertexMessage<M>>]>; 2],
    lengths: [AtomicUsize; 2],
    front: AtomicUsize,
    capacity: usize,
    overflow: AtomicBool,
}

fn buffer<M: Copy + Default>(capacity: usize) -> Box<[SyncCell<VertexMessage<M>>]> {
    (0..capacity)
        .map(|_| SyncCell::new(VertexMessage::default()))
        .collect()
}

impl<M: Copy + Default + Send + Sync> MessageBox<M> {
    pub fn new(capacity: usize) -> Self {
        MessageBox {
            buffers: [buffer(capacity), buffer(capacity)],
            lengths: [AtomicUsize::new(0), AtomicUsize::new(0)],
            front: AtomicUsize::new(0),
            capacity,
            overflow: AtomicBool::new(false),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of readable messages in the front buffer.
    pub fn len(&self) -> usize {
        let front = self.front.load(Ordering::Acquire);
        self.lengths[front].load(Ordering::Acquire).min(self.capacity)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let front = self.front.load(Ordering::Acquire);
        self.lengths[front].store(0, Ordering::Release);
        self.overflow.store(false, Ordering::Release);
    }

    pub fn overflowed(&self) -> bool {
        self.overflow.load(Ordering::Acquire)
    }

    /// Reserves a front slot and writes `msg` into it.
    ///
    /// Only the owning partition's worker pushes, but the reservation stays
    /// atomic so the host can read lengths concurrently and so the protocol
    /// matches the kernel contract.
    pub(crate) fn push(&self, msg: VertexMessage<M>) {
        let front = self.front.load(Ordering::Acquire);
        let offset = self.lengths[front].fetch_add(1, Ordering::AcqRel);
        if offset >= self.capacity {
            self.overflow.store(true, Ordering::Release);
            return;
        }
        // Slot `offset` is uniquely reserved; no other writer touches it
        // before the next fence.
        unsafe { self.buffers[front][offset].set(msg) };
    }

    /// Reads message `i` of the front buffer.
    pub(crate) fn message(&self, i: usize) -> VertexMessage<M> {
        let front = self.front.load(Ordering::Acquire);
        debug_assert!(i < self.len());
        unsafe { self.buffers[front][i].get() }
    }

    /// Copies the peer outbox's readable messages into this box's back
    /// buffer. Runs as a task on the *source* partition's stream, after its
    /// expand, so the copied bytes reflect a completed expand.
    pub(crate) fn recv_msgs(&self, peer_outbox: &MessageBox<M>) {
        let back = 1 - self.front.load(Ordering::Acquire);
        let n = peer_outbox.len();
        if n > self.capacity {
            // Receiver sized below the sender's cross cut: keep what fits
            // and flag the overflow for the driver to fail the superstep.
            self.overflow.store(true, Ordering::Release);
        }
        let n = n.min(self.capacity);
        for i in 0..n {
            unsafe { self.buffers[back][i].set(peer_outbox.message(i)) };
        }
        self.lengths[back].store(n, Ordering::Release);
    }

    /// Length of the back (just-received) buffer.
    #[cfg(test)]
    pub(crate) fn recv_len(&self) -> usize {
        let back = 1 - self.front.load(Ordering::Acquire);
        self.lengths[back].load(Ordering::Acquire)
    }

    /// Exchanges the roles of the front and back buffers without moving
    /// data; the new back buffer's length is reset so the next receive
    /// starts clean.
    pub fn swap_buffers(&self) {
        let old_front = self.front.load(Ordering::Acquire);
        self.front.store(1 - old_front, Ordering::Release);
        self.lengths[old_front].store(0, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(receiver: VertexId, value: i32) -> VertexMessage<i32> {
        VertexMessage { receiver, value }
    }

    #[test]
    fn push_then_read() {
        let outbox = MessageBox::new(4);
        outbox.push(msg(3, 30));
        outbox.push(msg(1, 10));
        assert_eq!(outbox.len(), 2);
        assert_eq!(outbox.message(0).receiver, 3);
        assert_eq!(outbox.message(1).value, 10);
        assert!(!outbox.overflowed());
    }

    #[test]
    fn clear_resets_length() {
        let outbox = MessageBox::new(2);
        outbox.push(msg(0, 1));
        outbox.clear();
        assert!(outbox.is_empty());
    }

    #[test]
    fn overflow_trips_flag_and_drops() {
        let outbox = MessageBox::new(1);
        outbox.push(msg(0, 1));
        outbox.push(msg(1, 2));
        assert!(outbox.overflowed());
        assert_eq!(outbox.len(), 1);
        assert_eq!(outbox.message(0).receiver, 0);
    }

    #[test]
    fn received_messages_appear_after_swap() {
        let outbox = MessageBox::new(3);
        let inbox = MessageBox::new(3);
        outbox.push(msg(2, 20));
        outbox.push(msg(0, 5));

        inbox.recv_msgs(&outbox);
        // BSP boundary: nothing readable until the swap
        assert_eq!(inbox.len(), 0);
        assert_eq!(inbox.recv_len(), 2);

        inbox.swap_buffers();
        assert_eq!(inbox.len(), 2);
        assert_eq!(inbox.message(0).value, 20);
        assert_eq!(inbox.recv_len(), 0);
    }

    #[test]
    fn swap_alternates_buffers() {
        let outbox = MessageBox::new(2);
        let inbox = MessageBox::new(2);

        outbox.push(msg(0, 1));
        inbox.recv_msgs(&outbox);
        inbox.swap_buffers();
        assert_eq!(inbox.message(0).value, 1);

        outbox.clear();
        outbox.push(msg(0, 2));
        outbox.push(msg(1, 3));
        inbox.recv_msgs(&outbox);
        // old front still readable until the swap
        assert_eq!(inbox.len(), 1);
        inbox.swap_buffers();
        assert_eq!(inbox.len(), 2);
        assert_eq!(inbox.message(1).value, 3);
    }

    #[test]
    fn zero_capacity_box_is_inert() {
        let b: MessageBox<i32> = MessageBox::new(0);
        assert_eq!(b.len(), 0);
        b.push(msg(0, 1));
        assert!(b.overflowed());
    }
}
