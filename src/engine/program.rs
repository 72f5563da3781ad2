/// The capability set that parameterizes a run: four pure functions bundled
/// in one object, shared with every partition's kernels.
///
/// `update` must be monotone under the algorithm's meet/join semantics
/// (e.g. min for BFS depth): several scatter or expand work items may target
/// the same destination vertex in one superstep, the engine does not
/// arbitrate, and the surviving value is the last writer's. All four
/// functions must be deterministic and free of external state.
pub trait VertexProgram: Send + Sync + 'static {
    type VertexValue: Copy + Default + Send + Sync + 'static;
    type MessageValue: Copy + Default + Send + Sync + 'static;

    /// Gates updates: a destination is only written (and activated) while
    /// this holds for its current value.
    fn cond(&self, value: Self::VertexValue) -> bool;

    /// Produces the destination's new value from a neighbor's value (local
    /// edge) or an unpacked message (remote edge).
    fn update(&self, value: Self::VertexValue) -> Self::VertexValue;

    /// Serializes a vertex value for cross-partition transmission.
    fn pack(&self, value: Self::VertexValue) -> Self::MessageValue;

    /// Inverse of `pack` on the receiving side. The engine never mutates
    /// the payload in transit.
    fn unpack(&self, msg: Self::MessageValue) -> Self::VertexValue;
}
