use crate::error::{Error, Result};

/// The logical graph: CSR over global vertex ids, before partitioning.
///
/// Edge weights are carried for user-level consumers (the host-side
/// shortest-path oracle, weighted gather kernels); the engine itself never
/// reads them.
#[derive(Debug, Clone)]
pub struct CsrGraph {
    pub offsets: Vec<u32>, // len = n+1
    pub dst: Vec<u32>,     // len = m
    pub w: Option<Vec<u32>>,
}

/// Min/max/mean out-degree of a graph.
#[derive(Debug, Clone, Copy, Default)]
pub struct DegreeSummary {
    pub min: u32,
    pub max: u32,
    pub mean: f64,
}

/// Checks one CSR row-offset array: right length, starts at zero,
/// non-decreasing, and covering exactly `edge_count` edges. Shared between
/// logical-graph validation and partition construction, which carry the
/// same shape with different edge types.
pub(crate) fn check_row_offsets(
    context: &str,
    offsets: &[u32],
    vertex_count: usize,
    edge_count: usize,
) -> Result<()> {
    if offsets.len() != vertex_count + 1 {
        return Err(Error::Config(format!(
            "{context}: {} row offsets for {vertex_count} vertices",
            offsets.len()
        )));
    }
    if offsets[0] != 0 {
        return Err(Error::Config(format!(
            "{context}: row offsets must start at 0"
        )));
    }
    if let Some(v) = offsets.windows(2).position(|pair| pair[0] > pair[1]) {
        return Err(Error::Config(format!(
            "{context}: row offsets decrease at vertex {v}"
        )));
    }
    if offsets[vertex_count] as usize != edge_count {
        return Err(Error::Config(format!(
            "{context}: row offsets cover {} edges, have {edge_count}",
            offsets[vertex_count]
        )));
    }
    Ok(())
}

impl CsrGraph {
    pub fn n(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    pub fn m(&self) -> usize {
        self.dst.len()
    }

    pub fn neighbors(&self, u: u32) -> &[u32] {
        let u = u as usize;
        let start = self.offsets[u] as usize;
        let end = self.offsets[u + 1] as usize;
        &self.dst[start..end]
    }

    pub fn out_degree(&self, u: u32) -> u32 {
        let u = u as usize;
        self.offsets[u + 1] - self.offsets[u]
    }

    /// Structural validation, run once before partitioning: offset shape,
    /// edge targets in range, weight array aligned with the edges.
    pub fn validate(&self) -> Result<()> {
        check_row_offsets("graph", &self.offsets, self.n(), self.m())?;
        let n = self.n() as u32;
        if let Some(&d) = self.dst.iter().find(|&&d| d >= n) {
            return Err(Error::Config(format!(
                "edge target {d} exceeds vertex count {n}"
            )));
        }
        if let Some(w) = &self.w {
            if w.len() != self.m() {
                return Err(Error::Config(format!(
                    "{} weights for {} edges",
                    w.len(),
                    self.m()
                )));
            }
        }
        Ok(())
    }

    pub fn degree_summary(&self) -> DegreeSummary {
        let n = self.n();
        if n == 0 {
            return DegreeSummary::default();
        }
        let mut summary = DegreeSummary {
            min: u32::MAX,
            max: 0,
            mean: 0.0,
        };
        for u in 0..n as u32 {
            let d = self.out_degree(u);
            summary.min = summary.min.min(d);
            summary.max = summary.max.max(d);
            summary.mean += d as f64;
        }
        summary.mean /= n as f64;
        summary
    }

    /// Builds a CSR from an unordered edge list with counting sort.
    /// `n` must be at least `max(src, dst) + 1` over all edges.
    pub fn from_edges(n: usize, edges: &[(u32, u32)], weights: Option<&[u32]>) -> Self {
        if let Some(w) = weights {
            debug_assert_eq!(w.len(), edges.len());
        }

        let mut deg = vec![0u32; n];
        for &(u, _) in edges {
            deg[u as usize] += 1;
        }

        let mut offsets = vec![0u32; n + 1];
        let mut sum: u64 = 0;
        for i in 0..n {
            offsets[i] = sum as u32;
            sum += deg[i] as u64;
        }
        offsets[n] = sum as u32;

        let mut cursor: Vec<u32> = offsets[..n].to_vec();
        let mut dst = vec![0u32; edges.len()];
        let mut w = weights.map(|_| vec![0u32; edges.len()]);

        for (i, &(u, v)) in edges.iter().enumerate() {
            let p = cursor[u as usize] as usize;
            dst[p] = v;
            if let (Some(w), Some(ws)) = (w.as_mut(), weights) {
                w[p] = ws[i];
            }
            cursor[u as usize] += 1;
        }

        CsrGraph { offsets, dst, w }
    }
}
