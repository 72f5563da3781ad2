use crate::error::{Error, Result};
use crate::graph::csr::CsrGraph;

/// Single-source shortest paths by repeated relaxation sweeps over the
/// weighted edges; `None` marks unreachable vertices.
///
/// Quadratic in the worst case, which is fine for the small graphs this
/// oracle is asked about. Each sweep settles at least one more vertex, so
/// `n` sweeps always suffice; the loop stops as soon as a full sweep
/// changes nothing.
pub fn shortest_paths(g: &CsrGraph, root: u32) -> Result<Vec<Option<u64>>> {
    let w = g
        .w
        .as_ref()
        .ok_or_else(|| Error::Config("shortest paths need edge weights".into()))?;

    let n = g.n();
    let mut dist: Vec<Option<u64>> = vec![None; n];
    if let Some(slot) = dist.get_mut(root as usize) {
        *slot = Some(0);
    }

    for _ in 0..n {
        let mut changed = false;
        for u in 0..n {
            let Some(du) = dist[u] else { continue };
            for e in g.offsets[u] as usize..g.offsets[u + 1] as usize {
                let v = g.dst[e] as usize;
                let Some(candidate) = du.checked_add(w[e] as u64) else {
                    continue;
                };
                if dist[v].map_or(true, |dv| candidate < dv) {
                    dist[v] = Some(candidate);
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }

    Ok(dist)
}
