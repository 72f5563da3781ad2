use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::csr::CsrGraph;
use crate::error::{Error, Result};

/// One parsed line: `source target [edgeValue]`.
type ParsedEdge = (u32, u32, Option<u32>);

fn parse_edge(path: &Path, lineno: u64, line: &str) -> Result<Option<ParsedEdge>> {
    let s = line.trim();
    if s.is_empty() || s.starts_with('#') {
        return Ok(None);
    }

    let mut it = s.split_whitespace();
    let bad = |reason: String| Error::Parse {
        path: path.to_path_buf(),
        line: lineno,
        reason,
    };

    let u: u32 = it
        .next()
        .ok_or_else(|| bad("missing source field".into()))?
        .parse()
        .map_err(|e| bad(format!("source: {e}")))?;
    let v: u32 = it
        .next()
        .ok_or_else(|| bad("missing target field".into()))?
        .parse()
        .map_err(|e| bad(format!("target: {e}")))?;
    let w = match it.next() {
        Some(tok) => Some(tok.parse().map_err(|e| bad(format!("edge value: {e}")))?),
        None => None,
    };

    Ok(Some((u, v, w)))
}

/// Reads a whitespace-separated edge list into a [`CsrGraph`].
///
/// Lines beginning with `#` and blank lines are skipped. The vertex count is
/// `max id + 1`. If any line carries an edge value, every edge gets a weight
/// (1 where the line omitted it); otherwise the graph is unweighted.
pub fn read_graph(path: impl AsRef<Path>) -> Result<CsrGraph> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::GraphIo {
        path: path.to_path_buf(),
        source: e,
    })?;
    let reader = BufReader::new(file);

    let mut edges: Vec<(u32, u32)> = Vec::new();
    let mut weights: Vec<u32> = Vec::new();
    let mut any_weight = false;
    let mut max_id: Option<u32> = None;

    for (i, line) in reader.lines().enumerate() {
        let lineno = i as u64 + 1;
        let line = line.map_err(|e| Error::GraphIo {
            path: path.to_path_buf(),
            source: e,
        })?;
        if let Some((u, v, w)) = parse_edge(path, lineno, &line)? {
            edges.push((u, v));
            weights.push(w.unwrap_or(1));
            any_weight |= w.is_some();
            max_id = Some(max_id.map_or(u.max(v), |m| m.max(u).max(v)));
        }
    }

    let n = max_id.map_or(0, |m| m as usize + 1);
    let w = any_weight.then_some(weights.as_slice());
    Ok(CsrGraph::from_edges(n, &edges, w))
}
