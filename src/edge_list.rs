use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::graph::{Edge, VInt, Weight};

/// Read a whitespace separated edge list, one `src dst [weight]` per line.
pub fn read_edge_list<P: AsRef<Path>>(path: P) -> Result<Vec<Edge>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Cannot open edge list {}", path.display()))?;
    parse_edge_list(BufReader::new(file)).with_context(|| format!("Cannot parse edge list {}", path.display()))
}

/// Parse edges from any reader. Blank lines and lines starting with `#` or
/// `%` are skipped, a missing weight counts as 1.
pub fn parse_edge_list<R: BufRead>(reader: R) -> Result<Vec<Edge>> {
    let mut edges = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('%') {
            continue;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != 2 && tokens.len() != 3 {
            bail!("line {}: expected `src dst [weight]`, got {:?}", line_no + 1, line);
        }
        let src: VInt = tokens[0]
            .parse()
            .with_context(|| format!("line {}: bad node id {:?}", line_no + 1, tokens[0]))?;
        let dst: VInt = tokens[1]
            .parse()
            .with_context(|| format!("line {}: bad node id {:?}", line_no + 1, tokens[1]))?;
        let weight: Weight = match tokens.get(2) {
            Some(token) => token
                .parse()
                .with_context(|| format!("line {}: bad weight {:?}", line_no + 1, token))?,
            None => 1,
        };
        edges.push((src, dst, weight));
    }
    Ok(edges)
}
