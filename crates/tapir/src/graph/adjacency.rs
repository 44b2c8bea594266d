use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

/// Undirected neighbour listing derived from a graph's edges.
///
/// Built once per graph load; only nodes that take part in at least one edge are listed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdjacencyView {
    neighbors: BTreeMap<String, BTreeSet<String>>,
}

/// One row of the connections listing: a node and its comma-joined neighbour ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Connection {
    pub district: String,
    pub connected: String,
}

impl AdjacencyView {
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut neighbors: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (a, b) in pairs {
            neighbors
                .entry(a.to_string())
                .or_default()
                .insert(b.to_string());
            neighbors
                .entry(b.to_string())
                .or_default()
                .insert(a.to_string());
        }
        Self { neighbors }
    }

    pub fn neighbors(&self, id: &str) -> Option<&BTreeSet<String>> {
        self.neighbors.get(id)
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.neighbors.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Rows sorted by node id, neighbours sorted and joined with `", "`.
    pub fn connections(&self) -> Vec<Connection> {
        self.neighbors
            .iter()
            .map(|(district, set)| Connection {
                district: district.clone(),
                connected: set
                    .iter()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            })
            .collect()
    }
}
