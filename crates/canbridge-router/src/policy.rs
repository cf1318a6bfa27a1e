use std::collections::HashMap;

use crate::config::Policy;
use crate::error::PolicyError;

/// Static source → destinations adjacency over link indices.
///
/// Resolved once from a [`Policy`] and the configured link names, then never
/// mutated. Index `i` refers to the `i`-th configured link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardingTable {
    names: Vec<String>,
    adjacency: Vec<Vec<usize>>,
}

impl ForwardingTable {
    /// Resolve `policy` against the configured link names.
    pub fn resolve(policy: &Policy, names: &[String]) -> Result<Self, PolicyError> {
        if names.is_empty() {
            return Err(PolicyError::NoLinks);
        }

        let mut index_of = HashMap::with_capacity(names.len());
        for (index, name) in names.iter().enumerate() {
            if index_of.insert(name.as_str(), index).is_some() {
                return Err(PolicyError::DuplicateLink(name.clone()));
            }
        }

        let mut table = Self {
            names: names.to_vec(),
            adjacency: vec![Vec::new(); names.len()],
        };

        match policy {
            Policy::Monitor => {}
            Policy::Forward => {
                if names.len() < 2 {
                    return Err(PolicyError::RingTooSmall(names.len()));
                }
                for source in 0..names.len() {
                    table.adjacency[source].push((source + 1) % names.len());
                }
            }
            Policy::Routes(routes) => {
                for route in routes {
                    let source = *index_of
                        .get(route.source.as_str())
                        .ok_or_else(|| PolicyError::UnknownLink(route.source.clone()))?;
                    let destination = *index_of
                        .get(route.destination.as_str())
                        .ok_or_else(|| PolicyError::UnknownLink(route.destination.clone()))?;
                    if source == destination {
                        return Err(PolicyError::SelfLoop(route.source.clone()));
                    }
                    let targets = &mut table.adjacency[source];
                    if !targets.contains(&destination) {
                        targets.push(destination);
                    }
                }
            }
        }

        Ok(table)
    }

    /// Destinations for frames received on link `source`.
    pub fn destinations(&self, source: usize) -> &[usize] {
        self.adjacency.get(source).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Name of link `index`.
    pub fn name(&self, index: usize) -> &str {
        self.names.get(index).map_or("?", String::as_str)
    }

    /// Configured link names in index order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn link_count(&self) -> usize {
        self.names.len()
    }

    /// Every rule as `(source, destination)` names, in table order.
    pub fn rules(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(move |(source, targets)| {
                targets
                    .iter()
                    .map(move |&destination| (self.name(source), self.name(destination)))
            })
    }

    /// True when nothing is ever forwarded.
    pub fn is_monitor_only(&self) -> bool {
        self.adjacency.iter().all(Vec::is_empty)
    }
}
