//! Bounded BFS path search over the graph index.

use std::collections::{HashSet, VecDeque};

use serde::Serialize;

use super::entity::{EntityId, RelationType};
use super::index::GraphIndex;

/// Default hop budget for path search.
pub const DEFAULT_MAX_HOPS: usize = 2;

/// One traversed edge, with the tag read in the direction of travel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Hop {
    pub from: EntityId,
    pub relation: RelationType,
    pub to: EntityId,
}

/// Ordered hops from a source entity to a target entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Path {
    pub hops: Vec<Hop>,
}

impl Path {
    pub fn new(hops: Vec<Hop>) -> Self {
        Self { hops }
    }

    pub fn len(&self) -> usize {
        self.hops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }

    /// Entities in visiting order, source first.
    pub fn entities(&self) -> Vec<&EntityId> {
        let mut out = Vec::with_capacity(self.hops.len() + 1);
        if let Some(first) = self.hops.first() {
            out.push(&first.from);
        }
        out.extend(self.hops.iter().map(|hop| &hop.to));
        out
    }

    /// True when no entity appears twice.
    pub fn is_simple(&self) -> bool {
        let entities = self.entities();
        let unique: HashSet<_> = entities.iter().collect();
        unique.len() == entities.len()
    }
}

/// Find paths from `source` to `target` using BFS.
///
/// An entity is marked visited the first time it is dequeued and is never
/// expanded again, so only first-visit routes are reported; this favors the
/// shortest, most direct connections. A path reaching `target` is recorded and
/// not extended, while sibling branches keep exploring. Paths longer than
/// `max_hops` are discarded before expansion.
pub fn find_paths(
    index: &GraphIndex,
    source: &EntityId,
    target: &EntityId,
    max_hops: usize,
) -> Vec<Path> {
    if source == target || !index.contains(source) || !index.contains(target) {
        return Vec::new();
    }

    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    let mut reported = HashSet::new();
    let mut result = Vec::new();

    queue.push_back((source.clone(), Vec::<Hop>::new()));

    while let Some((entity, hops)) = queue.pop_front() {
        if hops.len() > max_hops {
            continue;
        }

        if &entity == target && !hops.is_empty() {
            let path = Path::new(hops);
            // Inverse-pair twins produce the same directed hop sequence.
            if reported.insert(path.clone()) {
                result.push(path);
            }
            continue;
        }

        if !visited.insert(entity.clone()) {
            continue;
        }

        if hops.len() == max_hops {
            continue;
        }

        for neighbor in index.neighbors(&entity) {
            if neighbor.entity != target && visited.contains(neighbor.entity) {
                continue;
            }
            let mut next = hops.clone();
            next.push(Hop {
                from: entity.clone(),
                relation: neighbor.directed_relation(),
                to: neighbor.entity.clone(),
            });
            queue.push_back((neighbor.entity.clone(), next));
        }
    }

    log::debug!(
        "find_paths {} -> {} (max_hops={}): {} paths, {} entities visited",
        source,
        target,
        max_hops,
        result.len(),
        visited.len()
    );

    result
}
