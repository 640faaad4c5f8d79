//! Adjacency index over relation triples.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use super::entity::{Direction, EntityId, RelationType, Triple};
use super::traversal::Hop;

/// One edge touching a queried entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbor<'a> {
    /// Tag as stored on the triple.
    pub relation: &'a RelationType,
    /// The entity at the other end of the triple.
    pub entity: &'a EntityId,
    /// Whether the queried entity was the head or the tail.
    pub direction: Direction,
}

impl Neighbor<'_> {
    /// Tag read from the queried entity toward the neighbor.
    pub fn directed_relation(&self) -> RelationType {
        match self.direction {
            Direction::Head => self.relation.clone(),
            Direction::Tail => self.relation.inverse(),
        }
    }
}

/// Summary counters collected while building the index.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GraphStats {
    pub entity_count: usize,
    pub triple_count: usize,
    pub duplicates_dropped: usize,
    /// Known-tag triples whose inverse twin is absent.
    pub missing_inverse: usize,
    pub relation_counts: BTreeMap<String, usize>,
}

/// Immutable adjacency structure: an arena of triples addressed by entity.
///
/// Built once from the full triple set and read-only afterwards, so it can be
/// shared across threads behind an `Arc` without locking.
#[derive(Debug, Default)]
pub struct GraphIndex {
    triples: Vec<Triple>,
    adjacency: HashMap<EntityId, Vec<usize>>,
    stats: GraphStats,
}

impl GraphIndex {
    /// Build the index, dropping exact duplicate triples.
    pub fn build<I>(triples: I) -> Self
    where
        I: IntoIterator<Item = Triple>,
    {
        let mut seen = HashSet::new();
        let mut arena = Vec::new();
        let mut adjacency: HashMap<EntityId, Vec<usize>> = HashMap::new();
        let mut duplicates_dropped = 0;

        for triple in triples {
            if !seen.insert(triple.clone()) {
                duplicates_dropped += 1;
                continue;
            }
            let slot = arena.len();
            adjacency.entry(triple.head.clone()).or_default().push(slot);
            // Self-loops are recorded once.
            if triple.tail != triple.head {
                adjacency.entry(triple.tail.clone()).or_default().push(slot);
            }
            arena.push(triple);
        }

        let mut relation_counts = BTreeMap::new();
        let mut missing_inverse = 0;
        for triple in &arena {
            *relation_counts
                .entry(triple.relation.as_str().to_string())
                .or_insert(0) += 1;
            if triple.relation.is_known() && !seen.contains(&triple.inverse()) {
                missing_inverse += 1;
            }
        }

        if duplicates_dropped > 0 {
            log::info!("Dropped {} duplicate triples", duplicates_dropped);
        }
        if missing_inverse > 0 {
            log::warn!(
                "{} triples have no inverse twin; traversal still works through untyped adjacency",
                missing_inverse
            );
        }

        let stats = GraphStats {
            entity_count: adjacency.len(),
            triple_count: arena.len(),
            duplicates_dropped,
            missing_inverse,
            relation_counts,
        };
        log::info!(
            "Graph index built: {} entities, {} triples",
            stats.entity_count,
            stats.triple_count
        );

        Self {
            triples: arena,
            adjacency,
            stats,
        }
    }

    /// Every triple touching `entity`. Unknown entities have no neighbors.
    pub fn neighbors<'a>(&'a self, entity: &EntityId) -> impl Iterator<Item = Neighbor<'a>> + 'a {
        let slots = self
            .adjacency
            .get(entity)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let entity = entity.clone();
        slots.iter().map(move |&slot| {
            let triple = &self.triples[slot];
            if triple.head == entity {
                Neighbor {
                    relation: &triple.relation,
                    entity: &triple.tail,
                    direction: Direction::Head,
                }
            } else {
                Neighbor {
                    relation: &triple.relation,
                    entity: &triple.head,
                    direction: Direction::Tail,
                }
            }
        })
    }

    /// Triples linking `from` and `to` directly, as hops read from `from`.
    pub fn direct_links(&self, from: &EntityId, to: &EntityId) -> Vec<Hop> {
        if from == to {
            return Vec::new();
        }
        self.neighbors(from)
            .filter(|n| n.entity == to)
            .map(|n| Hop {
                from: from.clone(),
                relation: n.directed_relation(),
                to: to.clone(),
            })
            .collect()
    }

    pub fn contains(&self, entity: &EntityId) -> bool {
        self.adjacency.contains_key(entity)
    }

    pub fn degree(&self, entity: &EntityId) -> usize {
        self.adjacency.get(entity).map_or(0, Vec::len)
    }

    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    pub fn stats(&self) -> &GraphStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_triples() -> Vec<Triple> {
        vec![
            Triple::new("s1", RelationType::PerformedBy, "a1"),
            Triple::new("a1", RelationType::Performs, "s1"),
            Triple::new("s1", RelationType::InLanguage, "arabic"),
            Triple::new("arabic", RelationType::LanguageOfSong, "s1"),
        ]
    }

    #[test]
    fn test_neighbors_report_direction() {
        let index = GraphIndex::build(sample_triples());
        for triple in index.triples() {
            let from_head: Vec<_> = index.neighbors(&triple.head).collect();
            assert!(from_head.iter().any(|n| n.relation == &triple.relation
                && n.entity == &triple.tail
                && n.direction == Direction::Head));
            let from_tail: Vec<_> = index.neighbors(&triple.tail).collect();
            assert!(from_tail.iter().any(|n| n.relation == &triple.relation
                && n.entity == &triple.head
                && n.direction == Direction::Tail));
        }
    }

    #[test]
    fn test_neighbors_of_unknown_entity_is_empty() {
        let index = GraphIndex::build(sample_triples());
        assert_eq!(index.neighbors(&EntityId::canonical("missing")).count(), 0);
        assert!(!index.contains(&EntityId::canonical("missing")));
    }

    #[test]
    fn test_build_drops_duplicates() {
        let mut triples = sample_triples();
        triples.push(Triple::new("s1", RelationType::PerformedBy, "a1"));
        triples.push(Triple::new(" S1 ", RelationType::PerformedBy, "A1"));
        let index = GraphIndex::build(triples);
        assert_eq!(index.stats().triple_count, 4);
        assert_eq!(index.stats().duplicates_dropped, 2);
        assert_eq!(index.degree(&EntityId::canonical("s1")), 4);
    }

    #[test]
    fn test_stats_count_missing_inverse() {
        let index = GraphIndex::build(vec![
            Triple::new("s1", RelationType::PerformedBy, "a1"),
            Triple::new("s1", RelationType::Other("remix_of".into()), "s2"),
        ]);
        let stats = index.stats();
        assert_eq!(stats.missing_inverse, 1);
        assert_eq!(stats.entity_count, 3);
        assert_eq!(stats.relation_counts.get("performed_by"), Some(&1));
        assert_eq!(stats.relation_counts.get("remix_of"), Some(&1));
    }

    #[test]
    fn test_direct_links_read_from_source() {
        let index = GraphIndex::build(sample_triples());
        let s1 = EntityId::canonical("s1");
        let a1 = EntityId::canonical("a1");
        let links = index.direct_links(&s1, &a1);
        assert_eq!(links.len(), 2);
        assert!(links.iter().all(|h| h.relation == RelationType::PerformedBy));
        let back = index.direct_links(&a1, &s1);
        assert!(back.iter().all(|h| h.relation == RelationType::Performs));
        assert!(index.direct_links(&s1, &s1).is_empty());
    }

    #[test]
    fn test_index_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GraphIndex>();
    }
}
