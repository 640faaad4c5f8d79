//! Connection diagnostics: why does a user get only generic explanations?
//!
//! Usually because history items never made it into the graph (ID
//! normalization mismatches) or because candidates share no neighbour with
//! them within the hop budget.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::graph::{EntityId, GraphIndex, Hop};

/// How one candidate relates to the first in-graph history item.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateReport {
    pub candidate: EntityId,
    pub in_graph: bool,
    /// History item the candidate was compared with, if any was in the graph.
    pub compared_with: Option<EntityId>,
    pub direct_links: Vec<Hop>,
    /// Entities adjacent to both the history item and the candidate.
    pub shared_neighbors: Vec<EntityId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConnectionReport {
    pub history_len: usize,
    pub history_in_graph: Vec<EntityId>,
    pub history_missing: Vec<EntityId>,
    pub relation_counts: BTreeMap<String, usize>,
    pub candidates: Vec<CandidateReport>,
}

impl ConnectionReport {
    /// Share of distinct history items that are graph entities.
    pub fn coverage(&self) -> f32 {
        let total = self.history_in_graph.len() + self.history_missing.len();
        if total == 0 {
            return 0.0;
        }
        self.history_in_graph.len() as f32 / total as f32
    }
}

/// Build a connection report for one user's history against some candidates.
pub fn diagnose(index: &GraphIndex, history: &[EntityId], candidates: &[EntityId]) -> ConnectionReport {
    let mut seen = BTreeSet::new();
    let (history_in_graph, history_missing): (Vec<EntityId>, Vec<EntityId>) = history
        .iter()
        .filter(|item| seen.insert(*item))
        .cloned()
        .partition(|item| index.contains(item));

    let anchor = history_in_graph.first();
    let candidates = candidates
        .iter()
        .map(|candidate| {
            let (direct_links, shared_neighbors) = match anchor {
                Some(anchor) => (
                    index.direct_links(anchor, candidate),
                    shared_neighbors(index, anchor, candidate),
                ),
                None => (Vec::new(), Vec::new()),
            };
            CandidateReport {
                candidate: candidate.clone(),
                in_graph: index.contains(candidate),
                compared_with: anchor.cloned(),
                direct_links,
                shared_neighbors,
            }
        })
        .collect();

    ConnectionReport {
        history_len: history.len(),
        history_in_graph,
        history_missing,
        relation_counts: index.stats().relation_counts.clone(),
        candidates,
    }
}

fn shared_neighbors(index: &GraphIndex, a: &EntityId, b: &EntityId) -> Vec<EntityId> {
    let around_a: BTreeSet<&EntityId> = index.neighbors(a).map(|n| n.entity).collect();
    let around_b: BTreeSet<&EntityId> = index.neighbors(b).map(|n| n.entity).collect();
    around_a
        .intersection(&around_b)
        .filter(|entity| **entity != a && **entity != b)
        .map(|entity| (*entity).clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{RelationType, Triple};

    fn id(raw: &str) -> EntityId {
        EntityId::canonical(raw)
    }

    fn index() -> GraphIndex {
        GraphIndex::build(vec![
            Triple::new("s1", RelationType::PerformedBy, "a1"),
            Triple::new("s2", RelationType::PerformedBy, "a1"),
            Triple::new("s1", RelationType::InLanguage, "arabic"),
            Triple::new("s2", RelationType::InLanguage, "arabic"),
            Triple::new("s3", RelationType::InLanguage, "english"),
        ])
    }

    #[test]
    fn test_history_split_by_graph_membership() {
        let history = [id("s404"), id("s1"), id("s1"), id("s3")];
        let report = diagnose(&index(), &history, &[]);
        assert_eq!(report.history_len, 4);
        assert_eq!(report.history_in_graph, vec![id("s1"), id("s3")]);
        assert_eq!(report.history_missing, vec![id("s404")]);
        assert!((report.coverage() - 2.0 / 3.0).abs() < 1e-6);
        assert_eq!(report.relation_counts.get("performed_by"), Some(&2));
    }

    #[test]
    fn test_candidate_shared_neighbors() {
        let report = diagnose(&index(), &[id("s1")], &[id("s2"), id("s3"), id("s9")]);
        let s2 = &report.candidates[0];
        assert!(s2.in_graph);
        assert!(s2.direct_links.is_empty());
        assert_eq!(s2.shared_neighbors, vec![id("a1"), id("arabic")]);
        assert!(report.candidates[1].shared_neighbors.is_empty());
        assert!(!report.candidates[2].in_graph);
    }

    #[test]
    fn test_empty_history() {
        let report = diagnose(&index(), &[], &[id("s2")]);
        assert_eq!(report.coverage(), 0.0);
        assert_eq!(report.candidates[0].compared_with, None);
    }
}
