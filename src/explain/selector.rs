//! Selects a small, non-redundant set of explanations for one candidate.

use std::collections::HashSet;

use super::render::{relation_phrase, PathRenderer};
use super::{Explanation, ExplanationKind, FALLBACK_NEW_USER, FALLBACK_WITH_HISTORY};
use crate::graph::{find_paths, EntityId, GraphIndex, Path};
use crate::ingest::NameDictionary;

/// Default number of explanations attached to a candidate.
pub const DEFAULT_BUDGET: usize = 3;

/// Explain why `candidate` fits a user with the given `history`.
///
/// Direct links between a history item and the candidate come first, then
/// multi-hop paths for history items without a direct link, both in history
/// order. Duplicate texts are dropped and the result is cut at `budget`.
/// When nothing connects, a single generic explanation is returned
/// (unless `budget` is zero).
pub fn explain(
    index: &GraphIndex,
    names: &NameDictionary,
    history: &[EntityId],
    candidate: &EntityId,
    max_hops: usize,
    budget: usize,
) -> Vec<Explanation> {
    select_explanations(index, names, history, candidate, budget, |source, target| {
        find_paths(index, source, target, max_hops)
    })
}

/// Selection with a pluggable path search, so callers can put a cache in
/// front of [`find_paths`].
pub(crate) fn select_explanations<F>(
    index: &GraphIndex,
    names: &NameDictionary,
    history: &[EntityId],
    candidate: &EntityId,
    budget: usize,
    mut search: F,
) -> Vec<Explanation>
where
    F: FnMut(&EntityId, &EntityId) -> Vec<Path>,
{
    if budget == 0 {
        return Vec::new();
    }

    let mut selection = Selection::new(budget);

    // Repeated plays of the same song explain nothing new.
    let mut seen_sources = HashSet::new();
    let sources: Vec<&EntityId> = history
        .iter()
        .filter(|item| seen_sources.insert(*item))
        .collect();

    let mut directly_linked = HashSet::new();
    for source in &sources {
        for hop in index.direct_links(source, candidate) {
            directly_linked.insert(*source);
            let text = format!(
                "You liked '{}' which is {} this song",
                names.name_or_id(source),
                relation_phrase(&hop.relation)
            );
            selection.offer(Explanation {
                text,
                kind: ExplanationKind::Direct,
                source: Some((*source).clone()),
                path: Path::new(vec![hop]),
            });
            if selection.is_full() {
                return selection.finish();
            }
        }
    }

    let renderer = PathRenderer::new(names);
    for source in &sources {
        if directly_linked.contains(source) {
            continue;
        }
        for path in search(*source, candidate) {
            let text = format!(
                "Connected to '{}' via: {}",
                names.name_or_id(source),
                renderer.render(&path)
            );
            selection.offer(Explanation {
                text,
                kind: ExplanationKind::MultiHop,
                source: Some((*source).clone()),
                path,
            });
            if selection.is_full() {
                return selection.finish();
            }
        }
    }

    if selection.is_empty() {
        let text = if history.is_empty() {
            FALLBACK_NEW_USER
        } else {
            FALLBACK_WITH_HISTORY
        };
        return vec![Explanation::fallback(text)];
    }

    selection.finish()
}

/// Discovery-ordered explanations, unique by text, capped at the budget.
struct Selection {
    budget: usize,
    texts: HashSet<String>,
    chosen: Vec<Explanation>,
}

impl Selection {
    fn new(budget: usize) -> Self {
        Self {
            budget,
            texts: HashSet::new(),
            chosen: Vec::with_capacity(budget),
        }
    }

    fn offer(&mut self, explanation: Explanation) {
        if self.is_full() || !self.texts.insert(explanation.text.clone()) {
            return;
        }
        self.chosen.push(explanation);
    }

    fn is_full(&self) -> bool {
        self.chosen.len() >= self.budget
    }

    fn is_empty(&self) -> bool {
        self.chosen.is_empty()
    }

    fn finish(self) -> Vec<Explanation> {
        self.chosen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{RelationType, Triple, DEFAULT_MAX_HOPS};

    fn id(raw: &str) -> EntityId {
        EntityId::canonical(raw)
    }

    fn with_inverse(triples: &mut Vec<Triple>, head: &str, relation: RelationType, tail: &str) {
        let triple = Triple::new(head, relation, tail);
        triples.push(triple.inverse());
        triples.push(triple);
    }

    fn shared_artist_graph() -> GraphIndex {
        GraphIndex::build(vec![
            Triple::new("s1", RelationType::PerformedBy, "a1"),
            Triple::new("a1", RelationType::Performs, "s1"),
            Triple::new("s2", RelationType::PerformedBy, "a1"),
            Triple::new("a1", RelationType::Performs, "s2"),
        ])
    }

    #[test]
    fn test_shared_artist_two_hop() {
        let index = shared_artist_graph();
        let names = NameDictionary::new();
        let out = explain(&index, &names, &[id("s1")], &id("s2"), DEFAULT_MAX_HOPS, DEFAULT_BUDGET);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, ExplanationKind::MultiHop);
        assert!(out[0].text.starts_with("Connected to 's1' via: "));
        assert!(out[0].text.contains("performed by the same artist"));
        assert_eq!(out[0].path.len(), 2);
        assert_eq!(out[0].source, Some(id("s1")));
    }

    #[test]
    fn test_empty_history_fallback() {
        let index = shared_artist_graph();
        let names = NameDictionary::new();
        let out = explain(&index, &names, &[], &id("s2"), 2, 3);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, ExplanationKind::Fallback);
        assert_eq!(
            out[0].text,
            "Based on popular trends and the model's recommendations for new users"
        );
        assert!(out[0].path.is_empty());
    }

    #[test]
    fn test_unconnected_history_fallback() {
        let index = shared_artist_graph();
        let names = NameDictionary::new();
        let out = explain(&index, &names, &[id("s404")], &id("s2"), 2, 3);
        assert_eq!(out.len(), 1);
        assert_eq!(
            out[0].text,
            "Based on your listening history and the model's learned patterns"
        );
    }

    #[test]
    fn test_zero_budget_is_empty() {
        let index = shared_artist_graph();
        let names = NameDictionary::new();
        assert!(explain(&index, &names, &[id("s1")], &id("s2"), 2, 0).is_empty());
        assert!(explain(&index, &names, &[], &id("s2"), 2, 0).is_empty());
    }

    #[test]
    fn test_direct_before_multi_hop() {
        // s1 links straight to the candidate; s3 only through album b1.
        let mut triples = Vec::new();
        with_inverse(&mut triples, "s3", RelationType::BelongsToAlbum, "b1");
        with_inverse(&mut triples, "c", RelationType::BelongsToAlbum, "b1");
        with_inverse(&mut triples, "s1", RelationType::Other("remix_of".into()), "c");
        let index = GraphIndex::build(triples);
        let mut names = NameDictionary::new();
        names.insert_display(id("s1"), "Habibi");

        let history = [id("s3"), id("s1")];
        let out = explain(&index, &names, &history, &id("c"), 2, 3);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].kind, ExplanationKind::Direct);
        assert_eq!(out[0].text, "You liked 'Habibi' which is related via remix_of this song");
        assert_eq!(out[1].kind, ExplanationKind::MultiHop);
        assert_eq!(out[1].source, Some(id("s3")));
        assert!(out[1].text.contains("from the same album"));
    }

    #[test]
    fn test_direct_link_suppresses_multi_hop_for_same_item() {
        let mut triples = Vec::new();
        with_inverse(&mut triples, "s1", RelationType::Other("sampled_in".into()), "c");
        with_inverse(&mut triples, "s1", RelationType::PerformedBy, "a1");
        with_inverse(&mut triples, "c", RelationType::PerformedBy, "a1");
        let index = GraphIndex::build(triples);
        let names = NameDictionary::new();

        let out = explain(&index, &names, &[id("s1")], &id("c"), 2, 3);
        assert!(out.iter().all(|e| e.kind == ExplanationKind::Direct));
        // Both twin triples read the same way from s1, so one text survives.
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_budget_and_idempotence() {
        // Five liked songs, each sharing the candidate's language.
        let mut triples = Vec::new();
        with_inverse(&mut triples, "c", RelationType::InLanguage, "arabic");
        let history: Vec<EntityId> = (1..=5)
            .map(|n| {
                let song = format!("s{}", n);
                with_inverse(&mut triples, &song, RelationType::InLanguage, "arabic");
                id(&song)
            })
            .collect();
        let index = GraphIndex::build(triples);
        let names = NameDictionary::new();

        for budget in 1..=6 {
            let out = explain(&index, &names, &history, &id("c"), 2, budget);
            assert!(out.len() <= budget);
            assert_eq!(out, explain(&index, &names, &history, &id("c"), 2, budget));
        }
        let out = explain(&index, &names, &history, &id("c"), 2, 3);
        let sources: Vec<_> = out.iter().filter_map(|e| e.source.clone()).collect();
        assert_eq!(sources, vec![id("s1"), id("s2"), id("s3")]);
    }

    #[test]
    fn test_repeated_history_items_explained_once() {
        let index = shared_artist_graph();
        let names = NameDictionary::new();
        let history = [id("s1"), id("s1"), id("s1")];
        let out = explain(&index, &names, &history, &id("s2"), 2, 3);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_search_stops_once_budget_is_full() {
        let mut triples = Vec::new();
        with_inverse(&mut triples, "c", RelationType::InLanguage, "arabic");
        with_inverse(&mut triples, "s1", RelationType::InLanguage, "arabic");
        with_inverse(&mut triples, "s2", RelationType::InLanguage, "arabic");
        let index = GraphIndex::build(triples);
        let names = NameDictionary::new();

        let mut searches = 0;
        let out = select_explanations(&index, &names, &[id("s1"), id("s2")], &id("c"), 1, |s, t| {
            searches += 1;
            find_paths(&index, s, t, 2)
        });
        assert_eq!(out.len(), 1);
        assert_eq!(searches, 1);
    }
}
