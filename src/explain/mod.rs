//! Explanation engine: renders graph paths and picks the explanations
//! attached to each recommended item.

mod render;
mod selector;

pub use render::{relation_phrase, PathRenderer};
pub use selector::{explain, DEFAULT_BUDGET};

use std::sync::Arc;

use serde::Serialize;

use crate::cache::PathCache;
use crate::graph::{find_paths, EntityId, GraphIndex, Path, DEFAULT_MAX_HOPS};
use crate::ingest::NameDictionary;

/// Fallback for users with history but no graph connection to the item.
pub const FALLBACK_WITH_HISTORY: &str =
    "Based on your listening history and the model's learned patterns";

/// Fallback for users without any history.
pub const FALLBACK_NEW_USER: &str =
    "Based on popular trends and the model's recommendations for new users";

/// Placeholder text when the user cannot be resolved at all.
pub const NO_RECOMMENDATIONS: &str = "No recommendations possible.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplanationKind {
    /// A single triple links a liked item and the candidate.
    Direct,
    /// A path of several hops links them.
    MultiHop,
    /// Generic text, no graph evidence.
    Fallback,
}

/// A rendered justification and the path it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explanation {
    pub text: String,
    pub kind: ExplanationKind,
    /// History item the path starts from; `None` for fallbacks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<EntityId>,
    #[serde(skip_serializing_if = "Path::is_empty")]
    pub path: Path,
}

impl Explanation {
    pub fn fallback(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: ExplanationKind::Fallback,
            source: None,
            path: Path::default(),
        }
    }
}

/// Shared, cheaply clonable handle bundling everything an explanation needs.
///
/// Clones share the index, the name dictionary and the path cache, so one
/// explainer can be handed to many blocking tasks.
#[derive(Clone)]
pub struct Explainer {
    index: Arc<GraphIndex>,
    names: Arc<NameDictionary>,
    cache: Option<Arc<PathCache>>,
    max_hops: usize,
    budget: usize,
}

impl Explainer {
    pub fn new(index: Arc<GraphIndex>, names: Arc<NameDictionary>) -> Self {
        Self {
            index,
            names,
            cache: None,
            max_hops: DEFAULT_MAX_HOPS,
            budget: DEFAULT_BUDGET,
        }
    }

    pub fn with_max_hops(mut self, max_hops: usize) -> Self {
        self.max_hops = max_hops;
        self
    }

    pub fn with_budget(mut self, budget: usize) -> Self {
        self.budget = budget;
        self
    }

    /// Put an LRU cache in front of path search. Capacity 0 disables it.
    pub fn with_path_cache(mut self, capacity: usize) -> Self {
        self.cache = (capacity > 0).then(|| Arc::new(PathCache::new(capacity)));
        self
    }

    pub fn index(&self) -> &GraphIndex {
        &self.index
    }

    pub fn names(&self) -> &NameDictionary {
        &self.names
    }

    pub fn max_hops(&self) -> usize {
        self.max_hops
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    pub fn cache(&self) -> Option<&PathCache> {
        self.cache.as_deref()
    }

    /// Path search through the cache when one is configured.
    pub fn find_paths(&self, source: &EntityId, target: &EntityId) -> Vec<Path> {
        let Some(cache) = self.cache.as_deref() else {
            return find_paths(&self.index, source, target, self.max_hops);
        };
        if let Some(paths) = cache.get(source, target, self.max_hops) {
            log::debug!("Path cache hit: {} -> {}", source, target);
            return paths;
        }
        let paths = find_paths(&self.index, source, target, self.max_hops);
        cache.put(source.clone(), target.clone(), self.max_hops, paths.clone());
        paths
    }

    /// Explanations for one candidate given the user's history.
    pub fn explain(&self, history: &[EntityId], candidate: &EntityId) -> Vec<Explanation> {
        selector::select_explanations(
            &self.index,
            &self.names,
            history,
            candidate,
            self.budget,
            |source, target| self.find_paths(source, target),
        )
    }
}
