//! Recommendation orchestrator: ranked candidates from the scoring model,
//! each with graph-derived explanations attached.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::error::{KgError, Result};
use crate::explain::{Explainer, Explanation, FALLBACK_NEW_USER, FALLBACK_WITH_HISTORY, NO_RECOMMENDATIONS};
use crate::graph::EntityId;
use crate::ingest::InteractionLog;
use crate::model::{ScoringModel, UserIndex};

/// Default number of recommendations per user.
pub const DEFAULT_K: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStatus {
    /// A real candidate ranked by the model.
    Ranked,
    /// Placeholder emitted when the user is unknown to the model.
    UserNotFound,
}

/// One recommended item with its model score and explanations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationCandidate {
    pub item: EntityId,
    pub title: String,
    pub score: f32,
    pub explanations: Vec<Explanation>,
    pub status: CandidateStatus,
}

impl RecommendationCandidate {
    fn user_not_found(user: &str) -> Self {
        Self {
            item: EntityId::canonical(user),
            title: format!("User {} not found", user),
            score: 0.0,
            explanations: vec![Explanation::fallback(NO_RECOMMENDATIONS)],
            status: CandidateStatus::UserNotFound,
        }
    }
}

/// Ties the scoring model, the interaction log and the explainer together.
#[derive(Clone)]
pub struct Recommender {
    model: Arc<dyn ScoringModel>,
    interactions: Arc<InteractionLog>,
    explainer: Explainer,
}

impl Recommender {
    pub fn new(
        model: Arc<dyn ScoringModel>,
        interactions: Arc<InteractionLog>,
        explainer: Explainer,
    ) -> Self {
        Self {
            model,
            interactions,
            explainer,
        }
    }

    pub fn explainer(&self) -> &Explainer {
        &self.explainer
    }

    pub fn interactions(&self) -> &InteractionLog {
        &self.interactions
    }

    /// Resolve a user token against the model: canonical form first, then the
    /// raw token as given.
    pub fn resolve_user(&self, user: &str) -> Result<UserIndex> {
        let canonical = EntityId::canonical(user);
        self.model
            .resolve_user(canonical.as_str())
            .or_else(|_| self.model.resolve_user(user))
            .map_err(|_| KgError::UserNotFound(user.to_string()))
    }

    /// The user's history, keyed by canonical ID.
    pub fn history(&self, user: &str) -> &[EntityId] {
        self.interactions.history(&EntityId::canonical(user))
    }

    /// Top-`k` explained recommendations in the model's score order.
    ///
    /// An unknown user yields a single `UserNotFound` placeholder instead of
    /// an error. Candidates are explained concurrently on the blocking pool;
    /// a failed explanation degrades to the generic fallback text.
    pub async fn recommend(&self, user: &str, k: usize) -> Result<Vec<RecommendationCandidate>> {
        let started = Instant::now();
        let user_idx = match self.resolve_user(user) {
            Ok(idx) => idx,
            Err(err) => {
                log::warn!("{}", err);
                return Ok(vec![RecommendationCandidate::user_not_found(user)]);
            }
        };

        let ranked = self.model.top_k(user_idx, k)?;
        let history: Arc<[EntityId]> = Arc::from(self.history(user));
        log::debug!(
            "Explaining {} candidates for user {} ({} history items)",
            ranked.len(),
            user,
            history.len()
        );

        let mut pending = Vec::with_capacity(ranked.len());
        for (item_idx, score) in ranked {
            let item = match self.model.item_token(item_idx) {
                Ok(token) => EntityId::canonical(token),
                Err(err) => {
                    log::warn!("Skipping candidate: {}", err);
                    continue;
                }
            };
            let explainer = self.explainer.clone();
            let task_history = Arc::clone(&history);
            let candidate = item.clone();
            let handle = tokio::task::spawn_blocking(move || {
                explainer.explain(&task_history, &candidate)
            });
            pending.push((item, score, handle));
        }

        let mut out = Vec::with_capacity(pending.len());
        for (item, score, handle) in pending {
            let explanations = match handle.await {
                Ok(explanations) => explanations,
                Err(err) => {
                    log::warn!("Explanation task for {} failed: {}", item, err);
                    let text = if history.is_empty() {
                        FALLBACK_NEW_USER
                    } else {
                        FALLBACK_WITH_HISTORY
                    };
                    vec![Explanation::fallback(text)]
                }
            };
            let title = self
                .explainer
                .names()
                .display_name(&item)
                .map(str::to_string)
                .unwrap_or_else(|| format!("Unknown Item {}", item));
            out.push(RecommendationCandidate {
                item,
                title,
                score,
                explanations,
                status: CandidateStatus::Ranked,
            });
        }

        log::debug!("Recommended {} items for {} in {:?}", out.len(), user, started.elapsed());
        Ok(out)
    }

    /// Explanations for a single item, outside any model ranking.
    pub fn explain_item(&self, user: &str, item: &str) -> Vec<Explanation> {
        self.explainer
            .explain(self.history(user), &EntityId::canonical(item))
    }
}
