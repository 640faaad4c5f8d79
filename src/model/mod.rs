//! Scoring-model seam: the recommender only needs "rank items for this user"
//! plus a mapping between raw tokens and the model's internal indices.

pub mod store;

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::error::{KgError, Result};
use crate::ingest::TsvTable;

pub use store::{import_scores, load_scores};

/// Internal user index of a scoring model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserIndex(pub usize);

/// Internal item index of a scoring model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemIndex(pub usize);

/// External recommendation model, consumed as an opaque ranker.
pub trait ScoringModel: Send + Sync {
    /// Map a user token to the model's index; `LookupMiss` when unknown.
    fn resolve_user(&self, token: &str) -> Result<UserIndex>;

    /// Token of an item index; `LookupMiss` when out of range.
    fn item_token(&self, item: ItemIndex) -> Result<&str>;

    /// Every scored item for the user, in the model's item order.
    fn scores(&self, user: UserIndex) -> Result<Vec<(ItemIndex, f32)>>;

    /// Top `k` items by descending score. The sort is stable, so ties keep
    /// the model's item order; NaN scores rank last.
    fn top_k(&self, user: UserIndex, k: usize) -> Result<Vec<(ItemIndex, f32)>> {
        let mut ranked = self.scores(user)?;
        ranked.sort_by(|a, b| compare_desc(a.1, b.1));
        ranked.truncate(k);
        Ok(ranked)
    }
}

fn compare_desc(a: f32, b: f32) -> Ordering {
    let key = |s: f32| if s.is_nan() { f32::NEG_INFINITY } else { s };
    key(b).total_cmp(&key(a))
}

/// In-memory score matrix exported from a trained model.
///
/// User and item tokens are kept exactly as the model knows them; indices
/// follow first appearance.
#[derive(Debug, Clone, Default)]
pub struct ScoreTable {
    user_lookup: HashMap<String, UserIndex>,
    users: Vec<String>,
    item_lookup: HashMap<String, ItemIndex>,
    items: Vec<String>,
    scores: Vec<BTreeMap<ItemIndex, f32>>,
}

impl ScoreTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_user(&mut self, token: &str) -> UserIndex {
        let token = token.trim();
        if let Some(&idx) = self.user_lookup.get(token) {
            return idx;
        }
        let idx = UserIndex(self.users.len());
        self.users.push(token.to_string());
        self.scores.push(BTreeMap::new());
        self.user_lookup.insert(token.to_string(), idx);
        idx
    }

    pub fn register_item(&mut self, token: &str) -> ItemIndex {
        let token = token.trim();
        if let Some(&idx) = self.item_lookup.get(token) {
            return idx;
        }
        let idx = ItemIndex(self.items.len());
        self.items.push(token.to_string());
        self.item_lookup.insert(token.to_string(), idx);
        idx
    }

    /// Record a score; a repeated (user, item) pair keeps the last value.
    pub fn insert(&mut self, user: &str, item: &str, score: f32) {
        let user = self.register_user(user);
        let item = self.register_item(item);
        self.scores[user.0].insert(item, score);
    }

    /// Load `(user_id, item_id, score)` rows from a tab-separated file.
    pub fn load_tsv(path: &Path) -> Result<Self> {
        let table = TsvTable::read(path)?;
        let scores = Self::from_table(&table)?;
        log::info!(
            "Loaded {} scores for {} users over {} items from {}",
            scores.len(),
            scores.user_count(),
            scores.item_count(),
            path.display()
        );
        Ok(scores)
    }

    pub fn from_table(table: &TsvTable) -> Result<Self> {
        let user_col = table.require_column(&["user_id", "user"], Some(0))?;
        let item_col = table.require_column(&["item_id", "song_id", "item"], Some(1))?;
        let score_col = table.require_column(&["score", "prediction"], Some(2))?;

        let mut scores = Self::new();
        let mut skipped = 0;
        for row in &table.rows {
            let (Some(user), Some(item), Some(raw_score)) =
                (row.field(user_col), row.field(item_col), row.field(score_col))
            else {
                skipped += 1;
                continue;
            };
            let score: f32 = raw_score.parse().map_err(|_| {
                KgError::Parse(format!("line {}: invalid score {:?}", row.line, raw_score))
            })?;
            if !score.is_finite() {
                skipped += 1;
                continue;
            }
            scores.insert(user, item, score);
        }
        if skipped > 0 {
            log::warn!("Skipped {} score rows with missing or non-finite values", skipped);
        }
        Ok(scores)
    }

    pub fn user_tokens(&self) -> &[String] {
        &self.users
    }

    pub fn item_tokens(&self) -> &[String] {
        &self.items
    }

    /// `(user, item, score)` triples in index order.
    pub fn entries(&self) -> impl Iterator<Item = (UserIndex, ItemIndex, f32)> + '_ {
        self.scores.iter().enumerate().flat_map(|(user, row)| {
            row.iter()
                .map(move |(&item, &score)| (UserIndex(user), item, score))
        })
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Number of stored scores.
    pub fn len(&self) -> usize {
        self.scores.iter().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ScoringModel for ScoreTable {
    fn resolve_user(&self, token: &str) -> Result<UserIndex> {
        self.user_lookup
            .get(token)
            .copied()
            .ok_or_else(|| KgError::LookupMiss(format!("user token {}", token)))
    }

    fn item_token(&self, item: ItemIndex) -> Result<&str> {
        self.items
            .get(item.0)
            .map(String::as_str)
            .ok_or_else(|| KgError::LookupMiss(format!("item index {}", item.0)))
    }

    fn scores(&self, user: UserIndex) -> Result<Vec<(ItemIndex, f32)>> {
        self.scores
            .get(user.0)
            .map(|row| row.iter().map(|(&item, &score)| (item, score)).collect())
            .ok_or_else(|| KgError::LookupMiss(format!("user index {}", user.0)))
    }
}
