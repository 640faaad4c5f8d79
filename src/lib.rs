pub mod config;
pub mod error;
pub mod db;
pub mod graph;
pub mod ingest;
pub mod cache;
pub mod explain;
pub mod model;
pub mod recommend;
pub mod diagnose;

pub use config::Config;
pub use error::{KgError, Result};
pub use explain::{Explainer, Explanation, ExplanationKind};
pub use graph::{find_paths, EntityId, GraphIndex, RelationType, Triple};
pub use model::{ScoreTable, ScoringModel};
pub use recommend::{CandidateStatus, RecommendationCandidate, Recommender};
