//! Knowledge graph module: entity model, adjacency index and BFS path search.
//!
//! The index is built once from the full triple set and is read-only
//! afterwards; path search borrows it and never mutates shared state.

mod entity;
mod index;
mod traversal;

pub use entity::{Direction, EntityId, RelationType, Triple};
pub use index::{GraphIndex, GraphStats, Neighbor};
pub use traversal::{find_paths, Hop, Path, DEFAULT_MAX_HOPS};
