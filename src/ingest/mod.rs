pub mod tsv;
pub mod triples;
pub mod history;
pub mod names;

pub use tsv::{TsvRow, TsvTable};
pub use triples::{load_triples, TripleLoad};
pub use history::{load_interactions, InteractionLog};
pub use names::{load_item_names, NameDictionary};

use std::path::Path;

use crate::error::Result;
use crate::graph::GraphIndex;

/// Read the knowledge-graph file and build the index in one step.
///
/// Malformed rows are skipped; an unreadable file fails before any query is
/// served.
pub fn build_index(kg_path: &Path) -> Result<GraphIndex> {
    let load = load_triples(kg_path)?;
    Ok(GraphIndex::build(load.triples))
}
