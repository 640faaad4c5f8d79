use std::path::Path;

use super::tsv::TsvTable;
use crate::error::{KgError, Result};
use crate::graph::{EntityId, RelationType, Triple};

/// Triples read from a knowledge-graph file plus the rows that were skipped.
#[derive(Debug, Default)]
pub struct TripleLoad {
    pub triples: Vec<Triple>,
    pub malformed: Vec<KgError>,
}

/// Load `(head_id, relation_id, tail_id)` triples from a tab-separated file.
///
/// Rows missing a field are skipped and reported as `MalformedTriple`;
/// only an unreadable file or an unusable header fails the load.
pub fn load_triples(path: &Path) -> Result<TripleLoad> {
    let table = TsvTable::read(path)?;
    let load = triples_from_table(&table)?;
    log::info!(
        "Loaded {} triples from {} ({} malformed rows skipped)",
        load.triples.len(),
        path.display(),
        load.malformed.len()
    );
    Ok(load)
}

pub fn triples_from_table(table: &TsvTable) -> Result<TripleLoad> {
    let head_col = table.require_column(&["head_id", "head"], Some(0))?;
    let relation_col = table.require_column(&["relation_id", "relation"], Some(1))?;
    let tail_col = table.require_column(&["tail_id", "tail"], Some(2))?;

    let mut load = TripleLoad::default();
    for row in &table.rows {
        let fields = (
            row.field(head_col),
            row.field(relation_col),
            row.field(tail_col),
        );
        match fields {
            (Some(head), Some(relation), Some(tail)) => load.triples.push(Triple {
                head: EntityId::canonical(head),
                relation: RelationType::parse(relation),
                tail: EntityId::canonical(tail),
            }),
            (head, relation, _) => {
                let missing = if head.is_none() {
                    "head_id"
                } else if relation.is_none() {
                    "relation_id"
                } else {
                    "tail_id"
                };
                let err = KgError::MalformedTriple {
                    line: row.line,
                    reason: format!("missing {}", missing),
                };
                log::warn!("Skipping row: {}", err);
                load.malformed.push(err);
            }
        }
    }
    Ok(load)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_triples_canonicalizes_ids() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("music.kg");
        fs::write(
            &path,
            "head_id:token\trelation_id:token\ttail_id:token\n\
             101.0\tperformed_by\t7\n\
             7\tperforms\t101\n\
             101\tin_language\t Arabic \n",
        )
        .unwrap();

        let load = load_triples(&path).unwrap();
        assert!(load.malformed.is_empty());
        assert_eq!(load.triples.len(), 3);
        assert_eq!(load.triples[0].head.as_str(), "101");
        assert_eq!(load.triples[0].relation, RelationType::PerformedBy);
        assert_eq!(load.triples[2].tail.as_str(), "arabic");
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let table = TsvTable::parse(
            "head_id:token\trelation_id:token\ttail_id:token\n\
             1\tperforms\t2\n\
             \tperforms\t2\n\
             1\t\t2\n\
             1\tperforms\n",
        );
        let load = triples_from_table(&table).unwrap();
        assert_eq!(load.triples.len(), 1);
        assert_eq!(load.malformed.len(), 3);
        match &load.malformed[0] {
            KgError::MalformedTriple { line, reason } => {
                assert_eq!(*line, 3);
                assert_eq!(reason, "missing head_id");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(load.malformed[2].to_string().contains("tail_id"));
    }

    #[test]
    fn test_columns_found_by_name() {
        let table = TsvTable::parse("tail_id\thead_id\trelation_id\na1\ts1\tperformed_by\n");
        let load = triples_from_table(&table).unwrap();
        assert_eq!(load.triples[0].head.as_str(), "s1");
        assert_eq!(load.triples[0].tail.as_str(), "a1");
    }

    #[test]
    fn test_unreadable_file_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let result = load_triples(&temp_dir.path().join("missing.kg"));
        assert!(matches!(result, Err(KgError::Io(_))));
    }
}
