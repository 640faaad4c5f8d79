use std::collections::HashMap;
use std::path::Path;

use super::tsv::TsvTable;
use crate::error::Result;
use crate::graph::EntityId;

/// Per-user item history in order of appearance in the interaction log.
#[derive(Debug, Clone, Default)]
pub struct InteractionLog {
    histories: HashMap<EntityId, Vec<EntityId>>,
}

impl InteractionLog {
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (EntityId, EntityId)>,
    {
        let mut histories: HashMap<EntityId, Vec<EntityId>> = HashMap::new();
        for (user, item) in pairs {
            histories.entry(user).or_default().push(item);
        }
        Self { histories }
    }

    /// Items the user engaged with; empty for unknown users.
    pub fn history(&self, user: &EntityId) -> &[EntityId] {
        self.histories.get(user).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn user_count(&self) -> usize {
        self.histories.len()
    }

    pub fn interaction_count(&self) -> usize {
        self.histories.values().map(Vec::len).sum()
    }
}

/// Load `(user_id, item_id, rating, timestamp)` rows; only the first two
/// columns are used.
pub fn load_interactions(path: &Path) -> Result<InteractionLog> {
    let table = TsvTable::read(path)?;
    let log = interactions_from_table(&table)?;
    log::info!(
        "Loaded {} interactions for {} users from {}",
        log.interaction_count(),
        log.user_count(),
        path.display()
    );
    Ok(log)
}

pub fn interactions_from_table(table: &TsvTable) -> Result<InteractionLog> {
    let user_col = table.require_column(&["user_id", "user"], Some(0))?;
    let item_col = table.require_column(&["item_id", "song_id", "item"], Some(1))?;

    let mut skipped = 0;
    let pairs: Vec<_> = table
        .rows
        .iter()
        .filter_map(|row| match (row.field(user_col), row.field(item_col)) {
            (Some(user), Some(item)) => {
                Some((EntityId::canonical(user), EntityId::canonical(item)))
            }
            _ => {
                skipped += 1;
                None
            }
        })
        .collect();

    if skipped > 0 {
        log::warn!("Skipped {} interaction rows without user_id or item_id", skipped);
    }
    Ok(InteractionLog::from_pairs(pairs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> EntityId {
        EntityId::canonical(raw)
    }

    #[test]
    fn test_history_keeps_appearance_order() {
        let table = TsvTable::parse(
            "user_id:token\titem_id:token\trating:float\ttimestamp:float\n\
             u1\t30.0\t1.0\t1718000000\n\
             u2\t10\t2.0\t1718000001\n\
             u1\t20\t0.5\t1718000002\n\
             U1\t30\t2.0\t1718000003\n",
        );
        let log = interactions_from_table(&table).unwrap();
        assert_eq!(log.user_count(), 2);
        assert_eq!(log.history(&id("u1")), &[id("30"), id("20"), id("30")]);
        assert_eq!(log.history(&id("u2")), &[id("10")]);
    }

    #[test]
    fn test_unknown_user_has_empty_history() {
        let log = InteractionLog::default();
        assert!(log.history(&id("nobody")).is_empty());
    }

    #[test]
    fn test_rows_without_item_are_skipped() {
        let table = TsvTable::parse("user_id\titem_id\nu1\t\nu1\t5\n");
        let log = interactions_from_table(&table).unwrap();
        assert_eq!(log.interaction_count(), 1);
    }
}
