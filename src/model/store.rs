//! SQLite persistence for exported model scores.

use rusqlite::params;

use super::ScoreTable;
use crate::db::Db;
use crate::error::{KgError, Result};

/// Replace the store's contents with `table`. Returns the number of scores
/// written.
pub async fn import_scores(db: &Db, table: ScoreTable) -> Result<usize> {
    db.with_connection(move |conn| {
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM user_scores", [])?;
        tx.execute("DELETE FROM users", [])?;
        tx.execute("DELETE FROM items", [])?;

        {
            let mut insert_item = tx.prepare("INSERT INTO items (item_idx, item_id) VALUES (?1, ?2)")?;
            for (idx, token) in table.item_tokens().iter().enumerate() {
                insert_item.execute(params![idx as i64, token])?;
            }

            let mut insert_user = tx.prepare("INSERT INTO users (user_idx, user_id) VALUES (?1, ?2)")?;
            for (idx, token) in table.user_tokens().iter().enumerate() {
                insert_user.execute(params![idx as i64, token])?;
            }

            let mut insert_score = tx.prepare(
                "INSERT INTO user_scores (user_idx, item_idx, score) VALUES (?1, ?2, ?3)",
            )?;
            for (user, item, score) in table.entries() {
                insert_score.execute(params![user.0 as i64, item.0 as i64, score as f64])?;
            }
        }

        tx.commit()?;
        Ok(table.len())
    })
    .await
}

/// Rebuild a [`ScoreTable`] from the store, preserving token order.
pub async fn load_scores(db: &Db) -> Result<ScoreTable> {
    let table = db
        .with_connection(|conn| {
            let mut table = ScoreTable::new();

            let mut items = conn.prepare("SELECT item_id FROM items ORDER BY item_idx")?;
            let mut rows = items.query([])?;
            while let Some(row) = rows.next()? {
                let token: String = row.get(0)?;
                table.register_item(&token);
            }

            let mut users = conn.prepare("SELECT user_id FROM users ORDER BY user_idx")?;
            let mut rows = users.query([])?;
            while let Some(row) = rows.next()? {
                let token: String = row.get(0)?;
                table.register_user(&token);
            }

            let mut scores = conn.prepare(
                "SELECT u.user_id, i.item_id, s.score \
                 FROM user_scores s \
                 INNER JOIN users u ON u.user_idx = s.user_idx \
                 INNER JOIN items i ON i.item_idx = s.item_idx \
                 ORDER BY s.user_idx, s.item_idx",
            )?;
            let mut rows = scores.query([])?;
            while let Some(row) = rows.next()? {
                let user: String = row.get(0)?;
                let item: String = row.get(1)?;
                let score: f64 = row.get(2)?;
                table.insert(&user, &item, score as f32);
            }

            Ok::<ScoreTable, KgError>(table)
        })
        .await?;

    log::info!(
        "Score store loaded from {}: {} scores for {} users",
        db.path().display(),
        table.len(),
        table.user_count()
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrate;
    use crate::model::{ItemIndex, ScoringModel};
    use std::path::Path;
    use tempfile::TempDir;

    async fn migrated_db() -> (Db, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = Db::new(temp_dir.path().join("scores.db"));
        let migrations_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations");
        db.with_connection(move |conn| migrate::run_migrations(conn, &migrations_dir))
            .await
            .unwrap();
        (db, temp_dir)
    }

    fn sample() -> ScoreTable {
        let mut table = ScoreTable::new();
        table.insert("u1", "103", 0.1);
        table.insert("u1", "101", 0.8);
        table.insert("u2", "102", 0.5);
        table
    }

    #[tokio::test]
    async fn test_import_then_load_preserves_order() {
        let (db, _temp) = migrated_db().await;
        let written = import_scores(&db, sample()).await.unwrap();
        assert_eq!(written, 3);

        let loaded = load_scores(&db).await.unwrap();
        assert_eq!(loaded.item_tokens(), sample().item_tokens());
        assert_eq!(loaded.user_tokens(), sample().user_tokens());

        let user = loaded.resolve_user("u1").unwrap();
        let top = loaded.top_k(user, 1).unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(loaded.item_token(top[0].0).unwrap(), "101");
        assert_eq!(top[0].0, ItemIndex(1));
    }

    #[tokio::test]
    async fn test_import_replaces_previous_contents() {
        let (db, _temp) = migrated_db().await;
        import_scores(&db, sample()).await.unwrap();

        let mut replacement = ScoreTable::new();
        replacement.insert("u9", "900", 0.3);
        import_scores(&db, replacement).await.unwrap();

        let loaded = load_scores(&db).await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded.resolve_user("u1").is_err());
        assert!(loaded.resolve_user("u9").is_ok());
    }

    #[tokio::test]
    async fn test_load_without_schema_fails() {
        let temp_dir = TempDir::new().unwrap();
        let db = Db::new(temp_dir.path().join("empty.db"));
        assert!(matches!(load_scores(&db).await, Err(KgError::Database(_))));
    }
}
