use std::collections::HashMap;
use std::path::Path;

use super::tsv::TsvTable;
use crate::error::Result;
use crate::graph::EntityId;

/// Display names for entities, and the artist name of each song.
///
/// Missing entries are expected; callers fall back to the raw identifier.
#[derive(Debug, Clone, Default)]
pub struct NameDictionary {
    display: HashMap<EntityId, String>,
    artists: HashMap<EntityId, String>,
}

impl NameDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_display(&mut self, entity: EntityId, name: impl Into<String>) {
        self.display.insert(entity, name.into());
    }

    pub fn insert_artist(&mut self, song: EntityId, artist: impl Into<String>) {
        self.artists.insert(song, artist.into());
    }

    pub fn display_name(&self, entity: &EntityId) -> Option<&str> {
        self.display.get(entity).map(String::as_str)
    }

    pub fn artist_name(&self, song: &EntityId) -> Option<&str> {
        self.artists.get(song).map(String::as_str)
    }

    /// Display name, or the raw identifier on a miss.
    pub fn name_or_id<'a>(&'a self, entity: &'a EntityId) -> &'a str {
        self.display_name(entity).unwrap_or_else(|| entity.as_str())
    }

    pub fn len(&self) -> usize {
        self.display.len()
    }

    pub fn is_empty(&self) -> bool {
        self.display.is_empty()
    }
}

/// Load item metadata (song id, song name and optionally artist id/name).
///
/// When the table carries `artist_id`, artist entities get display names too,
/// so hops through an artist read as the artist's name.
pub fn load_item_names(path: &Path) -> Result<NameDictionary> {
    let table = TsvTable::read(path)?;
    let names = names_from_table(&table)?;
    log::info!("Loaded {} display names from {}", names.len(), path.display());
    Ok(names)
}

pub fn names_from_table(table: &TsvTable) -> Result<NameDictionary> {
    let id_col = table.require_column(&["item_id", "song_id"], Some(0))?;
    let name_col = table.column(&["song_name", "item_name", "name", "title"], None);
    let artist_id_col = table.column(&["artist_id"], None);
    let artist_name_col = table.column(&["artist_name", "artist"], None);

    let mut names = NameDictionary::new();
    for row in &table.rows {
        let Some(song) = row.field(id_col).map(EntityId::canonical) else {
            continue;
        };
        let artist_name = artist_name_col.and_then(|col| row.field(col));
        if let Some(artist) = artist_name {
            names.insert_artist(song.clone(), artist);
            if let Some(artist_id) = artist_id_col.and_then(|col| row.field(col)) {
                names.insert_display(EntityId::canonical(artist_id), artist);
            }
        }
        if let Some(title) = name_col.and_then(|col| row.field(col)) {
            names.insert_display(song, title);
        }
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> EntityId {
        EntityId::canonical(raw)
    }

    #[test]
    fn test_names_from_song_table() {
        let table = TsvTable::parse(
            "song_id\tsong_name\tartist_id\tartist_name\n\
             101.0\tKhalina Zekra\t7\tAmr Diab\n\
             102\tTamally Maak\t7\tAmr Diab\n\
             103\t\t8\t\n",
        );
        let names = names_from_table(&table).unwrap();
        assert_eq!(names.display_name(&id("101")), Some("Khalina Zekra"));
        assert_eq!(names.artist_name(&id("102")), Some("Amr Diab"));
        assert_eq!(names.display_name(&id("7")), Some("Amr Diab"));
        assert_eq!(names.display_name(&id("103")), None);
        assert_eq!(names.display_name(&id("8")), None);
    }

    #[test]
    fn test_name_or_id_falls_back_to_raw() {
        let names = NameDictionary::new();
        let entity = id("999");
        assert_eq!(names.name_or_id(&entity), "999");
    }
}
