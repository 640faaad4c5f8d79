//! Natural-language rendering of graph paths.

use std::borrow::Cow;

use crate::graph::{Hop, Path, RelationType};
use crate::ingest::NameDictionary;

/// Human-readable phrase per relation tag. Inverse pairs share a phrase.
const RELATION_PHRASES: &[(&str, &str)] = &[
    ("performed_by", "performed by the same artist"),
    ("performs", "performed by the same artist"),
    ("belongs_to_album", "from the same album"),
    ("contains_song", "from the same album"),
    ("has_genre", "in the same genre"),
    ("genre_of_artist", "in the same genre"),
    ("in_language", "in the same language"),
    ("language_of_song", "in the same language"),
];

const HOP_CONNECTIVE: &str = " and ";

/// Phrase for a relation tag; unknown tags read as `related via <tag>`.
pub fn relation_phrase(relation: &RelationType) -> Cow<'static, str> {
    let tag = relation.as_str();
    RELATION_PHRASES
        .iter()
        .find(|(known, _)| *known == tag)
        .map(|(_, phrase)| Cow::Borrowed(*phrase))
        .unwrap_or_else(|| Cow::Owned(format!("related via {}", tag)))
}

/// Renders paths using display names where the dictionary has them.
pub struct PathRenderer<'a> {
    names: &'a NameDictionary,
}

impl<'a> PathRenderer<'a> {
    pub fn new(names: &'a NameDictionary) -> Self {
        Self { names }
    }

    /// `<from> → <phrase> → <to>`
    pub fn render_hop(&self, hop: &Hop) -> String {
        format!(
            "{} → {} → {}",
            self.names.name_or_id(&hop.from),
            relation_phrase(&hop.relation),
            self.names.name_or_id(&hop.to)
        )
    }

    /// Hop descriptions in order, joined with "and".
    pub fn render(&self, path: &Path) -> String {
        path.hops
            .iter()
            .map(|hop| self.render_hop(hop))
            .collect::<Vec<_>>()
            .join(HOP_CONNECTIVE)
    }
}
