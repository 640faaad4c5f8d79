//! Entity identifiers, relation tags and triples.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Inverse pairs for every known relation tag. Each stored triple is
/// expected to be accompanied by its inverse twin.
const INVERSE_TAGS: &[(&str, &str)] = &[
    ("performed_by", "performs"),
    ("belongs_to_album", "contains_song"),
    ("has_genre", "genre_of_artist"),
    ("in_language", "language_of_song"),
];

fn integer_like() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([+-]?)(\d+)(?:\.0*)?$").expect("Invalid regex pattern"))
}

/// Normalized entity token.
///
/// Integer-like values lose their decimal artifacts (`"12.0"` becomes `"12"`),
/// other floats are truncated toward zero, and everything else is trimmed and
/// lowercased. Two spellings of the same entity must map to the same token or
/// every graph lookup silently misses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Canonicalize a raw token.
    pub fn canonical(raw: &str) -> Self {
        let trimmed = raw.trim();

        // Pure digit strings are handled textually so 18-digit IDs keep
        // every digit instead of passing through f64.
        if let Some(caps) = integer_like().captures(trimmed) {
            let sign = &caps[1];
            let digits = caps[2].trim_start_matches('0');
            if digits.is_empty() {
                return Self("0".to_string());
            }
            return if sign == "-" {
                Self(format!("-{}", digits))
            } else {
                Self(digits.to_string())
            };
        }

        if let Ok(value) = trimmed.parse::<f64>() {
            if value.is_finite() {
                let truncated = value.trunc();
                if truncated == 0.0 {
                    return Self("0".to_string());
                }
                return Self(format!("{:.0}", truncated));
            }
        }

        Self(trimmed.to_lowercase())
    }

    /// Wrap a token that is already canonical.
    pub fn from_canonical(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(raw: &str) -> Self {
        Self::canonical(raw)
    }
}

/// Relation tag on a directed edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RelationType {
    PerformedBy,
    Performs,
    BelongsToAlbum,
    ContainsSong,
    HasGenre,
    GenreOfArtist,
    InLanguage,
    LanguageOfSong,
    /// Tag outside the known vocabulary, kept verbatim.
    Other(String),
}

impl RelationType {
    pub fn parse(tag: &str) -> Self {
        let tag = tag.trim();
        match tag.to_lowercase().as_str() {
            "performed_by" => Self::PerformedBy,
            "performs" => Self::Performs,
            "belongs_to_album" => Self::BelongsToAlbum,
            "contains_song" => Self::ContainsSong,
            "has_genre" => Self::HasGenre,
            "genre_of_artist" => Self::GenreOfArtist,
            "in_language" => Self::InLanguage,
            "language_of_song" => Self::LanguageOfSong,
            _ => Self::Other(tag.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::PerformedBy => "performed_by",
            Self::Performs => "performs",
            Self::BelongsToAlbum => "belongs_to_album",
            Self::ContainsSong => "contains_song",
            Self::HasGenre => "has_genre",
            Self::GenreOfArtist => "genre_of_artist",
            Self::InLanguage => "in_language",
            Self::LanguageOfSong => "language_of_song",
            Self::Other(tag) => tag,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// The tag read in the opposite direction. Unknown tags are their own
    /// inverse.
    pub fn inverse(&self) -> Self {
        let tag = self.as_str();
        INVERSE_TAGS
            .iter()
            .find_map(|&(forward, backward)| {
                if forward == tag {
                    Some(backward)
                } else if backward == tag {
                    Some(forward)
                } else {
                    None
                }
            })
            .map(Self::parse)
            .unwrap_or_else(|| self.clone())
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for RelationType {
    fn from(tag: String) -> Self {
        Self::parse(&tag)
    }
}

impl From<RelationType> for String {
    fn from(relation: RelationType) -> Self {
        relation.as_str().to_string()
    }
}

/// A single relation in the knowledge graph (head --relation--> tail).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub head: EntityId,
    pub relation: RelationType,
    pub tail: EntityId,
}

impl Triple {
    pub fn new(head: impl Into<EntityId>, relation: RelationType, tail: impl Into<EntityId>) -> Self {
        Self {
            head: head.into(),
            relation,
            tail: tail.into(),
        }
    }

    /// The twin triple expected alongside this one.
    pub fn inverse(&self) -> Self {
        Self {
            head: self.tail.clone(),
            relation: self.relation.inverse(),
            tail: self.head.clone(),
        }
    }
}

/// Which end of a triple the queried entity sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// The entity is the head; the edge leaves it.
    Head,
    /// The entity is the tail; the edge arrives at it.
    Tail,
}
