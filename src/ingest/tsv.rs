use std::path::Path;

use crate::error::{KgError, Result};

/// One data row with its 1-based line number in the source file.
#[derive(Debug, Clone)]
pub struct TsvRow {
    pub line: usize,
    pub fields: Vec<String>,
}

impl TsvRow {
    /// Trimmed, non-empty field at `column`.
    pub fn field(&self, column: usize) -> Option<&str> {
        self.fields
            .get(column)
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
    }
}

/// A tab-separated table with a header row.
///
/// Header names are normalized by dropping any `:type` suffix and lowercasing,
/// so `head_id:token` is addressed as `head_id`.
#[derive(Debug, Clone, Default)]
pub struct TsvTable {
    pub columns: Vec<String>,
    pub rows: Vec<TsvRow>,
}

impl TsvTable {
    /// Read a table from disk. An unreadable file is fatal.
    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(KgError::Io)?;
        let table = Self::parse(&content);
        if table.columns.is_empty() {
            return Err(KgError::Parse(format!(
                "{} has no header row",
                path.display()
            )));
        }
        Ok(table)
    }

    pub fn parse(content: &str) -> Self {
        let mut lines = content
            .lines()
            .enumerate()
            .map(|(idx, line)| (idx + 1, line.trim_end_matches('\r')))
            .filter(|(_, line)| !line.trim().is_empty());

        let columns = match lines.next() {
            Some((_, header)) => header.split('\t').map(normalize_column).collect(),
            None => return Self::default(),
        };

        let rows = lines
            .map(|(line, text)| TsvRow {
                line,
                fields: text.split('\t').map(str::to_string).collect(),
            })
            .collect();

        Self { columns, rows }
    }

    /// Index of the first column whose name is in `names`, else `fallback`
    /// when the table is wide enough.
    pub fn column(&self, names: &[&str], fallback: Option<usize>) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| names.contains(&c.as_str()))
            .or_else(|| fallback.filter(|&idx| idx < self.columns.len()))
    }

    /// Like [`TsvTable::column`] but a missing column is an error.
    pub fn require_column(&self, names: &[&str], fallback: Option<usize>) -> Result<usize> {
        self.column(names, fallback).ok_or_else(|| {
            KgError::Parse(format!(
                "missing column {} (header: {})",
                names.join("/"),
                self.columns.join(", ")
            ))
        })
    }
}

fn normalize_column(raw: &str) -> String {
    raw.split(':').next().unwrap_or(raw).trim().to_lowercase()
}
