use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::ids::RecordId;

/// The kind of bibliographic identifier a record is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentifierKind {
    Doi,
    Isbn,
}

impl IdentifierKind {
    /// Classify an identifier string as a DOI or ISBN.
    ///
    /// DOIs start with a `10.` registrant prefix followed by a `/` suffix.
    /// ISBNs are 10 or 13 digits, hyphens/spaces allowed, with an optional
    /// trailing `X` check digit for ISBN-10.
    ///
    /// # Errors
    /// Returns `InvalidData` if the string is neither.
    pub fn classify(identifier: &str) -> Result<Self> {
        let trimmed = identifier.trim();
        if trimmed.starts_with("10.") && trimmed.contains('/') {
            return Ok(Self::Doi);
        }

        let compact: String = trimmed
            .chars()
            .filter(|c| *c != '-' && *c != ' ')
            .collect();
        let digits = compact
            .strip_suffix(['X', 'x'])
            .map_or(compact.as_str(), |rest| rest);
        let is_numeric = !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit());

        match (is_numeric, compact.len()) {
            (true, 10 | 13) => Ok(Self::Isbn),
            _ => Err(Error::InvalidData(format!(
                "not a DOI or ISBN: {identifier}"
            ))),
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Doi => "doi",
            Self::Isbn => "isbn",
        }
    }
}

impl std::str::FromStr for IdentifierKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "doi" => Ok(Self::Doi),
            "isbn" => Ok(Self::Isbn),
            other => Err(Error::InvalidData(format!(
                "unknown identifier kind: {other}"
            ))),
        }
    }
}

/// A stored bibliographic record.
///
/// Records are keyed by their DOI/ISBN `identifier` (unique within a
/// store) and carry the embedding vector computed from their text.
/// Records are append-only: once added they are never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,

    /// DOI or ISBN. Unique key within a store.
    pub identifier: String,
    pub kind: IdentifierKind,

    pub title: String,

    /// Abstract or other descriptive text.
    pub summary: Option<String>,
    pub authors: Option<String>,
    pub year: Option<i32>,

    /// Embedding of the record text, fixed dimension per store.
    pub embedding: Vec<f32>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record {
    /// Build a record from caller-supplied fields and an embedding.
    ///
    /// # Errors
    /// Returns `InvalidData` if the identifier is not a DOI or ISBN.
    pub fn new(fields: NewRecord, embedding: Vec<f32>) -> Result<Self> {
        let kind = IdentifierKind::classify(&fields.identifier)?;
        let now = Utc::now();
        Ok(Self {
            id: RecordId::new(),
            identifier: fields.identifier,
            kind,
            title: fields.title,
            summary: fields.summary,
            authors: fields.authors,
            year: fields.year,
            embedding,
            created_at: now,
            updated_at: now,
        })
    }

    /// The text submitted to the embedding provider: title plus summary.
    #[must_use]
    pub fn embedding_text(&self) -> String {
        match &self.summary {
            Some(summary) => format!("{}\n{}", self.title, summary),
            None => self.title.clone(),
        }
    }
}

/// Caller-supplied fields for a record that has not been embedded yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRecord {
    pub identifier: String,
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub authors: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
}

impl NewRecord {
    #[must_use]
    pub fn new(identifier: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            title: title.into(),
            summary: None,
            authors: None,
            year: None,
        }
    }

    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    #[must_use]
    pub fn with_authors(mut self, authors: impl Into<String>) -> Self {
        self.authors = Some(authors.into());
        self
    }

    #[must_use]
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    /// The text submitted to the embedding provider: title plus summary.
    #[must_use]
    pub fn embedding_text(&self) -> String {
        match &self.summary {
            Some(summary) => format!("{}\n{}", self.title, summary),
            None => self.title.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_doi() {
        assert_eq!(
            IdentifierKind::classify("10.1000/xyz123").unwrap(),
            IdentifierKind::Doi
        );
        assert_eq!(
            IdentifierKind::classify("10.48550/arXiv.1706.03762").unwrap(),
            IdentifierKind::Doi
        );
    }

    #[test]
    fn test_classify_isbn() {
        assert_eq!(
            IdentifierKind::classify("978-0-306-40615-7").unwrap(),
            IdentifierKind::Isbn
        );
        assert_eq!(
            IdentifierKind::classify("0306406152").unwrap(),
            IdentifierKind::Isbn
        );
        // ISBN-10 with X check digit
        assert_eq!(
            IdentifierKind::classify("097522980X").unwrap(),
            IdentifierKind::Isbn
        );
    }

    #[test]
    fn test_classify_rejects_garbage() {
        assert!(IdentifierKind::classify("not-an-id").is_err());
        assert!(IdentifierKind::classify("12345").is_err());
        assert!(IdentifierKind::classify("").is_err());
    }

    #[test]
    fn test_record_new() {
        let fields = NewRecord::new("10.1000/xyz", "Attention Is All You Need")
            .with_authors("Vaswani et al.")
            .with_year(2017);
        let record = Record::new(fields, vec![0.1, 0.2, 0.3]).unwrap();

        assert_eq!(record.kind, IdentifierKind::Doi);
        assert_eq!(record.title, "Attention Is All You Need");
        assert_eq!(record.year, Some(2017));
        assert_eq!(record.embedding.len(), 3);
    }

    #[test]
    fn test_embedding_text_includes_summary() {
        let fields = NewRecord::new("10.1/a", "Title").with_summary("An abstract.");
        assert_eq!(fields.embedding_text(), "Title\nAn abstract.");

        let bare = NewRecord::new("10.1/b", "Only Title");
        assert_eq!(bare.embedding_text(), "Only Title");
    }
}
