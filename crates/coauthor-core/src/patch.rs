//! Patch - the atomic edit instruction shared by both writers.
//!
//! A patch targets one section, carries the `[start, end)` range it was
//! authored against, and is never mutated once it enters a history.
//! Corrections are expressed as new patches, optionally pointing at the
//! patch they replace through `supersedes`.

use crate::error::{PatchError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use ulid::Ulid;

/// Unique identifier for a patch.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PatchId(pub String);

impl PatchId {
    pub fn new() -> Self {
        Self(Ulid::new().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a document section.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SectionId(pub String);

impl SectionId {
    pub fn new() -> Self {
        Self(Ulid::new().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One of the two writers sharing a document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Author {
    /// The automated writer.
    Agent,
    /// The human writer.
    User,
}

impl Author {
    pub fn as_str(&self) -> &'static str {
        match self {
            Author::Agent => "agent",
            Author::User => "user",
        }
    }

    /// The other writer.
    pub fn other(&self) -> Author {
        match self {
            Author::Agent => Author::User,
            Author::User => Author::Agent,
        }
    }
}

impl std::fmt::Display for Author {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Author {
    type Err = PatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "agent" => Ok(Author::Agent),
            "user" => Ok(Author::User),
            other => Err(PatchError::UnknownAuthor(other.to_string())),
        }
    }
}

/// The kind of edit a patch performs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Splice content in at `start`.
    Insert,
    /// Swap `[start, end)` for content.
    Replace,
    /// Remove `[start, end)`.
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Insert => "insert",
            Operation::Replace => "replace",
            Operation::Delete => "delete",
        }
    }

    /// Whether the operation removes existing text.
    pub fn removes_text(&self) -> bool {
        matches!(self, Operation::Replace | Operation::Delete)
    }

    /// Whether the operation carries new text.
    pub fn carries_content(&self) -> bool {
        matches!(self, Operation::Insert | Operation::Replace)
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = PatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "insert" => Ok(Operation::Insert),
            "replace" => Ok(Operation::Replace),
            "delete" => Ok(Operation::Delete),
            other => Err(PatchError::UnknownOperation(other.to_string())),
        }
    }
}

/// Half-open character range `[start, end)`.
///
/// Offsets count `char`s, not bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub start: usize,
    pub end: usize,
}

impl Position {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// An empty range at `offset`, used by inserts.
    pub fn at(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Strict intersection: ranges that only touch do not intersect.
    pub fn intersects(&self, other: &Position) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Whether `offset` lies strictly inside the range.
    pub fn strictly_contains(&self, offset: usize) -> bool {
        self.start < offset && offset < self.end
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Free-form annotations. Never consulted by merge or replay.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Set on patches synthesized by the `merge` strategy.
    #[serde(default)]
    pub merged: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_agent_content: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub extra: HashMap<String, String>,
}

impl PatchMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set an extra annotation.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.extra.insert(key.into(), value.into());
    }

    /// Get an extra annotation.
    pub fn get(&self, key: &str) -> Option<&String> {
        self.extra.get(key)
    }
}

/// An atomic, immutable edit instruction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patch {
    pub id: PatchId,
    pub section_id: SectionId,
    pub author: Author,
    pub operation: Operation,
    /// Inserted or replacement text; empty for deletes.
    #[serde(default)]
    pub content: String,
    /// Range in the section's content at authoring time.
    pub position: Position,
    /// Ordering key; ties keep arrival order.
    pub timestamp: u64,
    /// An earlier pending patch this one replaces.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supersedes: Option<PatchId>,
    #[serde(default)]
    pub metadata: PatchMetadata,
}

impl Patch {
    /// Build a patch, checking range order and content/operation agreement.
    pub fn new(
        section_id: SectionId,
        author: Author,
        operation: Operation,
        position: Position,
        content: impl Into<String>,
        timestamp: u64,
    ) -> Result<Self> {
        let patch = Self {
            id: PatchId::new(),
            section_id,
            author,
            operation,
            content: content.into(),
            position,
            timestamp,
            supersedes: None,
            metadata: PatchMetadata::default(),
        };
        patch.validate()?;
        Ok(patch)
    }

    /// Insert `content` at `offset`.
    pub fn insert(
        section_id: SectionId,
        author: Author,
        offset: usize,
        content: impl Into<String>,
        timestamp: u64,
    ) -> Self {
        Self {
            id: PatchId::new(),
            section_id,
            author,
            operation: Operation::Insert,
            content: content.into(),
            position: Position::at(offset),
            timestamp,
            supersedes: None,
            metadata: PatchMetadata::default(),
        }
    }

    /// Replace `[start, end)` with `content`.
    pub fn replace(
        section_id: SectionId,
        author: Author,
        start: usize,
        end: usize,
        content: impl Into<String>,
        timestamp: u64,
    ) -> Result<Self> {
        Self::new(
            section_id,
            author,
            Operation::Replace,
            Position::new(start, end),
            content,
            timestamp,
        )
    }

    /// Remove `[start, end)`.
    pub fn delete(
        section_id: SectionId,
        author: Author,
        start: usize,
        end: usize,
        timestamp: u64,
    ) -> Result<Self> {
        Self::new(
            section_id,
            author,
            Operation::Delete,
            Position::new(start, end),
            String::new(),
            timestamp,
        )
    }

    pub fn with_id(mut self, id: PatchId) -> Self {
        self.id = id;
        self
    }

    pub fn with_supersedes(mut self, id: PatchId) -> Self {
        self.supersedes = Some(id);
        self
    }

    pub fn with_metadata(mut self, metadata: PatchMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Check `start <= end` and that the content fits the operation.
    pub fn validate(&self) -> Result<()> {
        let Position { start, end } = self.position;
        if start > end {
            return Err(PatchError::InvertedRange { start, end });
        }
        match self.operation {
            Operation::Insert if start != end => Err(PatchError::InconsistentContent {
                operation: self.operation,
                reason: format!("insert range {} is not empty", self.position),
            }),
            Operation::Delete if !self.content.is_empty() => {
                Err(PatchError::InconsistentContent {
                    operation: self.operation,
                    reason: "delete carries content".to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Length of the content in `char`s.
    pub fn content_len(&self) -> usize {
        self.content.chars().count()
    }

    /// Characters this patch puts into the document.
    pub fn inserted_len(&self) -> usize {
        match self.operation {
            Operation::Insert | Operation::Replace => self.content_len(),
            Operation::Delete => 0,
        }
    }

    /// Characters this patch takes out of the document.
    pub fn removed_len(&self) -> usize {
        match self.operation {
            Operation::Insert => 0,
            Operation::Replace | Operation::Delete => self.position.len(),
        }
    }

    /// Net change in document length once applied.
    pub fn net_offset(&self) -> i64 {
        self.inserted_len() as i64 - self.removed_len() as i64
    }

    /// The range this patch's own text occupies right after it lands.
    pub fn inserted_range(&self) -> Position {
        Position::new(
            self.position.start,
            self.position.start + self.inserted_len(),
        )
    }

    pub fn is_merged(&self) -> bool {
        self.metadata.merged
    }
}
