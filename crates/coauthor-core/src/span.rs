//! Derived views handed to the rendering layer.

use crate::patch::{Author, PatchId};
use serde::{Deserialize, Serialize};

/// A maximal run of surviving characters written by one author.
///
/// `end` is exclusive. `patch_id` names the patch that wrote the first
/// character of the run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorshipSpan {
    pub start: usize,
    pub end: usize,
    pub author: Author,
    pub patch_id: PatchId,
}

impl AuthorshipSpan {
    pub fn new(start: usize, end: usize, author: Author, patch_id: PatchId) -> Self {
        Self {
            start,
            end,
            author,
            patch_id,
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }
}

/// Text that once existed at `position` and was removed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionSpan {
    /// Anchor in the current content.
    pub position: usize,
    pub deleted_content: String,
    pub original_author: Author,
    pub deleted_by: Author,
    /// The delete or replace patch that removed the text.
    pub patch_id: PatchId,
}

/// Whether `spans` partition `[0, length)` with no two neighbours sharing
/// an author.
pub fn is_partition(spans: &[AuthorshipSpan], length: usize) -> bool {
    if spans.is_empty() {
        return length == 0;
    }

    let mut cursor = 0;
    let mut previous: Option<Author> = None;
    for span in spans {
        if span.start != cursor || span.is_empty() {
            return false;
        }
        if previous == Some(span.author) {
            return false;
        }
        cursor = span.end;
        previous = Some(span.author);
    }
    cursor == length
}

/// The author owning `offset`, if any span covers it.
pub fn author_at(spans: &[AuthorshipSpan], offset: usize) -> Option<Author> {
    spans
        .iter()
        .find(|span| span.contains(offset))
        .map(|span| span.author)
}
