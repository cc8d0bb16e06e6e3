//! Document sections.
//!
//! A section owns an append-only patch history. Its `content` is a cached
//! fold of that history and is rebuilt after every accepted patch.

use crate::error::{DbError, Result};
use coauthor_core::{apply_patch, AuthorshipSpan, DeletionSpan, Patch, PatchId, SectionId};
use coauthor_history::{
    active_patches, build_authorship_spans, build_deletion_spans, materialize,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// A named region of the document.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSection {
    pub id: SectionId,
    pub title: String,
    /// Display and application order.
    pub order: u32,
    /// Derived from `patches`; rebuilt on load.
    #[serde(skip)]
    content: String,
    patches: Vec<Patch>,
    /// Set once the agent has finished streaming into this section.
    #[serde(default)]
    pub complete: bool,
    pub created_at: u64,
    pub modified_at: u64,
}

impl DocumentSection {
    /// Create an empty section.
    pub fn new(id: SectionId, title: impl Into<String>, order: u32) -> Self {
        let now = now_millis();
        Self {
            id,
            title: title.into(),
            order,
            content: String::new(),
            patches: Vec::new(),
            complete: false,
            created_at: now,
            modified_at: now,
        }
    }

    /// Rebuild a section from a stored history.
    pub fn from_history(
        id: SectionId,
        title: impl Into<String>,
        order: u32,
        patches: Vec<Patch>,
    ) -> Self {
        let mut section = Self::new(id, title, order);
        section.patches = patches;
        section.rebuild();
        section
    }

    /// Current materialized text.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Every patch ever accepted, in arrival order.
    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    /// Patches taking part in replay, in replay order.
    pub fn active_patches(&self) -> Vec<&Patch> {
        active_patches(&self.patches)
    }

    pub fn contains_patch(&self, id: &PatchId) -> bool {
        self.patches.iter().any(|p| &p.id == id)
    }

    /// Length of the content in `char`s.
    pub fn len(&self) -> usize {
        self.content.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Accept `patch` into the history.
    ///
    /// The patch must fit the current content. On any error the section
    /// is unchanged.
    pub fn apply(&mut self, patch: Patch) -> Result<()> {
        if patch.section_id != self.id {
            return Err(DbError::SectionMismatch {
                patch: patch.id.to_string(),
                target: patch.section_id.to_string(),
                section: self.id.to_string(),
            });
        }
        if self.contains_patch(&patch.id) {
            return Err(DbError::DuplicatePatch(patch.id.to_string()));
        }
        patch.validate()?;
        if let Err(err) = apply_patch(&self.content, &patch) {
            warn!(section = %self.id, patch = %patch.id, error = %err, "patch does not fit content");
            return Err(err.into());
        }

        debug!(
            section = %self.id,
            patch = %patch.id,
            author = %patch.author,
            operation = %patch.operation,
            position = %patch.position,
            "applying patch"
        );
        self.patches.push(patch);
        self.rebuild();
        self.touch();
        Ok(())
    }

    /// Recompute `content` from the history.
    pub fn rebuild(&mut self) {
        self.content = materialize(&self.patches);
    }

    /// Who owns each surviving character.
    pub fn authorship(&self) -> Vec<AuthorshipSpan> {
        build_authorship_spans(&self.patches)
    }

    /// Removed text, anchored in the current content.
    pub fn deletions(&self) -> Vec<DeletionSpan> {
        build_deletion_spans(&self.patches)
    }

    /// Snapshot for the rendering layer.
    pub fn view(&self) -> SectionView {
        SectionView {
            id: self.id.clone(),
            title: self.title.clone(),
            order: self.order,
            content: self.content.clone(),
            authorship: self.authorship(),
            deletions: self.deletions(),
            complete: self.complete,
        }
    }

    /// Touch the modified timestamp.
    pub fn touch(&mut self) {
        self.modified_at = now_millis();
    }
}

/// Everything a renderer needs to draw one section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionView {
    pub id: SectionId,
    pub title: String,
    pub order: u32,
    pub content: String,
    pub authorship: Vec<AuthorshipSpan>,
    pub deletions: Vec<DeletionSpan>,
    pub complete: bool,
}
