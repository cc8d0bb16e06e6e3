//! Document Store - owns every section and its patch history.
//!
//! [`DocumentStore::apply_patch`] is the only operation that changes
//! state. Everything else is a derivation over the stored histories.

use crate::error::{DbError, Result};
use crate::section::{DocumentSection, SectionView};
use coauthor_core::{AuthorshipSpan, DeletionSpan, Patch, SectionId};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Separator used when joining sections into one document.
pub const SECTION_SEPARATOR: &str = "\n\n";

/// A store of document sections.
#[derive(Clone, Debug, Default)]
pub struct DocumentStore {
    sections: BTreeMap<SectionId, DocumentSection>,
}

impl DocumentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            sections: BTreeMap::new(),
        }
    }

    // === Section management ===

    /// Create an empty section and return its id.
    pub fn create_section(&mut self, title: impl Into<String>, order: u32) -> SectionId {
        let id = SectionId::new();
        let section = DocumentSection::new(id.clone(), title, order);
        info!(section = %id, title = %section.title, order, "created section");
        self.sections.insert(id.clone(), section);
        id
    }

    /// Add an existing section, rebuilding its content from its history.
    pub fn insert_section(&mut self, mut section: DocumentSection) -> Result<()> {
        if self.sections.contains_key(&section.id) {
            return Err(DbError::DuplicateSection(section.id.to_string()));
        }
        section.rebuild();
        info!(
            section = %section.id,
            patches = section.patches().len(),
            "inserted section"
        );
        self.sections.insert(section.id.clone(), section);
        Ok(())
    }

    /// Remove a section.
    pub fn remove_section(&mut self, id: &SectionId) -> Option<DocumentSection> {
        self.sections.remove(id)
    }

    /// Get a section by id.
    pub fn section(&self, id: &SectionId) -> Option<&DocumentSection> {
        self.sections.get(id)
    }

    /// Check if a section exists.
    pub fn contains(&self, id: &SectionId) -> bool {
        self.sections.contains_key(id)
    }

    /// Get the number of sections.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Sections sorted by `order`, then id.
    pub fn sections(&self) -> Vec<&DocumentSection> {
        let mut sections: Vec<_> = self.sections.values().collect();
        sections.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        sections
    }

    /// Get all section ids.
    pub fn section_ids(&self) -> impl Iterator<Item = &SectionId> + '_ {
        self.sections.keys()
    }

    fn get(&self, id: &SectionId) -> Result<&DocumentSection> {
        self.sections
            .get(id)
            .ok_or_else(|| DbError::MissingSection(id.to_string()))
    }

    fn get_mut(&mut self, id: &SectionId) -> Result<&mut DocumentSection> {
        self.sections
            .get_mut(id)
            .ok_or_else(|| DbError::MissingSection(id.to_string()))
    }

    // === Mutation ===

    /// Append `patch` to its section's history and recompute the content.
    ///
    /// A rejected patch leaves the history unaffected.
    pub fn apply_patch(&mut self, patch: Patch) -> Result<()> {
        let section_id = patch.section_id.clone();
        let patch_id = patch.id.clone();
        let section = match self.sections.get_mut(&section_id) {
            Some(section) => section,
            None => {
                warn!(section = %section_id, patch = %patch_id, "dropping patch for missing section");
                return Err(DbError::MissingSection(section_id.to_string()));
            }
        };

        section.apply(patch)?;
        debug!(
            section = %section_id,
            patch = %patch_id,
            length = section.len(),
            "patch applied"
        );
        Ok(())
    }

    /// Apply `patches` in order, all or nothing.
    ///
    /// Every patch is applied to a staged copy of its section first; the
    /// store only changes if all of them are accepted.
    pub fn apply_all(&mut self, patches: Vec<Patch>) -> Result<()> {
        let count = patches.len();
        let mut staged: BTreeMap<SectionId, DocumentSection> = BTreeMap::new();

        for patch in patches {
            let section_id = patch.section_id.clone();
            let patch_id = patch.id.clone();
            let section = match staged.entry(section_id.clone()) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => match self.sections.get(&section_id) {
                    Some(current) => entry.insert(current.clone()),
                    None => {
                        warn!(section = %section_id, patch = %patch_id, "dropping batch for missing section");
                        return Err(DbError::MissingSection(section_id.to_string()));
                    }
                },
            };
            if let Err(err) = section.apply(patch) {
                warn!(section = %section_id, patch = %patch_id, error = %err, "batch rejected");
                return Err(err);
            }
        }

        for (id, section) in staged {
            self.sections.insert(id, section);
        }
        debug!(patches = count, "batch applied");
        Ok(())
    }

    /// Mark a section as finished.
    pub fn mark_complete(&mut self, id: &SectionId) -> Result<()> {
        let section = self.get_mut(id)?;
        section.complete = true;
        section.touch();
        info!(section = %id, "section complete");
        Ok(())
    }

    // === Queries ===

    /// Current content of a section.
    pub fn content(&self, id: &SectionId) -> Result<&str> {
        Ok(self.get(id)?.content())
    }

    /// Full patch history of a section, in arrival order.
    pub fn history(&self, id: &SectionId) -> Result<&[Patch]> {
        Ok(self.get(id)?.patches())
    }

    /// Authorship spans for a section.
    pub fn get_authorship(&self, id: &SectionId) -> Result<Vec<AuthorshipSpan>> {
        Ok(self.get(id)?.authorship())
    }

    /// Deletion spans for a section.
    pub fn get_deletions(&self, id: &SectionId) -> Result<Vec<DeletionSpan>> {
        Ok(self.get(id)?.deletions())
    }

    /// Render-ready snapshot of a section.
    pub fn section_view(&self, id: &SectionId) -> Result<SectionView> {
        Ok(self.get(id)?.view())
    }

    /// Render-ready snapshots of every section, in order.
    pub fn views(&self) -> Vec<SectionView> {
        self.sections().into_iter().map(|s| s.view()).collect()
    }

    /// All sections joined in order.
    pub fn document_content(&self) -> String {
        self.sections()
            .into_iter()
            .map(|s| s.content())
            .collect::<Vec<_>>()
            .join(SECTION_SEPARATOR)
    }

    // === Serialization ===

    /// Section view as JSON.
    pub fn view_json(&self, id: &SectionId) -> Result<String> {
        Ok(serde_json::to_string(&self.section_view(id)?)?)
    }

    /// Export a section with its full history.
    pub fn export_section(&self, id: &SectionId) -> Result<String> {
        Ok(serde_json::to_string(self.get(id)?)?)
    }

    /// Import a section exported with [`DocumentStore::export_section`].
    pub fn import_section(&mut self, json: &str) -> Result<SectionId> {
        let section: DocumentSection = serde_json::from_str(json)?;
        let id = section.id.clone();
        self.insert_section(section)?;
        Ok(id)
    }
}
