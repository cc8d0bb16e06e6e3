//! Shared replay machinery.
//!
//! Superseded patches are dropped, the rest are stably sorted by timestamp
//! and folded with splice semantics over a text buffer and a parallel
//! per-character ownership buffer.

use coauthor_core::{apply_clamped, splice_range, Author, Operation, Patch, PatchId};
use std::collections::HashSet;

/// Ids named by another patch's `supersedes`.
///
/// A patch naming its own id does not remove itself.
pub fn superseded_ids(patches: &[Patch]) -> HashSet<&PatchId> {
    patches
        .iter()
        .filter_map(|patch| patch.supersedes.as_ref().filter(|id| **id != patch.id))
        .collect()
}

/// Patches that take part in replay, in replay order.
///
/// Ties on `timestamp` keep their order in `patches`.
pub fn active_patches(patches: &[Patch]) -> Vec<&Patch> {
    let superseded = superseded_ids(patches);
    let mut active: Vec<&Patch> = patches
        .iter()
        .filter(|patch| !superseded.contains(&patch.id))
        .collect();
    active.sort_by_key(|patch| patch.timestamp);
    active
}

/// Fold the active patches over the empty string.
pub fn materialize(patches: &[Patch]) -> String {
    let mut content = String::new();
    for patch in active_patches(patches) {
        apply_clamped(&mut content, patch);
    }
    content
}

/// Owner of one character: the author and the index of the active patch
/// that wrote it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct CharMeta {
    pub author: Author,
    pub patch: usize,
}

/// The splice one replay step actually performed, after clamping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Splice {
    pub start: usize,
    pub removed: usize,
    pub inserted: usize,
}

impl Splice {
    pub fn end(&self) -> usize {
        self.start + self.removed
    }
}

/// What one replay step took out of the document.
#[derive(Debug, Default)]
pub(crate) struct Removed {
    pub splice: Splice,
    pub text: Vec<char>,
    pub meta: Vec<CharMeta>,
}

/// Replays active patches one at a time.
pub(crate) struct Replayer<'a> {
    patches: Vec<&'a Patch>,
    text: Vec<char>,
    meta: Vec<CharMeta>,
}

impl<'a> Replayer<'a> {
    pub fn new(history: &'a [Patch]) -> Self {
        Self {
            patches: active_patches(history),
            text: Vec::new(),
            meta: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn patch(&self, index: usize) -> &'a Patch {
        self.patches[index]
    }

    pub fn meta(&self) -> &[CharMeta] {
        &self.meta
    }

    pub fn text(&self) -> String {
        self.text.iter().collect()
    }

    /// Apply active patch `index` and return what it removed.
    pub fn step(&mut self, index: usize) -> Removed {
        let patch = self.patches[index];
        let range = splice_range(patch, self.text.len());
        let inserted: Vec<char> = match patch.operation {
            Operation::Insert | Operation::Replace => patch.content.chars().collect(),
            Operation::Delete => Vec::new(),
        };
        let owner = CharMeta {
            author: patch.author,
            patch: index,
        };

        let splice = Splice {
            start: range.start,
            removed: range.len(),
            inserted: inserted.len(),
        };
        let meta: Vec<CharMeta> = self
            .meta
            .splice(range.clone(), std::iter::repeat(owner).take(inserted.len()))
            .collect();
        let text: Vec<char> = self.text.splice(range, inserted).collect();

        Removed { splice, text, meta }
    }

    /// Replay every active patch.
    pub fn run(&mut self) {
        for index in 0..self.len() {
            self.step(index);
        }
    }
}
