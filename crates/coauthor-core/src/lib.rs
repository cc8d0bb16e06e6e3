//! # coauthor-core
//!
//! Core types and pure functions for the coauthor engine, where two
//! writers (an automated agent and a human user) edit the same document.
//!
//! This crate provides:
//! - The [`Patch`] data model (insert / replace / delete with causal metadata)
//! - The Patch Applier ([`apply_patch`], strict and clamped flavours)
//! - The Overlap Detector ([`overlaps`])
//! - The Position Adjuster ([`adjust_patch_position`], [`rebase`])
//! - Span types consumed by renderers ([`AuthorshipSpan`], [`DeletionSpan`])
//!
//! All offsets count `char`s.

pub mod apply;
pub mod error;
pub mod overlap;
pub mod patch;
pub mod span;
pub mod transform;

pub use apply::{
    apply_clamped, apply_in_place, apply_patch, byte_offset, char_len, checked_range,
    splice_range,
};
pub use error::{PatchError, Result};
pub use overlap::overlaps;
pub use patch::{Author, Operation, Patch, PatchId, PatchMetadata, Position, SectionId};
pub use span::{author_at, is_partition, AuthorshipSpan, DeletionSpan};
pub use transform::{adjust_patch_position, rebase};
