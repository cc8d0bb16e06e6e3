//! # coauthor-history
//!
//! Derived views over a section's patch history. Nothing here is stored:
//! every query replays the full history, so content, authorship and
//! deletions are always consistent with each other.
//!
//! - [`active_patches`] drops superseded patches and sorts by timestamp
//! - [`materialize`] folds the active patches into the content string
//! - [`build_authorship_spans`] attributes every surviving character
//! - [`build_deletion_spans`] reconstructs removed text for strikethrough
//!
//! ## Example
//!
//! ```rust
//! use coauthor_core::{Author, Patch, SectionId};
//! use coauthor_history::{build_authorship_spans, materialize};
//!
//! let section = SectionId::from_string("intro");
//! let history = vec![
//!     Patch::insert(section.clone(), Author::Agent, 0, "Hello ", 1),
//!     Patch::insert(section, Author::User, 6, "world", 2),
//! ];
//!
//! assert_eq!(materialize(&history), "Hello world");
//! assert_eq!(build_authorship_spans(&history).len(), 2);
//! ```

pub mod authorship;
pub mod deletion;
pub mod replay;

pub use authorship::{attribute, build_authorship_spans, Attribution};
pub use deletion::{anchor_through, build_deletion_spans};
pub use replay::{active_patches, materialize, superseded_ids, Splice};
