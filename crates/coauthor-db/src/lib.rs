//! # coauthor-db
//!
//! Store layer for the coauthor engine.
//!
//! This crate provides:
//! - [`DocumentSection`]: a titled, ordered section owning its patch history
//! - [`DocumentStore`]: the set of sections, the single place patches are applied
//! - [`SectionView`]: content, authorship and deletions bundled for rendering
//!
//! ## Example
//!
//! ```rust
//! use coauthor_core::{Author, Patch};
//! use coauthor_db::DocumentStore;
//!
//! let mut store = DocumentStore::new();
//! let intro = store.create_section("Introduction", 0);
//!
//! store.apply_patch(Patch::insert(intro.clone(), Author::Agent, 0, "Hello ", 1)).unwrap();
//! store.apply_patch(Patch::insert(intro.clone(), Author::User, 6, "world", 2)).unwrap();
//!
//! assert_eq!(store.content(&intro).unwrap(), "Hello world");
//! assert_eq!(store.get_authorship(&intro).unwrap().len(), 2);
//! ```

pub mod document;
pub mod error;
pub mod section;

pub use document::{DocumentStore, SECTION_SEPARATOR};
pub use error::{DbError, Result};
pub use section::{DocumentSection, SectionView};
