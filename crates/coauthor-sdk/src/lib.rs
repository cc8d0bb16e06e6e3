//! Coauthor SDK - session facade for agent/user co-editing
//!
//! The SDK wraps the store in a [`Session`] that serializes writes,
//! resolves conflicts with a configured merge strategy, and broadcasts
//! [`SessionEvent`]s. A [`PatchStreamDriver`] feeds an agent's event
//! stream into a session.
//!
//! # Quick Start
//!
//! ```rust
//! use coauthor_sdk::prelude::*;
//!
//! let session = Session::new(SessionConfig::default());
//! let intro = session.create_section("Introduction", 0);
//!
//! session.submit(Patch::insert(intro.clone(), Author::Agent, 0, "Hello ", 1)).unwrap();
//! session.submit(Patch::insert(intro.clone(), Author::User, 6, "world", 2)).unwrap();
//!
//! assert_eq!(session.content(&intro).unwrap(), "Hello world");
//! ```
//!
//! # Architecture
//!
//! - [`session`] - the shared store, conflict resolution and events
//! - [`stream`] - the patch stream wire format and its driver
//! - [`error`] - Error types

pub mod error;
pub mod session;
pub mod stream;

pub use error::{Result, SdkError};
pub use session::{Session, SessionConfig, SessionConfigBuilder, SessionEvent};
pub use stream::{PatchStreamDriver, StreamEvent, StreamState, StreamSummary};

// Re-export the engine types callers need to build patches
pub use coauthor_core::{
    Author, AuthorshipSpan, DeletionSpan, Operation, Patch, PatchId, PatchMetadata, Position,
    SectionId,
};
pub use coauthor_db::{DocumentStore, SectionView};
pub use coauthor_merge::{ConflictRecord, MergeConfig, MergeResult, MergeStrategy};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::SdkError;
    pub use crate::session::{Session, SessionConfig, SessionConfigBuilder, SessionEvent};
    pub use crate::stream::{PatchStreamDriver, StreamEvent};
    pub use coauthor_core::{Author, Patch, SectionId};
    pub use coauthor_merge::MergeStrategy;
}
