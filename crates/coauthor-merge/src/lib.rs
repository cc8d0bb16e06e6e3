//! # coauthor-merge
//!
//! Conflict resolution between the two writers of a coauthored document.
//!
//! When an agent patch and a user patch touch the same characters, the
//! configured [`MergeStrategy`] decides the outcome:
//! - `user_priority` keeps the user's patch
//! - `agent_priority` keeps the agent's patch
//! - `merge` keeps the user's text followed by `[Agent: ...]`
//!
//! ## Example
//!
//! ```rust
//! use coauthor_core::{Author, Patch, SectionId};
//! use coauthor_merge::{merge, MergeConfig, MergeStrategy};
//!
//! let section = SectionId::from_string("intro");
//! let agent = Patch::replace(section.clone(), Author::Agent, 0, 5, "Hi", 1).unwrap();
//! let user = Patch::replace(section, Author::User, 2, 5, "ya", 2).unwrap();
//!
//! let result = merge(&agent, &user, &MergeConfig::new(MergeStrategy::UserPriority));
//! assert_eq!(result.winner(), Some(Author::User));
//! ```

pub mod config;
pub mod error;
pub mod merger;

pub use config::{MergeConfig, MergeConfigBuilder, MergeStrategy};
pub use error::{MergeError, Result};
pub use merger::{merge, patch_span, ConflictRecord, MergeResult, AGENT_REMOVED_KEY};
