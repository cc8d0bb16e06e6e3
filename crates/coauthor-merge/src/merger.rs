//! Conflict Merger - settles competing agent and user patches.
//!
//! Non-overlapping pairs are not a conflict: both patches survive. When the
//! ranges overlap, the configured [`MergeStrategy`] picks the outcome.

use crate::config::{MergeConfig, MergeStrategy};
use coauthor_core::{overlaps, Author, AuthorshipSpan, Operation, Patch, PatchId, SectionId};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Enough of a resolved conflict to rebuild a `conflict` notification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictRecord {
    pub section_id: SectionId,
    pub agent_patch: PatchId,
    pub user_patch: PatchId,
    pub strategy: MergeStrategy,
    pub winner: Author,
    /// Id of the synthesized patch under [`MergeStrategy::Merge`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged_patch: Option<PatchId>,
}

/// The outcome of merging two patches.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeResult {
    /// Always true; overlap is resolved, never refused.
    pub success: bool,
    /// Surviving patches in timestamp order.
    pub patches: Vec<Patch>,
    /// Spans for the surviving text, in the same order as `patches`.
    pub authorship: Vec<AuthorshipSpan>,
    /// Present only when the patches overlapped.
    pub conflict: Option<ConflictRecord>,
}

impl MergeResult {
    pub fn has_conflict(&self) -> bool {
        self.conflict.is_some()
    }

    /// The winning author, if there was a conflict.
    pub fn winner(&self) -> Option<Author> {
        self.conflict.as_ref().map(|c| c.winner)
    }
}

/// The span a patch's own text occupies right after it lands.
pub fn patch_span(patch: &Patch) -> AuthorshipSpan {
    let range = patch.inserted_range();
    AuthorshipSpan::new(range.start, range.end, patch.author, patch.id.clone())
}

/// Merge an agent patch with a user patch under `config`.
///
/// Both patches are expected to come from their named writer; same-author
/// pairs are not checked.
pub fn merge(agent_patch: &Patch, user_patch: &Patch, config: &MergeConfig) -> MergeResult {
    if !overlaps(agent_patch, user_patch) {
        debug!(
            agent = %agent_patch.id,
            user = %user_patch.id,
            "patches do not overlap, keeping both"
        );
        return keep_both(agent_patch, user_patch);
    }

    let strategy = config.strategy;
    debug!(
        section = %user_patch.section_id,
        agent = %agent_patch.id,
        user = %user_patch.id,
        %strategy,
        "resolving overlapping patches"
    );

    let record = |winner: Author, merged_patch: Option<PatchId>| ConflictRecord {
        section_id: user_patch.section_id.clone(),
        agent_patch: agent_patch.id.clone(),
        user_patch: user_patch.id.clone(),
        strategy,
        winner,
        merged_patch,
    };

    match strategy {
        MergeStrategy::UserPriority => MergeResult {
            success: true,
            patches: vec![user_patch.clone()],
            authorship: vec![patch_span(user_patch)],
            conflict: Some(record(Author::User, None)),
        },
        MergeStrategy::AgentPriority => MergeResult {
            success: true,
            patches: vec![agent_patch.clone()],
            authorship: vec![patch_span(agent_patch)],
            conflict: Some(record(Author::Agent, None)),
        },
        MergeStrategy::Merge => {
            let merged = merged_patch(agent_patch, user_patch);
            let authorship = merged_spans(&merged, user_patch.inserted_len());
            let conflict = Some(record(Author::User, Some(merged.id.clone())));
            MergeResult {
                success: true,
                patches: vec![merged],
                authorship,
                conflict,
            }
        }
    }
}

fn keep_both(agent_patch: &Patch, user_patch: &Patch) -> MergeResult {
    let mut patches = vec![agent_patch.clone(), user_patch.clone()];
    patches.sort_by_key(|p| p.timestamp);
    let authorship = patches.iter().map(patch_span).collect();
    MergeResult {
        success: true,
        patches,
        authorship,
        conflict: None,
    }
}

/// Metadata key recording the range a content-less agent patch removed.
pub const AGENT_REMOVED_KEY: &str = "agentRemoved";

/// `"<user content> [Agent: <agent content>]"`, authored as the user.
///
/// An agent patch without content leaves no annotation; the range it
/// removed is kept under [`AGENT_REMOVED_KEY`] instead. If neither side
/// contributes text the user's delete stands as is.
fn merged_patch(agent_patch: &Patch, user_patch: &Patch) -> Patch {
    let user_text = match user_patch.operation {
        Operation::Insert | Operation::Replace => user_patch.content.as_str(),
        Operation::Delete => "",
    };
    let content = if agent_patch.content.is_empty() {
        user_text.to_string()
    } else {
        format!("{} [Agent: {}]", user_text, agent_patch.content)
    };
    let operation = match user_patch.operation {
        Operation::Insert => Operation::Insert,
        Operation::Delete if content.is_empty() => Operation::Delete,
        Operation::Replace | Operation::Delete => Operation::Replace,
    };

    let mut metadata = user_patch.metadata.clone();
    metadata.merged = true;
    metadata.original_agent_content = Some(agent_patch.content.clone());
    if agent_patch.content.is_empty() && agent_patch.operation.removes_text() {
        metadata.set(AGENT_REMOVED_KEY, agent_patch.position.to_string());
    }

    Patch {
        id: PatchId::from_string(format!("merged-{}-{}", agent_patch.id, user_patch.id)),
        section_id: user_patch.section_id.clone(),
        author: Author::User,
        operation,
        content,
        position: user_patch.position,
        timestamp: user_patch.timestamp,
        supersedes: user_patch.supersedes.clone(),
        metadata,
    }
}

/// User portion as `user`, annotation suffix as `agent`.
fn merged_spans(merged: &Patch, user_len: usize) -> Vec<AuthorshipSpan> {
    let start = merged.position.start;
    let split = start + user_len;
    let end = start + merged.content_len();

    let mut spans = Vec::with_capacity(2);
    if user_len > 0 {
        spans.push(AuthorshipSpan::new(
            start,
            split,
            Author::User,
            merged.id.clone(),
        ));
    }
    if end > split {
        spans.push(AuthorshipSpan::new(
            split,
            end,
            Author::Agent,
            merged.id.clone(),
        ));
    }
    spans
}
