//! Authorship Replayer.
//!
//! Replays the active history over a per-character ownership buffer and
//! collapses it into maximal same-author runs. Runs merge across patches:
//! authorship is tracked per author, not per patch.

use crate::replay::{CharMeta, Replayer};
use coauthor_core::{AuthorshipSpan, Patch};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Content and authorship produced by a single replay.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribution {
    pub content: String,
    pub spans: Vec<AuthorshipSpan>,
}

/// Who currently owns each surviving character of `patches`.
pub fn build_authorship_spans(patches: &[Patch]) -> Vec<AuthorshipSpan> {
    attribute(patches).spans
}

/// Replay `patches` once, returning both the content and its spans.
pub fn attribute(patches: &[Patch]) -> Attribution {
    let mut replay = Replayer::new(patches);
    replay.run();

    let spans = collapse(replay.meta(), |index| replay.patch(index));
    debug!(
        patches = patches.len(),
        active = replay.len(),
        spans = spans.len(),
        "built authorship spans"
    );

    Attribution {
        content: replay.text(),
        spans,
    }
}

fn collapse<'a>(meta: &[CharMeta], patch: impl Fn(usize) -> &'a Patch) -> Vec<AuthorshipSpan> {
    let mut spans: Vec<AuthorshipSpan> = Vec::new();
    for (offset, owner) in meta.iter().enumerate() {
        match spans.last_mut() {
            Some(span) if span.author == owner.author => span.end = offset + 1,
            _ => spans.push(AuthorshipSpan::new(
                offset,
                offset + 1,
                owner.author,
                patch(owner.patch).id.clone(),
            )),
        }
    }
    spans
}
