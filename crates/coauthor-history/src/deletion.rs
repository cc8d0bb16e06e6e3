//! Deletion Replayer.
//!
//! Replays the active history a second time, recording what every delete
//! or replace removed, who wrote it, and where the removal sits in the
//! final content. Nothing is stored besides the patches themselves.

use crate::replay::{CharMeta, Removed, Replayer, Splice};
use coauthor_core::{Author, DeletionSpan, Patch};
use tracing::debug;

/// Deletion markers for `patches`, one per text-removing patch, in replay
/// order.
pub fn build_deletion_spans(patches: &[Patch]) -> Vec<DeletionSpan> {
    let mut replay = Replayer::new(patches);
    let mut splices = Vec::with_capacity(replay.len());
    let mut removals: Vec<(usize, Removed)> = Vec::new();

    for index in 0..replay.len() {
        let removed = replay.step(index);
        splices.push(removed.splice);
        if replay.patch(index).operation.removes_text() && !removed.text.is_empty() {
            removals.push((index, removed));
        }
    }

    let spans: Vec<DeletionSpan> = removals
        .into_iter()
        .map(|(index, removed)| {
            let patch = replay.patch(index);
            DeletionSpan {
                position: anchor_through(removed.splice.start, &splices[index + 1..]),
                deleted_content: removed.text.iter().collect(),
                original_author: majority_author(&removed.meta),
                deleted_by: patch.author,
                patch_id: patch.id.clone(),
            }
        })
        .collect();

    debug!(
        patches = patches.len(),
        deletions = spans.len(),
        "built deletion spans"
    );
    spans
}

/// The agent owns the deletion only with a strict majority.
fn majority_author(meta: &[CharMeta]) -> Author {
    let agent = meta.iter().filter(|m| m.author == Author::Agent).count();
    if agent * 2 > meta.len() {
        Author::Agent
    } else {
        Author::User
    }
}

/// Carry an anchor forward through the splices replay performed after it.
///
/// Splices are the clamped ranges actually applied, not the patches' raw
/// positions.
pub fn anchor_through(mut anchor: usize, later: &[Splice]) -> usize {
    for splice in later {
        if splice.removed == 0 {
            if splice.start <= anchor {
                anchor += splice.inserted;
            }
        } else if splice.end() <= anchor {
            anchor = anchor - splice.removed + splice.inserted;
        } else if splice.start < anchor {
            anchor = splice.start + splice.inserted;
        }
    }
    anchor
}
