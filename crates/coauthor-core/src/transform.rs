//! Position Adjuster - a one-directional operational transform.
//!
//! Recomputes a pending patch's range after another patch has landed. Only
//! the pending side is transformed; replay in timestamp order remains the
//! source of truth, so this is used for optimistic positioning only.

use crate::patch::Patch;

/// Shift `patch` so it stays valid after `applied` has been applied.
pub fn adjust_patch_position(patch: &Patch, applied: &Patch) -> Patch {
    if patch.section_id != applied.section_id {
        return patch.clone();
    }

    let mut adjusted = patch.clone();
    let span = patch.position.len();

    if patch.position.start >= applied.position.end {
        let offset = applied.net_offset();
        adjusted.position.start = shift(patch.position.start, offset);
        adjusted.position.end = shift(patch.position.end, offset);
    } else if applied.position.strictly_contains(patch.position.start) {
        let start = applied.position.start + applied.inserted_len();
        adjusted.position.start = start;
        adjusted.position.end = start + span;
    }

    adjusted
}

/// Fold [`adjust_patch_position`] over patches applied in order.
pub fn rebase<'a>(patch: &Patch, applied: impl IntoIterator<Item = &'a Patch>) -> Patch {
    applied
        .into_iter()
        .fold(patch.clone(), |pending, landed| {
            adjust_patch_position(&pending, landed)
        })
}

fn shift(offset: usize, by: i64) -> usize {
    if by >= 0 {
        offset.saturating_add(by as usize)
    } else {
        offset.saturating_sub(by.unsigned_abs() as usize)
    }
}
