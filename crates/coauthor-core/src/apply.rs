//! Patch Applier - splices one patch into a content string.
//!
//! Two flavours share the same range semantics:
//! - [`apply_patch`] / [`apply_in_place`] are strict and reject ranges that
//!   fall outside the content.
//! - [`apply_clamped`] clamps the range to the content first, matching
//!   splice behaviour. History replay uses it so that a patch authored
//!   against text a superseded patch would have produced still folds.

use crate::error::{PatchError, Result};
use crate::patch::{Operation, Patch};
use std::ops::Range;

/// Number of `char`s in `s`.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte offset of the `index`-th char, or `s.len()` past the end.
pub fn byte_offset(s: &str, index: usize) -> usize {
    s.char_indices()
        .nth(index)
        .map(|(offset, _)| offset)
        .unwrap_or(s.len())
}

/// Apply `patch` to `content`, returning the new content.
pub fn apply_patch(content: &str, patch: &Patch) -> Result<String> {
    let mut buffer = content.to_string();
    apply_in_place(&mut buffer, patch)?;
    Ok(buffer)
}

/// Apply `patch` to a caller-owned buffer.
///
/// On error the buffer is left untouched.
pub fn apply_in_place(buffer: &mut String, patch: &Patch) -> Result<()> {
    let range = checked_range(patch, char_len(buffer))?;
    splice(buffer, range, patch);
    Ok(())
}

/// Apply `patch` after clamping its range to the buffer.
pub fn apply_clamped(buffer: &mut String, patch: &Patch) {
    let range = splice_range(patch, char_len(buffer));
    splice(buffer, range, patch);
}

/// The char range `patch` removes, rejecting anything out of bounds.
pub fn checked_range(patch: &Patch, length: usize) -> Result<Range<usize>> {
    let start = patch.position.start;
    let end = match patch.operation {
        Operation::Insert => start,
        Operation::Replace | Operation::Delete => patch.position.end,
    };
    if start > end || end > length {
        return Err(PatchError::InvalidRange {
            start: patch.position.start,
            end: patch.position.end,
            length,
        });
    }
    Ok(start..end)
}

/// The char range `patch` removes once clamped to `length`.
pub fn splice_range(patch: &Patch, length: usize) -> Range<usize> {
    let start = patch.position.start.min(length);
    let end = match patch.operation {
        Operation::Insert => start,
        Operation::Replace | Operation::Delete => patch.position.end.clamp(start, length),
    };
    start..end
}

fn splice(buffer: &mut String, range: Range<usize>, patch: &Patch) {
    let from = byte_offset(buffer, range.start);
    let to = byte_offset(buffer, range.end);
    let inserted = match patch.operation {
        Operation::Insert | Operation::Replace => patch.content.as_str(),
        Operation::Delete => "",
    };
    buffer.replace_range(from..to, inserted);
}
