//! Integration tests for the section store.
//!
//! These tests verify:
//! - Content always equals the fold of the active history
//! - Rejected patches never touch the history
//! - Derived views are stable across repeated queries

use coauthor_core::{char_len, is_partition, Author, Patch, SectionId};
use coauthor_db::{DbError, DocumentStore};
use coauthor_history::materialize;
use proptest::prelude::*;

fn edit_strategy() -> impl Strategy<Value = Vec<(bool, u8, usize, usize, String)>> {
    prop::collection::vec(
        (any::<bool>(), 0u8..3, 0usize..40, 0usize..8, "[a-z]{1,4}"),
        1..30,
    )
}

fn build_patch(
    section: &SectionId,
    (agent, op, start, span, text): (bool, u8, usize, usize, String),
    timestamp: u64,
) -> Patch {
    let author = if agent { Author::Agent } else { Author::User };
    match op {
        0 => Patch::insert(section.clone(), author, start, text, timestamp),
        1 => Patch::replace(section.clone(), author, start, start + span, text, timestamp).unwrap(),
        _ => Patch::delete(section.clone(), author, start, start + span, timestamp).unwrap(),
    }
}

proptest! {
    #[test]
    fn content_matches_history_fold(edits in edit_strategy()) {
        let mut store = DocumentStore::new();
        let id = store.create_section("Body", 0);

        for (i, edit) in edits.into_iter().enumerate() {
            let before = store.history(&id).unwrap().len();
            match store.apply_patch(build_patch(&id, edit, i as u64)) {
                Ok(()) => {
                    prop_assert_eq!(store.history(&id).unwrap().len(), before + 1);
                }
                Err(DbError::Patch(err)) => {
                    prop_assert!(err.is_range_error());
                    prop_assert_eq!(store.history(&id).unwrap().len(), before);
                }
                Err(other) => {
                    prop_assert!(false, "unexpected error: {}", other);
                }
            }
            let content = store.content(&id).unwrap().to_string();
            prop_assert_eq!(&content, &materialize(store.history(&id).unwrap()));

            let spans = store.get_authorship(&id).unwrap();
            prop_assert!(is_partition(&spans, char_len(&content)));
        }
    }

    #[test]
    fn derived_views_are_stable(edits in edit_strategy()) {
        let mut store = DocumentStore::new();
        let id = store.create_section("Body", 0);
        for (i, edit) in edits.into_iter().enumerate() {
            let _ = store.apply_patch(build_patch(&id, edit, i as u64));
        }
        prop_assert_eq!(store.section_view(&id).unwrap(), store.section_view(&id).unwrap());
    }
}

#[test]
fn patches_for_missing_sections_are_dropped() {
    let mut store = DocumentStore::new();
    let real = store.create_section("Real", 0);
    let ghost = SectionId::from_string("ghost");

    let err = store
        .apply_patch(Patch::insert(ghost, Author::Agent, 0, "boo", 1))
        .unwrap_err();
    assert!(matches!(err, DbError::MissingSection(_)));
    assert!(store.history(&real).unwrap().is_empty());
}

#[test]
fn user_correction_of_agent_suggestion() {
    let mut store = DocumentStore::new();
    let goals = store.create_section("Goals", 0);

    let agent = Patch::insert(goals.clone(), Author::Agent, 0, "Target 5,000 users", 1);
    let correction = Patch::replace(goals.clone(), Author::User, 0, 18, "Target 10,000 users", 2)
        .unwrap()
        .with_supersedes(agent.id.clone());

    store.apply_patch(agent).unwrap();
    store.apply_patch(correction).unwrap();

    let view = store.section_view(&goals).unwrap();
    assert_eq!(view.content, "Target 10,000 users");
    assert_eq!(view.authorship.len(), 1);
    assert_eq!(view.authorship[0].author, Author::User);
    assert!(view.deletions.is_empty());
}

#[test]
fn deletion_of_agent_text_by_user() {
    let mut store = DocumentStore::new();
    let id = store.create_section("Body", 0);
    store
        .apply_patch(Patch::insert(id.clone(), Author::Agent, 0, "Hello beautiful world", 1))
        .unwrap();
    store
        .apply_patch(Patch::delete(id.clone(), Author::User, 5, 15, 2).unwrap())
        .unwrap();

    assert_eq!(store.content(&id).unwrap(), "Hello world");
    let deletions = store.get_deletions(&id).unwrap();
    assert_eq!(deletions.len(), 1);
    assert_eq!(deletions[0].position, 5);
    assert_eq!(deletions[0].original_author, Author::Agent);
    assert_eq!(deletions[0].deleted_by, Author::User);
}
