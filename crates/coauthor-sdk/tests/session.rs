//! End-to-end sessions driven by an async patch stream.

use async_stream::stream;
use coauthor_sdk::prelude::*;
use coauthor_sdk::{AuthorshipSpan, StreamState, StreamSummary};
use std::sync::Arc;

fn session(strategy: MergeStrategy) -> Arc<Session> {
    Arc::new(Session::new(
        SessionConfigBuilder::new()
            .name("integration")
            .merge_strategy(strategy)
            .build(),
    ))
}

#[tokio::test]
async fn agent_drafts_and_user_corrects() {
    let session = session(MergeStrategy::UserPriority);
    let goals = session.create_section("Goals", 0);
    let driver = PatchStreamDriver::new(session.clone());

    let suggestion = Patch::insert(goals.clone(), Author::Agent, 0, "Target 5,000 users", 1);
    let correction = Patch::replace(goals.clone(), Author::User, 0, 18, "Target 10,000 users", 2)
        .unwrap()
        .with_supersedes(suggestion.id.clone());
    let section_id = goals.clone();
    let correction_id = correction.id.clone();

    let events = stream! {
        yield StreamEvent::AgentPatch { patch: suggestion };
        tokio::task::yield_now().await;
        yield StreamEvent::UserPatch { patch: correction.clone() };
        yield StreamEvent::SectionComplete { section_id };
    };

    let summary = driver.run(events).await.unwrap();
    assert_eq!(summary.applied, 2);
    assert_eq!(summary.completed_sections, 1);

    let view = session.view(&goals).unwrap();
    assert_eq!(view.content, "Target 10,000 users");
    assert_eq!(
        view.authorship,
        vec![AuthorshipSpan::new(0, 19, Author::User, correction_id)]
    );
    assert!(view.deletions.is_empty());
    assert!(view.complete);
}

#[tokio::test]
async fn user_deletion_is_recorded() {
    let session = session(MergeStrategy::UserPriority);
    let intro = session.create_section("Intro", 0);
    let driver = PatchStreamDriver::new(session.clone());

    let draft = Patch::insert(intro.clone(), Author::Agent, 0, "Hello beautiful world", 1);
    let draft_id = draft.id.clone();
    let cut = Patch::delete(intro.clone(), Author::User, 5, 15, 2).unwrap();

    let events = stream! {
        yield StreamEvent::AgentPatch { patch: draft };
        yield StreamEvent::UserPatch { patch: cut };
    };
    driver.run(events).await.unwrap();

    assert_eq!(session.content(&intro).unwrap(), "Hello world");
    let deletions = session.deletions(&intro).unwrap();
    assert_eq!(deletions.len(), 1);
    assert_eq!(deletions[0].deleted_content, " beautiful");
    assert_eq!(deletions[0].original_author, Author::Agent);
    assert_eq!(deletions[0].deleted_by, Author::User);
    assert_eq!(deletions[0].position, 5);

    let spans = session.authorship(&intro).unwrap();
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].patch_id, draft_id);
}

#[tokio::test]
async fn subscriber_sees_conflict() {
    let session = session(MergeStrategy::Merge);
    let goals = session.create_section("Goals", 0);
    session
        .submit(Patch::insert(goals.clone(), Author::User, 0, "Target 5,000 users", 1))
        .unwrap();

    let mut events = session.subscribe();
    let driver = PatchStreamDriver::new(session.clone());
    let agent = Patch::replace(goals.clone(), Author::Agent, 7, 12, "50,000", 2).unwrap();
    let user = Patch::replace(goals.clone(), Author::User, 7, 12, "10,000", 3).unwrap();

    let summary = driver
        .run(stream! {
            yield StreamEvent::Conflict { agent_patch: agent, user_patch: user };
        })
        .await
        .unwrap();
    assert_eq!(summary.conflicts, 1);

    let mut saw_conflict = false;
    while let Ok(event) = events.try_recv() {
        if let SessionEvent::Conflict(record) = event {
            assert_eq!(record.strategy, MergeStrategy::Merge);
            assert!(record.merged_patch.is_some());
            saw_conflict = true;
        }
    }
    assert!(saw_conflict);
    assert_eq!(
        session.content(&goals).unwrap(),
        "Target 10,000 [Agent: 50,000] users"
    );
}

#[tokio::test]
async fn stopping_drops_remaining_events() {
    let session = session(MergeStrategy::UserPriority);
    let intro = session.create_section("Intro", 0);
    let driver = PatchStreamDriver::new(session.clone());
    let handle = driver.clone();

    let first = Patch::insert(intro.clone(), Author::Agent, 0, "kept", 1);
    let second = Patch::insert(intro.clone(), Author::Agent, 4, " dropped", 2);

    let events = stream! {
        yield StreamEvent::AgentPatch { patch: first };
        handle.stop();
        yield StreamEvent::AgentPatch { patch: second };
    };

    let summary = driver.run(events).await.unwrap();
    assert_eq!(
        summary,
        StreamSummary {
            applied: 1,
            ..Default::default()
        }
    );
    assert_eq!(driver.state(), StreamState::Stopped);
    assert_eq!(session.content(&intro).unwrap(), "kept");
}

#[tokio::test]
async fn events_parsed_from_wire() {
    let session = session(MergeStrategy::UserPriority);
    let intro = session.create_section("Intro", 0);
    let driver = PatchStreamDriver::new(session.clone());

    let wire: Vec<String> = vec![
        StreamEvent::AgentPatch {
            patch: Patch::insert(intro.clone(), Author::Agent, 0, "Hi", 1),
        }
        .to_json()
        .unwrap(),
        r#"{"type":"mystery"}"#.to_string(),
    ];

    let events = stream! {
        for line in wire {
            if let Ok(event) = StreamEvent::from_json(&line) {
                yield event;
            }
        }
    };

    let summary = driver.run(events).await.unwrap();
    assert_eq!(summary.applied, 1);
    assert_eq!(session.content(&intro).unwrap(), "Hi");
}

#[test]
fn blocking_run_with_tokio_test() {
    let session = session(MergeStrategy::AgentPriority);
    let intro = session.create_section("Intro", 0);
    let driver = PatchStreamDriver::new(session.clone());
    let patch = Patch::insert(intro.clone(), Author::Agent, 0, "sync", 1);

    let summary = tokio_test::block_on(driver.run(futures::stream::iter(vec![
        StreamEvent::AgentPatch { patch },
    ])))
    .unwrap();

    assert_eq!(summary.total(), 1);
    assert_eq!(session.document_content(), "sync");
}
