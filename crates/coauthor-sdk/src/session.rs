//! Session facade over a shared document store.
//!
//! A session serializes every write through one lock, resolves conflicts
//! with the configured merge strategy, and broadcasts what happened.

use crate::error::{Result, SdkError};
use coauthor_core::{rebase, Author, AuthorshipSpan, DeletionSpan, Patch, PatchId, SectionId};
use coauthor_db::{DocumentStore, SectionView};
use coauthor_merge::{merge, patch_span, ConflictRecord, MergeConfig, MergeResult, MergeStrategy};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Configuration for a session.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Name used in logs.
    pub name: String,
    /// How overlapping agent and user patches are settled.
    pub merge: MergeConfig,
    /// Capacity of the event broadcast channel.
    pub event_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            name: "session".to_string(),
            merge: MergeConfig::default(),
            event_capacity: 100,
        }
    }
}

/// Builder for session configuration.
pub struct SessionConfigBuilder {
    config: SessionConfig,
}

impl SessionConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: SessionConfig::default(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    pub fn merge_strategy(mut self, strategy: MergeStrategy) -> Self {
        self.config.merge = MergeConfig::new(strategy);
        self
    }

    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.config.event_capacity = capacity.max(1);
        self
    }

    pub fn build(self) -> SessionConfig {
        self.config
    }
}

impl Default for SessionConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Events emitted by a session.
#[derive(Clone, Debug)]
pub enum SessionEvent {
    /// A section was created.
    SectionCreated { section_id: SectionId, title: String },
    /// A patch entered a section's history.
    PatchApplied {
        section_id: SectionId,
        patch_id: PatchId,
        author: Author,
    },
    /// A patch was refused; the history is unchanged.
    PatchRejected {
        section_id: SectionId,
        patch_id: PatchId,
        reason: String,
    },
    /// Two overlapping patches were settled.
    Conflict(ConflictRecord),
    /// The agent finished a section.
    SectionComplete { section_id: SectionId },
}

/// A co-editing session shared by the agent and the user.
pub struct Session {
    config: SessionConfig,
    store: Arc<RwLock<DocumentStore>>,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl Session {
    /// Create a session over an empty store.
    pub fn new(config: SessionConfig) -> Self {
        Self::with_store(DocumentStore::new(), config)
    }

    /// Create a session over an existing store.
    pub fn with_store(store: DocumentStore, config: SessionConfig) -> Self {
        let (event_tx, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            config,
            store: Arc::new(RwLock::new(store)),
            event_tx,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Shared handle to the underlying store.
    pub fn store(&self) -> Arc<RwLock<DocumentStore>> {
        self.store.clone()
    }

    /// Subscribe to session events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    /// Create a new empty section.
    pub fn create_section(&self, title: impl Into<String>, order: u32) -> SectionId {
        let title = title.into();
        let section_id = self.store.write().create_section(title.clone(), order);
        let _ = self.event_tx.send(SessionEvent::SectionCreated {
            section_id: section_id.clone(),
            title,
        });
        section_id
    }

    /// Apply one patch in arrival order.
    pub fn submit(&self, patch: Patch) -> Result<()> {
        let section_id = patch.section_id.clone();
        let patch_id = patch.id.clone();
        let author = patch.author;

        let outcome = self.store.write().apply_patch(patch);
        match outcome {
            Ok(()) => {
                let _ = self.event_tx.send(SessionEvent::PatchApplied {
                    section_id,
                    patch_id,
                    author,
                });
                Ok(())
            }
            Err(err) => {
                warn!(session = %self.config.name, section = %section_id, patch = %patch_id, error = %err, "patch rejected");
                let _ = self.event_tx.send(SessionEvent::PatchRejected {
                    section_id,
                    patch_id,
                    reason: err.to_string(),
                });
                Err(SdkError::from(err))
            }
        }
    }

    /// Settle two competing patches and apply whatever survives.
    ///
    /// Both patches are taken to be authored against the same content. Each
    /// survivor is rebased over the survivors applied before it, and the
    /// whole set is applied under a single write lock, all or nothing. The
    /// returned result carries the patches as stored.
    pub fn resolve_conflict(&self, agent_patch: &Patch, user_patch: &Patch) -> Result<MergeResult> {
        let mut result = merge(agent_patch, user_patch, &self.config.merge);

        let mut survivors: Vec<Patch> = Vec::with_capacity(result.patches.len());
        for patch in &result.patches {
            survivors.push(rebase(patch, &survivors));
        }
        if result.conflict.is_none() {
            result.authorship = survivors.iter().map(patch_span).collect();
        }
        result.patches = survivors;

        let outcome = self.store.write().apply_all(result.patches.clone());
        if let Err(err) = outcome {
            warn!(
                session = %self.config.name,
                agent = %agent_patch.id,
                user = %user_patch.id,
                error = %err,
                "conflict resolution rejected"
            );
            for patch in &result.patches {
                let _ = self.event_tx.send(SessionEvent::PatchRejected {
                    section_id: patch.section_id.clone(),
                    patch_id: patch.id.clone(),
                    reason: err.to_string(),
                });
            }
            return Err(err.into());
        }

        for patch in &result.patches {
            let _ = self.event_tx.send(SessionEvent::PatchApplied {
                section_id: patch.section_id.clone(),
                patch_id: patch.id.clone(),
                author: patch.author,
            });
        }
        if let Some(conflict) = &result.conflict {
            info!(
                session = %self.config.name,
                section = %conflict.section_id,
                winner = %conflict.winner,
                strategy = %conflict.strategy,
                "conflict resolved"
            );
            let _ = self.event_tx.send(SessionEvent::Conflict(conflict.clone()));
        }

        Ok(result)
    }

    /// Mark a section as finished by the agent.
    pub fn complete_section(&self, section_id: &SectionId) -> Result<()> {
        self.store.write().mark_complete(section_id)?;
        let _ = self.event_tx.send(SessionEvent::SectionComplete {
            section_id: section_id.clone(),
        });
        Ok(())
    }

    // === Queries ===

    pub fn content(&self, section_id: &SectionId) -> Result<String> {
        Ok(self.store.read().content(section_id)?.to_string())
    }

    pub fn authorship(&self, section_id: &SectionId) -> Result<Vec<AuthorshipSpan>> {
        Ok(self.store.read().get_authorship(section_id)?)
    }

    pub fn deletions(&self, section_id: &SectionId) -> Result<Vec<DeletionSpan>> {
        Ok(self.store.read().get_deletions(section_id)?)
    }

    pub fn view(&self, section_id: &SectionId) -> Result<SectionView> {
        Ok(self.store.read().section_view(section_id)?)
    }

    /// Section view serialized for the rendering layer.
    pub fn view_json(&self, section_id: &SectionId) -> Result<String> {
        Ok(serde_json::to_string(&self.view(section_id)?)?)
    }

    /// The whole document, sections joined in order.
    pub fn document_content(&self) -> String {
        self.store.read().document_content()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coauthor_core::Position;

    fn session(strategy: MergeStrategy) -> Session {
        Session::new(SessionConfigBuilder::new().merge_strategy(strategy).build())
    }

    #[test]
    fn test_config_builder() {
        let config = SessionConfigBuilder::new()
            .name("draft")
            .merge_strategy(MergeStrategy::Merge)
            .event_capacity(0)
            .build();
        assert_eq!(config.name, "draft");
        assert_eq!(config.merge.strategy, MergeStrategy::Merge);
        assert_eq!(config.event_capacity, 1);
    }

    #[tokio::test]
    async fn test_submit_emits_events() {
        let session = session(MergeStrategy::UserPriority);
        let mut events = session.subscribe();
        let id = session.create_section("Intro", 0);

        let patch = Patch::insert(id.clone(), Author::Agent, 0, "Hello", 1);
        session.submit(patch.clone()).unwrap();

        assert!(matches!(
            events.recv().await.unwrap(),
            SessionEvent::SectionCreated { .. }
        ));
        match events.recv().await.unwrap() {
            SessionEvent::PatchApplied { patch_id, author, .. } => {
                assert_eq!(patch_id, patch.id);
                assert_eq!(author, Author::Agent);
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert_eq!(session.content(&id).unwrap(), "Hello");
    }

    #[tokio::test]
    async fn test_rejected_patch_emits_event() {
        let session = session(MergeStrategy::UserPriority);
        let id = session.create_section("Intro", 0);
        let mut events = session.subscribe();

        let patch = Patch::delete(id.clone(), Author::User, 0, 3, 1).unwrap();
        assert!(session.submit(patch).is_err());
        assert!(matches!(
            events.recv().await.unwrap(),
            SessionEvent::PatchRejected { .. }
        ));
        assert!(session.store().read().history(&id).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_conflict_user_priority() {
        let session = session(MergeStrategy::UserPriority);
        let id = session.create_section("Goals", 0);
        session
            .submit(Patch::insert(id.clone(), Author::User, 0, "Target 5,000 users", 1))
            .unwrap();
        let mut events = session.subscribe();

        let agent = Patch::replace(id.clone(), Author::Agent, 7, 12, "50,000", 2).unwrap();
        let user = Patch::replace(id.clone(), Author::User, 7, 12, "10,000", 3).unwrap();
        let result = session.resolve_conflict(&agent, &user).unwrap();

        assert_eq!(result.winner(), Some(Author::User));
        assert_eq!(session.content(&id).unwrap(), "Target 10,000 users");
        assert!(matches!(
            events.recv().await.unwrap(),
            SessionEvent::PatchApplied { .. }
        ));
        match events.recv().await.unwrap() {
            SessionEvent::Conflict(record) => {
                assert_eq!(record.section_id, id);
                assert_eq!(record.winner, Author::User);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_resolve_conflict_merge_strategy() {
        let session = session(MergeStrategy::Merge);
        let id = session.create_section("Goals", 0);
        session
            .submit(Patch::insert(id.clone(), Author::User, 0, "Target 5,000 users", 1))
            .unwrap();

        let agent = Patch::replace(id.clone(), Author::Agent, 7, 12, "50,000", 2).unwrap();
        let user = Patch::replace(id.clone(), Author::User, 7, 12, "10,000", 3).unwrap();
        session.resolve_conflict(&agent, &user).unwrap();

        assert_eq!(
            session.content(&id).unwrap(),
            "Target 10,000 [Agent: 50,000] users"
        );
        let spans = session.authorship(&id).unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].author, Author::User);
    }

    #[test]
    fn test_non_overlapping_pair_applies_both() {
        let session = session(MergeStrategy::AgentPriority);
        let id = session.create_section("Intro", 0);

        let agent = Patch::insert(id.clone(), Author::Agent, 0, "Hello ", 1);
        let user = Patch::insert(id.clone(), Author::User, 0, "Oh. ", 2);
        let result = session.resolve_conflict(&agent, &user).unwrap();

        assert!(!result.has_conflict());
        assert_eq!(session.content(&id).unwrap(), "Hello Oh. ");
        assert_eq!(result.patches[1].position.start, 6);
    }

    #[test]
    fn test_second_survivor_is_rebased() {
        let session = session(MergeStrategy::UserPriority);
        let id = session.create_section("Intro", 0);
        session
            .submit(Patch::insert(id.clone(), Author::Agent, 0, "abcdefgh", 1))
            .unwrap();

        let agent = Patch::delete(id.clone(), Author::Agent, 0, 2, 2).unwrap();
        let user = Patch::insert(id.clone(), Author::User, 5, "X", 3);
        let result = session.resolve_conflict(&agent, &user).unwrap();

        assert_eq!(session.content(&id).unwrap(), "cdeXfgh");
        assert_eq!(result.patches[1].position, Position::at(3));
        assert_eq!(result.authorship[1].start, 3);
        let spans = session.authorship(&id).unwrap();
        assert_eq!(spans[1].author, Author::User);
        assert_eq!((spans[1].start, spans[1].end), (3, 4));
    }

    #[test]
    fn test_far_insert_lands_after_rebase() {
        let session = session(MergeStrategy::UserPriority);
        let id = session.create_section("Intro", 0);
        session
            .submit(Patch::insert(id.clone(), Author::Agent, 0, "abcdefgh", 1))
            .unwrap();

        let agent = Patch::delete(id.clone(), Author::Agent, 0, 4, 2).unwrap();
        let user = Patch::insert(id.clone(), Author::User, 7, "X", 3);
        session.resolve_conflict(&agent, &user).unwrap();

        assert_eq!(session.content(&id).unwrap(), "efgXh");
        assert_eq!(session.store().read().history(&id).unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_rejected_pair_leaves_no_partial_write() {
        let session = session(MergeStrategy::UserPriority);
        let id = session.create_section("Intro", 0);
        session
            .submit(Patch::insert(id.clone(), Author::Agent, 0, "abcdefgh", 1))
            .unwrap();
        let mut events = session.subscribe();

        let agent = Patch::delete(id.clone(), Author::Agent, 0, 2, 2).unwrap();
        let user = Patch::insert(id.clone(), Author::User, 20, "X", 3);
        assert!(session.resolve_conflict(&agent, &user).is_err());

        assert_eq!(session.content(&id).unwrap(), "abcdefgh");
        assert_eq!(session.store().read().history(&id).unwrap().len(), 1);
        for _ in 0..2 {
            assert!(matches!(
                events.recv().await.unwrap(),
                SessionEvent::PatchRejected { .. }
            ));
        }
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_complete_section() {
        let session = session(MergeStrategy::UserPriority);
        let id = session.create_section("Intro", 0);
        session.complete_section(&id).unwrap();
        assert!(session.view(&id).unwrap().complete);
        assert!(session
            .complete_section(&SectionId::from_string("missing"))
            .is_err());
    }
}
