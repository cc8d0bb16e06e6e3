//! Patch stream driver.
//!
//! Consumes the agent's event stream and feeds it into a [`Session`].
//! A driver moves through `Idle -> Streaming -> Stopped`; a stopped driver
//! has to be reset before it can run again.

use crate::error::{Result, SdkError};
use crate::session::Session;
use coauthor_core::{Patch, SectionId};
use futures::{Stream, StreamExt};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One message on the agent's patch stream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    AgentPatch {
        patch: Patch,
    },
    UserPatch {
        patch: Patch,
    },
    #[serde(rename_all = "camelCase")]
    Conflict {
        agent_patch: Patch,
        user_patch: Patch,
    },
    #[serde(rename_all = "camelCase")]
    SectionComplete {
        section_id: SectionId,
    },
}

impl StreamEvent {
    /// Parse one event from its JSON wire form.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Lifecycle of a stream driver.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StreamState {
    #[default]
    Idle,
    Streaming,
    Stopped,
}

/// Counters for one run of the driver.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamSummary {
    pub applied: usize,
    pub rejected: usize,
    pub conflicts: usize,
    pub completed_sections: usize,
}

impl StreamSummary {
    pub fn total(&self) -> usize {
        self.applied + self.rejected + self.completed_sections
    }
}

/// Feeds a stream of [`StreamEvent`]s into a session.
///
/// Clones share state, so a clone can stop a running driver.
#[derive(Clone)]
pub struct PatchStreamDriver {
    session: Arc<Session>,
    state: Arc<Mutex<StreamState>>,
}

impl PatchStreamDriver {
    pub fn new(session: Arc<Session>) -> Self {
        Self {
            session,
            state: Arc::new(Mutex::new(StreamState::Idle)),
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn state(&self) -> StreamState {
        *self.state.lock()
    }

    /// Enter the streaming state.
    pub fn start(&self) -> Result<()> {
        let mut state = self.state.lock();
        match *state {
            StreamState::Idle => {
                *state = StreamState::Streaming;
                info!(session = %self.session.config().name, "stream started");
                Ok(())
            }
            StreamState::Streaming => Err(SdkError::StreamAlreadyRunning),
            StreamState::Stopped => Err(SdkError::StreamStopped),
        }
    }

    /// Stop streaming. Events still in flight are dropped.
    pub fn stop(&self) {
        let mut state = self.state.lock();
        if *state != StreamState::Stopped {
            *state = StreamState::Stopped;
            info!(session = %self.session.config().name, "stream stopped");
        }
    }

    /// Return a stopped driver to idle.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        if *state == StreamState::Stopped {
            *state = StreamState::Idle;
        }
    }

    /// Apply a single event to the session.
    pub fn handle(&self, event: StreamEvent, summary: &mut StreamSummary) {
        match event {
            StreamEvent::AgentPatch { patch } | StreamEvent::UserPatch { patch } => {
                match self.session.submit(patch) {
                    Ok(()) => summary.applied += 1,
                    Err(_) => summary.rejected += 1,
                }
            }
            StreamEvent::Conflict {
                agent_patch,
                user_patch,
            } => match self.session.resolve_conflict(&agent_patch, &user_patch) {
                Ok(result) => {
                    summary.applied += result.patches.len();
                    if result.has_conflict() {
                        summary.conflicts += 1;
                    }
                }
                Err(_) => summary.rejected += 1,
            },
            StreamEvent::SectionComplete { section_id } => {
                match self.session.complete_section(&section_id) {
                    Ok(()) => summary.completed_sections += 1,
                    Err(err) => {
                        warn!(section = %section_id, error = %err, "cannot complete section");
                        summary.rejected += 1;
                    }
                }
            }
        }
    }

    /// Drain `events` into the session until the stream ends or the driver
    /// is stopped.
    ///
    /// Rejected events are counted, never fatal.
    pub async fn run<S>(&self, events: S) -> Result<StreamSummary>
    where
        S: Stream<Item = StreamEvent>,
    {
        self.start()?;
        let mut events = Box::pin(events);
        let mut summary = StreamSummary::default();

        while let Some(event) = events.next().await {
            if self.state() != StreamState::Streaming {
                debug!("driver stopped, dropping remaining events");
                break;
            }
            self.handle(event, &mut summary);
        }

        self.stop();
        info!(
            session = %self.session.config().name,
            applied = summary.applied,
            rejected = summary.rejected,
            conflicts = summary.conflicts,
            "stream finished"
        );
        Ok(summary)
    }
}
