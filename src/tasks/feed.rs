//! Live status feed: polls the task table and yields an event whenever a
//! relation type's snapshot changes. Transport-agnostic; the HTTP layer
//! turns it into server-sent events.

use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

use futures_util::stream::{self, Stream};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_stream::wrappers::IntervalStream;

use super::{TaskManager, TaskSnapshot};
use crate::models::RelationType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DoneReason {
    /// Nothing is running for the user
    NoActiveTasks,
    /// No snapshot changed for the whole idle timeout
    IdleTimeout,
}

impl DoneReason {
    pub fn message(&self) -> &'static str {
        match self {
            DoneReason::NoActiveTasks => "no active tasks",
            DoneReason::IdleTimeout => "idle timeout",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// Snapshots of every running type, sent when anything changed
    Progress(BTreeMap<RelationType, TaskSnapshot>),
    /// A type reached completed, stopped or error
    Finished { relation_type: RelationType, snapshot: TaskSnapshot },
    /// Terminal event; the stream ends after it
    Done { reason: DoneReason },
}

impl FeedEvent {
    /// Event name on the wire: `progress`, the finished status, or `done`
    pub fn name(&self) -> &'static str {
        match self {
            FeedEvent::Progress(_) => "progress",
            FeedEvent::Finished { snapshot, .. } => snapshot.status.as_str(),
            FeedEvent::Done { .. } => "done",
        }
    }

    pub fn data(&self) -> Value {
        match self {
            FeedEvent::Progress(running) => json!(running),
            FeedEvent::Finished { relation_type, snapshot } => {
                let mut value = json!(snapshot);
                if let Some(obj) = value.as_object_mut() {
                    obj.insert("relation_type".to_string(), json!(relation_type));
                }
                value
            }
            FeedEvent::Done { reason } => json!({ "reason": reason, "message": reason.message() }),
        }
    }
}

struct FeedState {
    manager: TaskManager,
    user_id: String,
    ticks: IntervalStream,
    idle_timeout: Duration,
    previous: BTreeMap<RelationType, TaskSnapshot>,
    pending: VecDeque<FeedEvent>,
    last_change: Instant,
    finished: bool,
}

impl FeedState {
    fn poll(&mut self) {
        let current = self.manager.status(&self.user_id);
        let changed: Vec<RelationType> = current
            .iter()
            .filter(|(rt, snapshot)| self.previous.get(rt) != Some(snapshot))
            .map(|(rt, _)| *rt)
            .collect();

        let running: BTreeMap<RelationType, TaskSnapshot> = current
            .iter()
            .filter(|(_, snapshot)| snapshot.is_running())
            .map(|(rt, snapshot)| (*rt, snapshot.clone()))
            .collect();

        if !changed.is_empty() {
            self.last_change = Instant::now();
            for rt in &changed {
                let snapshot = &current[rt];
                if snapshot.status.is_finished() {
                    self.pending.push_back(FeedEvent::Finished { relation_type: *rt, snapshot: snapshot.clone() });
                }
            }
            if !running.is_empty() {
                self.pending.push_back(FeedEvent::Progress(running.clone()));
            }
        }

        if running.is_empty() {
            self.finish(DoneReason::NoActiveTasks);
        } else if self.last_change.elapsed() >= self.idle_timeout {
            log::debug!("Status feed for user {} idle for {:?}", self.user_id, self.idle_timeout);
            self.finish(DoneReason::IdleTimeout);
        }

        self.previous = current;
    }

    fn finish(&mut self, reason: DoneReason) {
        self.pending.push_back(FeedEvent::Done { reason });
        self.finished = true;
    }
}

/// Stream of status changes for one user, ending with a `Done` event.
/// The first poll happens immediately and reports every finished type.
pub fn status_feed(
    manager: TaskManager,
    user_id: impl Into<String>,
    poll_interval: Duration,
    idle_timeout: Duration,
) -> impl Stream<Item = FeedEvent> + Send + 'static {
    let mut interval = time::interval(poll_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let state = FeedState {
        manager,
        user_id: user_id.into(),
        ticks: IntervalStream::new(interval),
        idle_timeout,
        previous: BTreeMap::new(),
        pending: VecDeque::new(),
        last_change: Instant::now(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(event) = state.pending.pop_front() {
                return Some((event, state));
            }
            if state.finished {
                return None;
            }
            // The first tick completes immediately
            tokio_stream::StreamExt::next(&mut state.ticks).await?;
            state.poll();
        }
    })
}
