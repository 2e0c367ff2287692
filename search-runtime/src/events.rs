//! # Event Bus
//!
//! A `tokio::sync::broadcast`-backed bus that carries status/progress
//! observability across component boundaries. The orchestrator, search
//! service and scheduler emit into it; a host (CLI/TUI/MCP) subscribes.
//! Nothing in this crate reads its own events back — it's a one-way fan-out.
//!
//! ## Usage
//!
//! ```rust
//! use search_runtime::events::{EventBus, CoreEvent, SyncEvent};
//!
//! let bus = EventBus::new(100);
//! let mut sub = bus.subscribe();
//! bus.emit(CoreEvent::Sync(SyncEvent::Started {
//!     job_id: "job-1".to_string(),
//!     source_id: "src-1".to_string(),
//!     is_full_sync: true,
//! }))
//! .ok();
//! ```

use search_async::sync::broadcast;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use search_async::sync::broadcast::error::{RecvError, SendError};
pub use search_async::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel. Subscribers that fall
/// behind by more than this many events receive `RecvError::Lagged`.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 256;

/// Top-level event enum published and received through the event bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    Sync(SyncEvent),
    Search(SearchEvent),
    Scheduler(SchedulerEvent),
    Settings(SettingsEvent),
}

impl CoreEvent {
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Sync(SyncEvent::Failed { .. }) => EventSeverity::Error,
            CoreEvent::Scheduler(SchedulerEvent::TaskFailed { .. }) => EventSeverity::Error,
            CoreEvent::Search(SearchEvent::ArmDegraded { .. }) => EventSeverity::Warning,
            CoreEvent::Sync(SyncEvent::Completed { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

/// Events emitted by the sync orchestrator (C7), one per `sync(source_id)`
/// call plus progress updates in between.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum SyncEvent {
    Started {
        job_id: String,
        source_id: String,
        is_full_sync: bool,
    },
    Progress {
        job_id: String,
        items_discovered: u64,
        items_processed: u64,
        items_failed: u64,
        percent: u8,
        phase: String,
    },
    Completed {
        job_id: String,
        items_added: u64,
        items_updated: u64,
        items_deleted: u64,
        items_failed: u64,
        duration_secs: u64,
    },
    Failed {
        job_id: String,
        message: String,
        items_processed: u64,
    },
    Cancelled {
        job_id: String,
        items_processed: u64,
    },
}

/// Events emitted by the search service (C8).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum SearchEvent {
    Executed {
        mode: String,
        result_count: usize,
        duration_ms: u64,
    },
    ArmDegraded {
        surviving_arm: String,
        reason: String,
    },
    QueryRewritten {
        original_len: usize,
        rewritten_len: usize,
    },
}

/// Events emitted by the background scheduler (C9).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum SchedulerEvent {
    TaskDue { task_id: String },
    TaskStarted { task_id: String },
    TaskCompleted { task_id: String, items_processed: u64 },
    TaskFailed { task_id: String, message: String },
}

/// Events emitted by settings/registry changes (C10).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum SettingsEvent {
    ModeChanged { mode: String },
    EmbeddingProviderChanged { provider: String, dimensions: Option<u32> },
}

/// Broadcast-backed event bus. Cheap to clone; every clone shares the same
/// underlying channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers. Returns the number of
    /// subscribers that received it; an error here just means nobody is
    /// listening right now, which is never fatal to the caller.
    pub fn emit(&self, event: CoreEvent) -> std::result::Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}
