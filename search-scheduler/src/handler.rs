//! # Task handlers
//!
//! One small object per scheduled task, registered with the scheduler at
//! construction (§9 redesign flag: avoid a central `switch` on task id/
//! name, since a new task would otherwise mean editing a shared dispatch
//! site). The scheduler itself never knows what a task does — only that
//! it has a name, an interval, and a handler.

use async_trait::async_trait;

use search_traits::connector::SyncContext;

/// Runs one invocation of a scheduled task. `Ok(items_processed)` on
/// success; `Err(message)` on failure — the scheduler records either
/// outcome as a `TaskResult` (§4.7) and never interprets the message
/// beyond storing it as `last_error`.
#[async_trait]
pub trait TaskHandler: Send + Sync {
    async fn run(&self, ctx: &SyncContext) -> std::result::Result<u64, String>;
}
