// ABOUTME: Runtime event stream trait - the exporter's only input.
// ABOUTME: A filtered, infinite stream of container lifecycle events.

use super::sealed::Sealed;
use crate::types::ContainerId;
use async_trait::async_trait;
use futures::Stream;
use std::collections::HashMap;
use std::pin::Pin;

/// One runtime-reported lifecycle event for a single container.
#[derive(Debug, Clone)]
pub struct RuntimeEvent {
    pub action: EventAction,
    pub container_id: ContainerId,
    pub labels: HashMap<String, String>,
    /// Exit code string as reported by the runtime, present only on `die`.
    pub exit_code: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventAction {
    Create,
    Start,
    Stop,
    Die,
}

impl EventAction {
    pub fn as_str(self) -> &'static str {
        match self {
            EventAction::Create => "create",
            EventAction::Start => "start",
            EventAction::Stop => "stop",
            EventAction::Die => "die",
        }
    }
}

/// Filter applied at the runtime API boundary, not re-filtered client side.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub actions: Vec<EventAction>,
    pub labels: HashMap<String, String>,
}

#[async_trait]
pub trait EventStream: Sealed + Send + Sync {
    /// Subscribe to the runtime's event feed. The stream runs until dropped;
    /// there is no explicit unsubscribe - the orchestrator cancels it by
    /// dropping the exporter's task on shutdown.
    async fn events(
        &self,
        filter: &EventFilter,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<RuntimeEvent, EventsError>> + Send>>, EventsError>;
}

#[derive(Debug, thiserror::Error)]
pub enum EventsError {
    #[error("stream error: {0}")]
    Stream(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}
