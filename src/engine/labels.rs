// ABOUTME: Container label vocabulary - the identity protocol the Engine and Exporter share.
// ABOUTME: Labels are the sole ground truth for "what is currently deployed"; no in-memory registry.

use crate::model::Instance;
use std::collections::HashMap;

pub const AGENT_ID: &str = "AgentID";
pub const COMPONENT_ID: &str = "ComponentID";
pub const SERVER_ID: &str = "ServerID";
pub const STATE_HASH: &str = "StateHash";
pub const LEGACY: &str = "Legacy";

/// The label key that carries an instance's own id, which differs by kind.
pub fn instance_id_label(instance: &Instance) -> &'static str {
    match instance {
        Instance::Component(_) => COMPONENT_ID,
        Instance::Server(_) => SERVER_ID,
    }
}

/// Build the label set a freshly-run container carries.
pub fn build_labels(
    node_id: &str,
    instance: &Instance,
    state_hash: &str,
    legacy: bool,
) -> HashMap<String, String> {
    let mut labels = HashMap::new();
    labels.insert(AGENT_ID.to_string(), node_id.to_string());
    labels.insert(
        instance_id_label(instance).to_string(),
        instance.id().to_string(),
    );
    labels.insert(STATE_HASH.to_string(), state_hash.to_string());
    if legacy {
        labels.insert(LEGACY.to_string(), "true".to_string());
    }
    labels
}

/// A label filter selector for `(AgentID, InstanceID)`, independent of whether
/// the instance is a Component or a Server.
pub fn instance_label_filters(node_id: &str, instance: &Instance) -> HashMap<String, String> {
    let mut filters = HashMap::new();
    filters.insert(AGENT_ID.to_string(), node_id.to_string());
    filters.insert(
        instance_id_label(instance).to_string(),
        instance.id().to_string(),
    );
    filters
}

/// Minimal instance identity reconstructed from a running container's labels,
/// used by `stop_all` which has no typed `Instance` to work with - only what
/// the runtime's labels tell it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledInstanceRef {
    pub id: String,
    pub kind: InstanceKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceKind {
    Component,
    Server,
}

/// Recover a `(kind, id)` pair from a container's labels. Returns `None` if
/// the container carries neither a `ComponentID` nor a `ServerID` label -
/// such a container was not created by this agent.
pub fn labeled_instance_ref(labels: &HashMap<String, String>) -> Option<LabeledInstanceRef> {
    if let Some(id) = labels.get(COMPONENT_ID) {
        return Some(LabeledInstanceRef {
            id: id.clone(),
            kind: InstanceKind::Component,
        });
    }
    if let Some(id) = labels.get(SERVER_ID) {
        return Some(LabeledInstanceRef {
            id: id.clone(),
            kind: InstanceKind::Server,
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labeled_instance_ref_prefers_component_label() {
        let mut labels = HashMap::new();
        labels.insert(COMPONENT_ID.to_string(), "c1".to_string());
        let found = labeled_instance_ref(&labels).unwrap();
        assert_eq!(found.id, "c1");
        assert_eq!(found.kind, InstanceKind::Component);
    }

    #[test]
    fn labeled_instance_ref_none_without_instance_label() {
        let mut labels = HashMap::new();
        labels.insert(AGENT_ID.to_string(), "node-1".to_string());
        assert!(labeled_instance_ref(&labels).is_none());
    }
}
