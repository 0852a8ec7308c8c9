//! Resource records returned by the daemon
//!
//! Field names follow the daemon's JSON (PascalCase). Records are read-only
//! snapshots; fields the query layer does not use are kept loosely typed so
//! that unknown daemon versions still decode.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Shared
// ============================================================================

/// Treat an explicit JSON `null` like a missing field
///
/// The daemon writes unset maps and lists as `null`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Object version used by the swarm for optimistic concurrency
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ObjectVersion {
    #[serde(default)]
    pub index: u64,
}

/// Name and labels carried by swarm object specs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Annotations {
    /// Human-readable object name
    pub name: String,
    /// User labels
    #[serde(deserialize_with = "null_as_default")]
    pub labels: HashMap<String, String>,
}

// ============================================================================
// Services and tasks
// ============================================================================

/// Swarm service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Service {
    #[serde(rename = "ID")]
    pub id: String,
    pub version: ObjectVersion,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub spec: ServiceSpec,
}

/// Service specification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ServiceSpec {
    #[serde(flatten)]
    pub annotations: Annotations,
    /// Replicated/global mode, kept as raw JSON
    pub mode: Option<serde_json::Value>,
    /// Task template, kept as raw JSON
    pub task_template: Option<serde_json::Value>,
}

impl Service {
    /// Service name from its spec annotations
    pub fn name(&self) -> &str {
        &self.spec.annotations.name
    }
}

/// Swarm task (one scheduled replica of a service)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Task {
    #[serde(rename = "ID")]
    pub id: String,
    pub version: ObjectVersion,
    /// Owning service
    #[serde(rename = "ServiceID")]
    pub service_id: String,
    /// Node the task is scheduled on (empty until assigned)
    #[serde(rename = "NodeID")]
    pub node_id: String,
    pub slot: Option<u64>,
    pub desired_state: String,
    pub status: TaskStatus,
}

/// Observed task state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TaskStatus {
    pub timestamp: Option<String>,
    pub state: String,
    pub message: String,
    pub err: Option<String>,
}

// ============================================================================
// Nodes
// ============================================================================

/// Swarm node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Node {
    #[serde(rename = "ID")]
    pub id: String,
    pub version: ObjectVersion,
    pub spec: NodeSpec,
    pub description: NodeDescription,
    pub status: NodeStatus,
}

/// Node specification
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct NodeSpec {
    #[serde(flatten)]
    pub annotations: Annotations,
    /// `worker` or `manager`
    pub role: String,
    /// `active`, `pause` or `drain`
    pub availability: String,
}

/// Node description reported by the engine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct NodeDescription {
    pub hostname: String,
}

/// Node status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct NodeStatus {
    pub state: String,
    pub addr: String,
}

// ============================================================================
// Networks and containers
// ============================================================================

/// Network resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Network {
    pub name: String,
    pub id: String,
    pub created: Option<String>,
    /// `local` or `swarm`
    pub scope: String,
    pub driver: String,
    pub internal: bool,
    pub attachable: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub labels: HashMap<String, String>,
}

/// Container summary (as returned by listing)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Container {
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub names: Vec<String>,
    pub image: String,
    #[serde(rename = "ImageID")]
    pub image_id: String,
    pub command: String,
    pub created: i64,
    pub state: String,
    pub status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub labels: HashMap<String, String>,
}
