//! Common view over resource records

use std::fmt;

use crate::models::{Container, Network, Node, Service, Task};

/// Resource kinds exposed by the daemon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Service,
    Task,
    Node,
    Network,
    Container,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Service => write!(f, "service"),
            ResourceKind::Task => write!(f, "task"),
            ResourceKind::Node => write!(f, "node"),
            ResourceKind::Network => write!(f, "network"),
            ResourceKind::Container => write!(f, "container"),
        }
    }
}

/// A record with a daemon-assigned identifier
pub trait Resource {
    /// Kind of this record, used in lookup errors
    const KIND: ResourceKind;

    /// Daemon-assigned identifier
    fn id(&self) -> &str;
}

macro_rules! impl_resource {
    ($ty:ty, $kind:expr) => {
        impl Resource for $ty {
            const KIND: ResourceKind = $kind;

            fn id(&self) -> &str {
                &self.id
            }
        }
    };
}

impl_resource!(Service, ResourceKind::Service);
impl_resource!(Task, ResourceKind::Task);
impl_resource!(Node, ResourceKind::Node);
impl_resource!(Network, ResourceKind::Network);
impl_resource!(Container, ResourceKind::Container);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display() {
        assert_eq!(Service::KIND.to_string(), "service");
        assert_eq!(Network::KIND.to_string(), "network");
    }

    #[test]
    fn test_id_accessor() {
        let node = Node {
            id: "n1".to_string(),
            ..Default::default()
        };
        assert_eq!(Resource::id(&node), "n1");
    }
}
