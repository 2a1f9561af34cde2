use std::collections::{HashMap, HashSet};

use super::ServerInstance;

/// Picks the server that should serve a segment for one query.
///
/// Implementations read cluster state but must not mutate it; `None` means no
/// healthy replica exists and the segment is reported unavailable.
pub trait ReplicaSelector {
    /// Choose one healthy replica for `segment`.
    fn select(&self, segment: &str) -> Option<ServerInstance>;
}

impl<F> ReplicaSelector for F
where
    F: Fn(&str) -> Option<ServerInstance>,
{
    fn select(&self, segment: &str) -> Option<ServerInstance> {
        self(segment)
    }
}

/// Static segment-to-replica assignment with a health overlay.
///
/// Selects the first healthy replica in declared order.
#[derive(Clone, Debug, Default)]
pub struct ReplicaAssignment {
    replicas: HashMap<String, Vec<ServerInstance>>,
    unhealthy: HashSet<String>,
}

impl ReplicaAssignment {
    /// Empty assignment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the replicas hosting `segment`, replacing earlier declarations.
    #[must_use]
    pub fn with_replicas<I>(mut self, segment: impl Into<String>, replicas: I) -> Self
    where
        I: IntoIterator<Item = ServerInstance>,
    {
        self.replicas
            .insert(segment.into(), replicas.into_iter().collect());
        self
    }

    /// Exclude every replica hosted by `instance_id` from selection.
    pub fn mark_unhealthy(&mut self, instance_id: impl Into<String>) {
        self.unhealthy.insert(instance_id.into());
    }

    /// Make `instance_id` selectable again.
    pub fn mark_healthy(&mut self, instance_id: &str) {
        self.unhealthy.remove(instance_id);
    }

    /// Declared replicas for `segment`, healthy or not.
    pub fn replicas(&self, segment: &str) -> &[ServerInstance] {
        self.replicas.get(segment).map(Vec::as_slice).unwrap_or_default()
    }
}

impl ReplicaSelector for ReplicaAssignment {
    fn select(&self, segment: &str) -> Option<ServerInstance> {
        self.replicas(segment)
            .iter()
            .find(|server| !self.unhealthy.contains(server.instance_id()))
            .cloned()
    }
}
