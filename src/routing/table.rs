use std::{
    collections::{HashMap, HashSet},
    fmt,
};

use serde::{Deserialize, Serialize};

use super::RoutingError;

/// Identity of a server that can be queried for segments.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ServerInstance {
    instance_id: String,
    hostname: String,
    port: u16,
}

impl ServerInstance {
    /// Describe a server by cluster instance id and network address.
    pub fn new(instance_id: impl Into<String>, hostname: impl Into<String>, port: u16) -> Self {
        Self {
            instance_id: instance_id.into(),
            hostname: hostname.into(),
            port,
        }
    }

    /// Cluster-wide instance id.
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Host name.
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Query port.
    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for ServerInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}:{})", self.instance_id, self.hostname, self.port)
    }
}

/// Per-query assignment of required segments to servers.
///
/// Every segment the query needs appears exactly once: under a single server,
/// or in [`RoutingTable::unavailable_segments`] when no healthy replica was
/// found. The table is immutable once built and is owned by the query that
/// requested it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoutingTable {
    server_to_segments: HashMap<ServerInstance, Vec<String>>,
    unavailable_segments: Vec<String>,
}

impl RoutingTable {
    /// Wrap externally assembled parts, verifying the single-location invariant.
    pub fn try_new(
        server_to_segments: HashMap<ServerInstance, Vec<String>>,
        unavailable_segments: Vec<String>,
    ) -> Result<Self, RoutingError> {
        let mut builder = RoutingTableBuilder::new();
        for (server, segments) in server_to_segments {
            for segment in segments {
                builder.add_segment(server.clone(), segment)?;
            }
        }
        for segment in unavailable_segments {
            builder.add_unavailable(segment)?;
        }
        Ok(builder.build())
    }

    /// Segments to query, keyed by server.
    pub fn server_to_segments(&self) -> &HashMap<ServerInstance, Vec<String>> {
        &self.server_to_segments
    }

    /// Segments assigned to `server`.
    pub fn segments_for(&self, server: &ServerInstance) -> Option<&[String]> {
        self.server_to_segments.get(server).map(Vec::as_slice)
    }

    /// Required segments with no healthy replica.
    pub fn unavailable_segments(&self) -> &[String] {
        &self.unavailable_segments
    }

    /// Servers participating in the query.
    pub fn servers(&self) -> impl Iterator<Item = &ServerInstance> {
        self.server_to_segments.keys()
    }

    /// Number of segments that will be served.
    pub fn num_served_segments(&self) -> usize {
        self.server_to_segments.values().map(Vec::len).sum()
    }

    /// Served plus unavailable segments.
    pub fn num_segments(&self) -> usize {
        self.num_served_segments() + self.unavailable_segments.len()
    }

    /// True when the query needs no segments at all.
    pub fn is_empty(&self) -> bool {
        self.num_segments() == 0
    }

    /// Every segment name in the table, served first.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.server_to_segments
            .values()
            .flatten()
            .chain(self.unavailable_segments.iter())
            .map(String::as_str)
    }

    /// Consume the table.
    pub fn into_parts(self) -> (HashMap<ServerInstance, Vec<String>>, Vec<String>) {
        (self.server_to_segments, self.unavailable_segments)
    }
}

/// Incremental, invariant-checking constructor for [`RoutingTable`].
#[derive(Debug, Default)]
pub struct RoutingTableBuilder {
    server_to_segments: HashMap<ServerInstance, Vec<String>>,
    unavailable_segments: Vec<String>,
    placed: HashSet<String>,
}

impl RoutingTableBuilder {
    /// Empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `segment` has already been placed.
    pub fn contains(&self, segment: &str) -> bool {
        self.placed.contains(segment)
    }

    /// Route `segment` to `server`.
    pub fn add_segment(
        &mut self,
        server: ServerInstance,
        segment: impl Into<String>,
    ) -> Result<&mut Self, RoutingError> {
        let segment = self.claim(segment.into())?;
        self.server_to_segments
            .entry(server)
            .or_default()
            .push(segment);
        Ok(self)
    }

    /// Record `segment` as required but unavailable.
    pub fn add_unavailable(
        &mut self,
        segment: impl Into<String>,
    ) -> Result<&mut Self, RoutingError> {
        let segment = self.claim(segment.into())?;
        self.unavailable_segments.push(segment);
        Ok(self)
    }

    /// Finish the table.
    pub fn build(self) -> RoutingTable {
        RoutingTable {
            server_to_segments: self.server_to_segments,
            unavailable_segments: self.unavailable_segments,
        }
    }

    fn claim(&mut self, segment: String) -> Result<String, RoutingError> {
        if !self.placed.insert(segment.clone()) {
            return Err(RoutingError::DuplicateSegment { segment });
        }
        Ok(segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(id: &str) -> ServerInstance {
        ServerInstance::new(id, format!("{id}.local"), 8098)
    }

    #[test]
    fn builder_groups_segments_by_server() {
        let mut builder = RoutingTableBuilder::new();
        builder
            .add_segment(server("s1"), "seg_0")
            .and_then(|b| b.add_segment(server("s2"), "seg_1"))
            .and_then(|b| b.add_segment(server("s1"), "seg_2"))
            .and_then(|b| b.add_unavailable("seg_3"))
            .expect("distinct segments");
        let table = builder.build();

        assert_eq!(
            table.segments_for(&server("s1")),
            Some(&["seg_0".to_string(), "seg_2".to_string()][..])
        );
        assert_eq!(table.segments_for(&server("s2")), Some(&["seg_1".to_string()][..]));
        assert_eq!(table.unavailable_segments(), &["seg_3".to_string()]);
        assert_eq!(table.num_served_segments(), 3);
        assert_eq!(table.num_segments(), 4);
        assert_eq!(table.servers().count(), 2);

        let mut all: Vec<&str> = table.segments().collect();
        all.sort_unstable();
        assert_eq!(all, vec!["seg_0", "seg_1", "seg_2", "seg_3"]);
    }

    #[test]
    fn builder_rejects_second_placement() {
        let dup = RoutingError::DuplicateSegment {
            segment: "seg".to_string(),
        };

        let mut builder = RoutingTableBuilder::new();
        builder.add_segment(server("s1"), "seg").expect("first placement");
        assert_eq!(builder.add_segment(server("s2"), "seg").err(), Some(dup.clone()));
        assert_eq!(builder.add_segment(server("s1"), "seg").err(), Some(dup.clone()));
        assert_eq!(builder.add_unavailable("seg").err(), Some(dup.clone()));

        let mut builder = RoutingTableBuilder::new();
        builder.add_unavailable("seg").expect("first placement");
        assert!(builder.contains("seg"));
        assert_eq!(builder.add_segment(server("s1"), "seg").err(), Some(dup));
    }

    #[test]
    fn try_new_validates_external_parts() {
        let mut map = HashMap::new();
        map.insert(server("s1"), vec!["a".to_string(), "b".to_string()]);
        map.insert(server("s2"), vec!["c".to_string()]);
        let table = RoutingTable::try_new(map.clone(), vec!["d".to_string()]).expect("valid");
        assert_eq!(table.num_segments(), 4);

        let err = RoutingTable::try_new(map, vec!["a".to_string()]).expect_err("duplicate");
        assert_eq!(
            err,
            RoutingError::DuplicateSegment {
                segment: "a".to_string()
            }
        );
    }

    #[test]
    fn empty_table() {
        let table = RoutingTable::default();
        assert!(table.is_empty());
        let (servers, unavailable) = table.into_parts();
        assert!(servers.is_empty());
        assert!(unavailable.is_empty());
    }
}
