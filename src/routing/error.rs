/// Error returned while assembling a routing table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoutingError {
    /// A segment was placed twice (under two servers, twice under one server,
    /// or both served and unavailable).
    #[error("segment `{segment}` already placed in routing table")]
    DuplicateSegment {
        /// Offending segment name.
        segment: String,
    },
}
