//! Endpoint identities.
//!
//! # Responsibilities
//! - Name every route the service exposes
//! - Map names and paths to a typed identity
//!
//! # Design Decisions
//! - Closed enum: the endpoint set is fixed at compile time
//! - Names are kebab-case so they double as config values and metric labels

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the demo endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EndpointId {
    Root,
    Health,
    Error,
    TestLogs,
    LokiTest,
    ForceLogs,
    TraceTest,
    Metrics,
}

impl EndpointId {
    /// Every endpoint, in registration order.
    pub const ALL: [EndpointId; 8] = [
        EndpointId::Root,
        EndpointId::Health,
        EndpointId::Error,
        EndpointId::TestLogs,
        EndpointId::LokiTest,
        EndpointId::ForceLogs,
        EndpointId::TraceTest,
        EndpointId::Metrics,
    ];

    /// Stable name, used in config, logs and metric labels.
    pub fn name(self) -> &'static str {
        match self {
            EndpointId::Root => "root",
            EndpointId::Health => "health",
            EndpointId::Error => "error",
            EndpointId::TestLogs => "test-logs",
            EndpointId::LokiTest => "loki-test",
            EndpointId::ForceLogs => "force-logs",
            EndpointId::TraceTest => "trace-test",
            EndpointId::Metrics => "metrics",
        }
    }

    /// Route path served for this endpoint.
    pub fn path(self) -> &'static str {
        match self {
            EndpointId::Root => "/",
            EndpointId::Health => "/health",
            EndpointId::Error => "/error",
            EndpointId::TestLogs => "/test-logs",
            EndpointId::LokiTest => "/loki-test",
            EndpointId::ForceLogs => "/force-logs",
            EndpointId::TraceTest => "/trace-test",
            EndpointId::Metrics => "/metrics",
        }
    }

    /// Look up an endpoint by its route path.
    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.path() == path)
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown endpoint name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown endpoint: {0}")]
pub struct UnknownEndpoint(pub String);

impl FromStr for EndpointId {
    type Err = UnknownEndpoint;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|e| e.name() == s)
            .ok_or_else(|| UnknownEndpoint(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_and_paths_are_unique() {
        let mut names: Vec<_> = EndpointId::ALL.iter().map(|e| e.name()).collect();
        let mut paths: Vec<_> = EndpointId::ALL.iter().map(|e| e.path()).collect();
        names.sort();
        names.dedup();
        paths.sort();
        paths.dedup();
        assert_eq!(names.len(), EndpointId::ALL.len());
        assert_eq!(paths.len(), EndpointId::ALL.len());
    }

    #[test]
    fn test_parse_round_trip_with_serde_names() {
        for endpoint in EndpointId::ALL {
            assert_eq!(endpoint.name().parse::<EndpointId>(), Ok(endpoint));
            let json = serde_json::to_string(&endpoint).unwrap();
            assert_eq!(json, format!("\"{}\"", endpoint.name()));
        }
        assert!("nope".parse::<EndpointId>().is_err());
    }

    #[test]
    fn test_from_path() {
        assert_eq!(EndpointId::from_path("/loki-test"), Some(EndpointId::LokiTest));
        assert_eq!(EndpointId::from_path("/missing"), None);
    }
}
