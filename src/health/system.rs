//! Aggregate system health.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::resilience::{BreakerSnapshot, CircuitState};

/// Health of a single dependency.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ServiceHealth {
    pub state: CircuitState,
    pub healthy: bool,
}

/// Snapshot consumed by the health-check endpoint.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SystemHealth {
    /// False if any circuit is open.
    pub healthy: bool,
    pub services: BTreeMap<String, ServiceHealth>,
    pub open_circuits: Vec<String>,
}

impl SystemHealth {
    pub fn from_snapshots(snapshots: &[BreakerSnapshot]) -> Self {
        let mut services = BTreeMap::new();
        let mut open_circuits = Vec::new();

        for snap in snapshots {
            if snap.state == CircuitState::Open {
                open_circuits.push(snap.name.clone());
            }
            services.insert(
                snap.name.clone(),
                ServiceHealth {
                    state: snap.state,
                    healthy: snap.state == CircuitState::Closed,
                },
            );
        }
        open_circuits.sort();

        Self {
            healthy: open_circuits.is_empty(),
            services,
            open_circuits,
        }
    }
}
