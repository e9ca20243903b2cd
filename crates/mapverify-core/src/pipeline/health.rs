//! Connectivity plus data integrity, without history or persistence.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::connectivity::{self, ConnectivityConfig};
use crate::error::StructuralError;
use crate::grade::Status;
use crate::graph::RoomGraph;
use crate::integrity::{self, IntegrityConfig, validate_test_data};
use crate::issue::{Severity, count_severity};
use crate::model::TestData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectivityHealth {
    pub status: Status,
    pub total_rooms: usize,
    pub components: usize,
    pub isolated_rooms: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityHealth {
    pub status: Status,
    pub errors: usize,
    pub warnings: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheck {
    pub timestamp: DateTime<Utc>,
    pub status: HealthStatus,
    pub connectivity: ConnectivityHealth,
    pub data_integrity: IntegrityHealth,
    /// Percentage of the two checks that passed.
    pub overall_score: f64,
}

/// Runs connectivity and data integrity with default settings. Healthy iff
/// both report PASS.
///
/// # Errors
///
/// Returns the [`StructuralError`] when `data` fails setup validation.
pub fn quick_health_check(data: &TestData) -> Result<HealthCheck, StructuralError> {
    validate_test_data(data)?;

    let graph = RoomGraph::build(&data.split);
    let conn = connectivity::validate(&graph, &ConnectivityConfig::default());
    let integ = integrity::validate(&data.source, &data.split, &IntegrityConfig::default());

    let passed = [conn.status, integ.status]
        .iter()
        .filter(|s| **s == Status::Pass)
        .count();
    let status = if passed == 2 {
        HealthStatus::Healthy
    } else {
        HealthStatus::Unhealthy
    };
    tracing::info!(?status, connectivity = %conn.status, integrity = %integ.status, "health check");

    Ok(HealthCheck {
        timestamp: Utc::now(),
        status,
        connectivity: ConnectivityHealth {
            status: conn.status,
            total_rooms: conn.statistics.total_rooms,
            components: conn.components.len(),
            isolated_rooms: conn.isolated_rooms.len(),
        },
        data_integrity: IntegrityHealth {
            status: integ.status,
            errors: count_severity(&integ.issues, Severity::Error),
            warnings: count_severity(&integ.issues, Severity::Warning),
        },
        overall_score: passed as f64 / 2.0 * 100.0,
    })
}
