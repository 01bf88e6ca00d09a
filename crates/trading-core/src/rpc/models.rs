//! Payloads exchanged with the risk monitor and test coordinator

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionSide {
    Long,
    Short,
}

/// A trading position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub instrument_id: String,
    pub quantity: f64,
    pub value: f64,
    pub side: PositionSide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StrategyState {
    Active,
    Stopped,
    Error,
}

/// Strategy status reported to the risk monitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyStatus {
    pub strategy_id: String,
    pub status: StrategyState,
    #[serde(default)]
    pub positions: Vec<Position>,
    #[serde(default = "Utc::now")]
    pub last_updated: DateTime<Utc>,
}

impl StrategyStatus {
    pub fn new(strategy_id: impl Into<String>, status: StrategyState) -> Self {
        Self {
            strategy_id: strategy_id.into(),
            status,
            positions: Vec::new(),
            last_updated: Utc::now(),
        }
    }

    pub fn with_positions(mut self, positions: Vec<Position>) -> Self {
        self.positions = positions;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScenarioState {
    Running,
    Completed,
    Failed,
}

/// Test scenario status exchanged with the test coordinator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioStatus {
    pub scenario_id: String,
    pub status: ScenarioState,
    #[serde(default = "Utc::now")]
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

impl ScenarioStatus {
    pub fn new(scenario_id: impl Into<String>, status: ScenarioState) -> Self {
        Self {
            scenario_id: scenario_id.into(),
            status,
            start_time: Utc::now(),
            end_time: None,
        }
    }
}

/// Chaos engineering event reported to the test coordinator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChaosEvent {
    pub event_type: String,
    pub target_service: String,
    pub event_id: String,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, Value>>,
}

impl ChaosEvent {
    pub fn new(
        event_type: impl Into<String>,
        target_service: impl Into<String>,
        event_id: impl Into<String>,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            target_service: target_service.into(),
            event_id: event_id.into(),
            timestamp: Utc::now(),
            metadata: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServingStatus {
    Serving,
    NotServing,
}

/// Health check reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ServingStatus,
    pub service: String,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn serving(service: impl Into<String>) -> Self {
        Self {
            status: ServingStatus::Serving,
            service: service.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn is_serving(&self) -> bool {
        self.status == ServingStatus::Serving
    }
}

/// Reply to a strategy status submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionAck {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

/// Current risk figures published by the risk monitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    pub position_limit_utilization: f64,
    pub total_exposure: f64,
    pub risk_score: f64,
}

/// Reply to a scenario status submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioAck {
    pub success: bool,
    pub scenario_id: String,
}

/// Reply to a chaos event report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaosAck {
    pub acknowledged: bool,
    pub event_id: String,
}

/// Reply listing the scenarios the coordinator is running
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveScenarios {
    #[serde(default)]
    pub scenarios: Vec<ScenarioStatus>,
}
