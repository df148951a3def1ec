//! Structured event definitions for logging.
//!
//! Every event carries the run id and the pipeline stage; events emitted
//! after the configuration is loaded also carry its short hash.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Level::Trace,
            tracing::Level::DEBUG => Level::Debug,
            tracing::Level::INFO => Level::Info,
            tracing::Level::WARN => Level::Warn,
            tracing::Level::ERROR => Level::Error,
        }
    }
}

/// Stages of an analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Startup and configuration loading.
    Init,
    /// Posterior updates and sweeps.
    Update,
    /// Interval and point estimates.
    Summarize,
    /// Synthetic data generation.
    Simulate,
    /// Rendering the report.
    Report,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Init => "init",
            Stage::Update => "update",
            Stage::Summarize => "summarize",
            Stage::Simulate => "simulate",
            Stage::Report => "report",
        };
        write!(f, "{}", s)
    }
}

/// Standard event names used in logging.
pub mod event_names {
    // Run lifecycle
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_FINISHED: &str = "run.finished";

    // Config
    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const CONFIG_PRESET_USED: &str = "config.preset_used";
    pub const CONFIG_ERROR: &str = "config.error";

    // Analysis
    pub const ANALYSIS_STARTED: &str = "analysis.started";
    pub const POSTERIOR_UPDATED: &str = "posterior.updated";
    pub const INTERVAL_FOUND: &str = "interval.found";
    pub const INTERVAL_UNATTAINABLE: &str = "interval.unattainable";
    pub const ANALYSIS_FINISHED: &str = "analysis.finished";

    // Simulation
    pub const SIMULATION_FINISHED: &str = "simulation.finished";

    pub const INTERNAL_ERROR: &str = "internal_error";
}

/// A structured log event for JSONL output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    pub ts: DateTime<Utc>,
    pub level: Level,
    /// Event name (e.g., "analysis.started").
    pub event: String,
    pub run_id: String,
    /// Short hash of the effective configuration, once loaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_id: Option<String>,
    pub stage: Stage,
    pub message: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub fields: HashMap<String, serde_json::Value>,
}

impl LogEvent {
    pub fn new(
        level: Level,
        event: impl Into<String>,
        run_id: impl Into<String>,
        stage: Stage,
        message: impl Into<String>,
    ) -> Self {
        LogEvent {
            ts: Utc::now(),
            level,
            event: event.into(),
            run_id: run_id.into(),
            config_id: None,
            stage,
            message: message.into(),
            fields: HashMap::new(),
        }
    }

    pub fn with_config_id(mut self, config_id: impl Into<String>) -> Self {
        self.config_id = Some(config_id.into());
        self
    }

    /// Add a field to the event.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.fields.insert(key.into(), v);
        }
        self
    }

    /// Serialize to a single JSON line.
    pub fn to_jsonl(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                r#"{{"error":"serialization_failed","event":"{}"}}"#,
                self.event
            )
        })
    }
}

/// Context for generating log events with consistent correlation ids.
#[derive(Debug, Clone)]
pub struct LogContext {
    pub run_id: String,
    pub config_id: Option<String>,
}

impl LogContext {
    pub fn new(run_id: impl Into<String>) -> Self {
        LogContext {
            run_id: run_id.into(),
            config_id: None,
        }
    }

    pub fn with_config_id(mut self, config_id: impl Into<String>) -> Self {
        self.config_id = Some(config_id.into());
        self
    }

    pub fn event(
        &self,
        level: Level,
        event: impl Into<String>,
        stage: Stage,
        message: impl Into<String>,
    ) -> LogEvent {
        let mut e = LogEvent::new(level, event, &self.run_id, stage, message);
        e.config_id.clone_from(&self.config_id);
        e
    }

    pub fn info(&self, event: impl Into<String>, stage: Stage, message: impl Into<String>) -> LogEvent {
        self.event(Level::Info, event, stage, message)
    }

    pub fn warn(&self, event: impl Into<String>, stage: Stage, message: impl Into<String>) -> LogEvent {
        self.event(Level::Warn, event, stage, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event_serialization() {
        let event = LogEvent::new(
            Level::Info,
            "analysis.started",
            "run-12345",
            Stage::Init,
            "Starting analysis",
        )
        .with_config_id("a1b2c3d4e5f6")
        .with_field("grid_points", 200);

        let json = event.to_jsonl();
        assert!(json.contains(r#""event":"analysis.started""#));
        assert!(json.contains(r#""level":"info""#));
        assert!(json.contains(r#""stage":"init""#));
        assert!(json.contains(r#""config_id":"a1b2c3d4e5f6""#));
        assert!(json.contains(r#""grid_points":200"#));
    }

    #[test]
    fn config_id_is_omitted_until_known() {
        let event = LogContext::new("run-abc").warn("config.error", Stage::Init, "bad file");
        let json = event.to_jsonl();
        assert!(!json.contains("config_id"));
        assert_eq!(event.level, Level::Warn);
    }

    #[test]
    fn test_log_context() {
        let ctx = LogContext::new("run-abc").with_config_id("deadbeef0000");
        let event = ctx.info(event_names::INTERVAL_FOUND, Stage::Summarize, "found");
        assert_eq!(event.run_id, "run-abc");
        assert_eq!(event.config_id.as_deref(), Some("deadbeef0000"));
        assert_eq!(event.stage, Stage::Summarize);
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Update.to_string(), "update");
        assert_eq!(serde_json::to_string(&Stage::Summarize).unwrap(), "\"summarize\"");
    }
}
