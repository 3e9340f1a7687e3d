/// Response records with a stable shape across success and failure

use super::planner::ExecutionStep;
use crate::error::RouterError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Completed,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepRecord {
    pub collaborator: String,
    pub action: String,
    pub result_summary: String,
    pub confidence: f64,
}

impl StepRecord {
    pub fn from_step(step: &ExecutionStep, confidence: f64) -> Self {
        Self {
            collaborator: step.collaborator.clone(),
            action: step.action.clone(),
            result_summary: format!("Prepared: {}", step.description),
            confidence,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FinalResult {
    pub script: String,
    pub resource_file: String,
    pub tool: String,
    pub confidence: f64,
    pub reasoning: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponseEnvelope {
    pub id: String,
    pub query: String,
    pub steps: Vec<StepRecord>,
    pub final_result: FinalResult,
    pub status: Status,
    /// Present (possibly null) in every response.
    pub error: Option<String>,
    /// Captured collaborator output accompanying the error, when any.
    pub collaborator_output: Option<String>,
    pub processing_time_ms: u64,
}

impl ResponseEnvelope {
    pub fn completed(
        query: &str,
        steps: Vec<StepRecord>,
        final_result: FinalResult,
        processing_time_ms: u64,
    ) -> Self {
        Self {
            id: format!("query_{}", Uuid::new_v4()),
            query: query.to_string(),
            steps,
            final_result,
            status: Status::Completed,
            error: None,
            collaborator_output: None,
            processing_time_ms,
        }
    }

    /// Same shape as a success: no steps, blank final result.
    pub fn failed(query: &str, error: &RouterError, processing_time_ms: u64) -> Self {
        Self {
            id: format!("error_{}", Uuid::new_v4()),
            query: query.to_string(),
            steps: Vec::new(),
            final_result: FinalResult {
                reasoning: format!("Routing error: {}", error),
                ..FinalResult::default()
            },
            status: Status::Error,
            error: Some(error.to_string()),
            collaborator_output: error.captured_output().map(str::to_string),
            processing_time_ms,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == Status::Completed
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClarificationResponse {
    pub needs_clarification: bool,
    pub confidence: f64,
    pub suggestions: Vec<String>,
    pub message: String,
    pub agent_plan: Option<Vec<ExecutionStep>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(value: &serde_json::Value) -> Vec<String> {
        let mut keys: Vec<String> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    #[test]
    fn test_error_and_success_share_schema() {
        let ok = ResponseEnvelope::completed(
            "plot depth",
            vec![StepRecord {
                collaborator: "script_runner".to_string(),
                action: "execute_tool".to_string(),
                result_summary: "done".to_string(),
                confidence: 0.75,
            }],
            FinalResult {
                script: "depth_visualization.py".to_string(),
                resource_file: "sample_well_01.las".to_string(),
                tool: "depth_plotter".to_string(),
                confidence: 0.75,
                reasoning: "Query matched 'depth_plotter'".to_string(),
            },
            12,
        );
        let err = ResponseEnvelope::failed("plot depth", &RouterError::NoResourceAvailable, 3);

        let ok_json = serde_json::to_value(&ok).unwrap();
        let err_json = serde_json::to_value(&err).unwrap();
        assert_eq!(keys(&ok_json), keys(&err_json));
        assert_eq!(keys(&ok_json["final_result"]), keys(&err_json["final_result"]));
        assert_eq!(err_json["status"], "error");
        assert_eq!(err_json["final_result"]["confidence"], 0.0);
        assert_eq!(err_json["final_result"]["script"], "");
        assert!(err_json["steps"].as_array().unwrap().is_empty());
        assert!(ok.id.starts_with("query_"));
        assert!(err.id.starts_with("error_"));
    }

    #[test]
    fn test_failed_carries_collaborator_output() {
        let error = RouterError::Collaborator {
            collaborator: "script_runner".to_string(),
            message: "exited with status 1".to_string(),
            output: Some("Traceback".to_string()),
        };
        let envelope = ResponseEnvelope::failed("q", &error, 5);
        assert_eq!(envelope.collaborator_output.as_deref(), Some("Traceback"));
        assert!(envelope.final_result.reasoning.contains("script_runner failed"));
    }

    #[test]
    fn test_clarification_serializes_null_plan() {
        let response = ClarificationResponse {
            needs_clarification: true,
            confidence: 0.0,
            suggestions: vec![],
            message: "more detail please".to_string(),
            agent_plan: None,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert!(json["agent_plan"].is_null());
        assert_eq!(json["needs_clarification"], true);
    }
}
