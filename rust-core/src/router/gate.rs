/// Proceed-or-clarify decision on a match

use super::matcher::MatchResult;
use crate::catalog::ToolCatalog;
use crate::inventory::ResourceFile;
use serde::{Deserialize, Serialize};

pub const UPLOAD_SUGGESTION: &str = "Upload LAS files to enable analysis";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ClarifyReason {
    NoToolMatched,
    InsufficientConfidence,
    NoResourceAvailable,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Proceed(MatchResult),
    Clarify {
        reason: ClarifyReason,
        suggestions: Vec<String>,
    },
}

#[derive(Debug, Clone)]
pub struct ClarificationGate {
    threshold: f64,
    suggestion_tools: usize,
    max_suggestions: usize,
}

impl ClarificationGate {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            suggestion_tools: 3,
            max_suggestions: 5,
        }
    }

    pub fn with_suggestion_limits(mut self, suggestion_tools: usize, max_suggestions: usize) -> Self {
        self.suggestion_tools = suggestion_tools;
        self.max_suggestions = max_suggestions;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Proceeds only with a selected tool, confidence strictly above the
    /// threshold, and at least one input file.
    pub fn decide(
        &self,
        result: MatchResult,
        catalog: &ToolCatalog,
        resources: &[ResourceFile],
    ) -> Decision {
        let reason = if resources.is_empty() {
            Some(ClarifyReason::NoResourceAvailable)
        } else if !result.is_match() {
            Some(ClarifyReason::NoToolMatched)
        } else if result.confidence <= self.threshold {
            Some(ClarifyReason::InsufficientConfidence)
        } else {
            None
        };

        match reason {
            None => Decision::Proceed(result),
            Some(reason) => Decision::Clarify {
                reason,
                suggestions: self.suggestions(&result, catalog, resources.first()),
            },
        }
    }

    /// Pairs the leading catalog tools with the first input file. A partially
    /// matched tool is offered first.
    pub fn suggestions(
        &self,
        result: &MatchResult,
        catalog: &ToolCatalog,
        resource: Option<&ResourceFile>,
    ) -> Vec<String> {
        let target = result
            .tool
            .as_deref()
            .and_then(|name| catalog.get(name).ok());

        let mut tools = Vec::with_capacity(self.suggestion_tools);
        tools.extend(target);
        for tool in catalog.list() {
            if tools.len() >= self.suggestion_tools {
                break;
            }
            if !tools.iter().any(|t| t.name == tool.name) {
                tools.push(tool);
            }
        }

        let data = match resource {
            Some(file) => file.filename.clone(),
            None => "available LAS data".to_string(),
        };

        let mut suggestions: Vec<String> = tools
            .iter()
            .map(|tool| format!("{} using {}", tool.description, data))
            .collect();

        if resource.is_none() {
            suggestions.truncate(self.max_suggestions.saturating_sub(1));
            suggestions.push(UPLOAD_SUGGESTION.to_string());
        }
        suggestions.truncate(self.max_suggestions);
        suggestions
    }
}
