use crate::catalog::OutputCategory;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Visualization,
    Analysis,
    General,
}

impl Intent {
    /// Whether a tool producing `output` serves this intent.
    pub fn aligns_with(&self, output: OutputCategory) -> bool {
        matches!(
            (self, output),
            (Intent::Visualization, OutputCategory::Visualization)
                | (Intent::Analysis, OutputCategory::Analysis)
        )
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Intent::Visualization => "visualization",
            Intent::Analysis => "analysis",
            Intent::General => "general",
        })
    }
}

/// Expects an already lower-cased query.
pub fn analyze_request(lower: &str) -> Intent {
    // Visualization words win over analysis words
    if contains_visualization_keywords(lower) {
        Intent::Visualization
    } else if contains_analysis_keywords(lower) {
        Intent::Analysis
    } else {
        Intent::General
    }
}

fn contains_visualization_keywords(text: &str) -> bool {
    let keywords = ["plot", "chart", "visualize", "graph", "show"];
    keywords.iter().any(|kw| text.contains(kw))
}

fn contains_analysis_keywords(text: &str) -> bool {
    let keywords = ["analyze", "calculate", "determine", "find"];
    keywords.iter().any(|kw| text.contains(kw))
}
