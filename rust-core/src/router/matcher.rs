/// Keyword scoring of the catalog against a free-text query

use super::analyzer::{analyze_request, Intent};
use crate::catalog::ToolDescriptor;
use serde::{Deserialize, Serialize};

/// Bonus for the tool identifier (underscores as spaces) appearing in the query.
pub const NAME_MATCH_BONUS: u32 = 2;
/// Bonus for the query intent matching the tool's output category.
pub const INTENT_BONUS: u32 = 1;
/// Added to a tool's keyword count to form the confidence denominator.
///
/// The denominator grows with the number of declared keywords, so tools with
/// few keywords reach a high confidence sooner than tools with many. Known
/// asymmetry; kept as is.
pub const CONFIDENCE_OFFSET: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchResult {
    pub tool: Option<String>,
    pub confidence: f64,
    pub matched_keywords: Vec<String>,
    pub reasoning: String,
    pub intent: Intent,
}

impl MatchResult {
    pub fn none(intent: Intent) -> Self {
        Self {
            tool: None,
            confidence: 0.0,
            matched_keywords: Vec::new(),
            reasoning: "No matching tools found for the query".to_string(),
            intent,
        }
    }

    pub fn is_match(&self) -> bool {
        self.tool.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolScore {
    pub score: u32,
    pub matched_keywords: Vec<String>,
    pub confidence: f64,
}

pub fn score_tool(lower_query: &str, intent: Intent, tool: &ToolDescriptor) -> ToolScore {
    let mut score = 0;
    let mut matched_keywords = Vec::new();

    for keyword in &tool.keywords {
        if lower_query.contains(keyword.as_str()) {
            score += 1;
            matched_keywords.push(keyword.clone());
        }
    }

    if lower_query.contains(&tool.spoken_name()) {
        score += NAME_MATCH_BONUS;
        matched_keywords.push(tool.name.clone());
    }

    if intent.aligns_with(tool.output_type) {
        score += INTENT_BONUS;
    }

    let denominator = (tool.keywords.len() + CONFIDENCE_OFFSET) as f64;
    let confidence = (score as f64 / denominator).min(1.0);

    ToolScore {
        score,
        matched_keywords,
        confidence,
    }
}

/// Picks the highest-confidence tool; the first tool wins ties.
pub fn match_query(query: &str, tools: &[ToolDescriptor]) -> MatchResult {
    let lower = query.to_lowercase();
    let intent = analyze_request(&lower);

    let mut best: Option<(&ToolDescriptor, ToolScore)> = None;
    for tool in tools {
        let scored = score_tool(&lower, intent, tool);
        tracing::debug!(
            tool = %tool.name,
            score = scored.score,
            confidence = scored.confidence,
            "Scored tool"
        );
        let best_confidence = best.as_ref().map(|(_, s)| s.confidence).unwrap_or(0.0);
        if scored.confidence > best_confidence {
            best = Some((tool, scored));
        }
    }

    match best {
        Some((tool, scored)) => MatchResult {
            tool: Some(tool.name.clone()),
            confidence: scored.confidence,
            reasoning: explain(&tool.name, intent, &scored.matched_keywords),
            matched_keywords: scored.matched_keywords,
            intent,
        },
        None => MatchResult::none(intent),
    }
}

fn explain(tool: &str, intent: Intent, keywords: &[String]) -> String {
    if keywords.is_empty() {
        format!("Query matched '{}' on {} intent alone", tool, intent)
    } else {
        format!(
            "Query matched '{}' based on keywords: {}",
            tool,
            keywords.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::builtin::builtin_tools;
    use crate::catalog::OutputCategory;

    #[test]
    fn test_gamma_scenario() {
        let result = match_query("show me the gamma ray formation analysis", &builtin_tools());
        assert_eq!(result.tool.as_deref(), Some("gamma_analyzer"));
        assert_eq!(result.intent, Intent::Visualization);
        assert_eq!(
            result.matched_keywords,
            vec!["gamma", "ray", "formation", "analysis"]
        );
        // 4 keyword hits over 5 keywords + 3
        assert!((result.confidence - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_no_keywords_no_match() {
        let result = match_query("hello", &builtin_tools());
        assert!(!result.is_match());
        assert_eq!(result.confidence, 0.0);
        assert!(result.matched_keywords.is_empty());
    }

    #[test]
    fn test_empty_catalog() {
        let result = match_query("plot the depth curve", &[]);
        assert_eq!(result, MatchResult::none(Intent::Visualization));
    }

    #[test]
    fn test_name_bonus_recorded() {
        let tools = builtin_tools();
        let porosity = tools.iter().find(|t| t.name == "porosity_calculator").unwrap();
        let scored = score_tool("run the porosity calculator", Intent::General, porosity);
        // "porosity" keyword + name bonus
        assert_eq!(scored.score, 1 + NAME_MATCH_BONUS);
        assert_eq!(scored.matched_keywords, vec!["porosity", "porosity_calculator"]);
    }

    #[test]
    fn test_intent_bonus() {
        let tool = ToolDescriptor::new("x", "", OutputCategory::Visualization, ["zzz"]);
        assert_eq!(score_tool("plot", Intent::Visualization, &tool).score, 1);
        assert_eq!(score_tool("plot", Intent::Analysis, &tool).score, 0);
    }

    #[test]
    fn test_confidence_is_bounded_and_monotone() {
        let tool = ToolDescriptor::new("t", "", OutputCategory::Analysis, ["a1", "b2", "c3"]);
        let queries = ["", "a1", "a1 b2", "a1 b2 c3", "a1 b2 c3 t analyze"];
        let mut previous = 0.0;
        for q in queries {
            let c = score_tool(q, analyze_request(q), &tool).confidence;
            assert!((0.0..=1.0).contains(&c));
            assert!(c >= previous, "{} dropped confidence", q);
            previous = c;
        }
        // 3 keywords + name + intent = 6 over 6
        assert_eq!(previous, 1.0);
    }

    #[test]
    fn test_sparse_tools_reach_high_confidence_sooner() {
        let sparse = ToolDescriptor::new("s", "", OutputCategory::Estimation, ["flow"]);
        let dense = ToolDescriptor::new(
            "d",
            "",
            OutputCategory::Estimation,
            ["flow", "k1", "k2", "k3", "k4"],
        );
        let a = score_tool("flow", Intent::General, &sparse).confidence;
        let b = score_tool("flow", Intent::General, &dense).confidence;
        assert!(a > b);
    }

    #[test]
    fn test_first_tool_wins_ties() {
        let a = ToolDescriptor::new("first", "", OutputCategory::Estimation, ["flow"]);
        let b = ToolDescriptor::new("second", "", OutputCategory::Estimation, ["flow"]);
        let result = match_query("flow", &[a, b]);
        assert_eq!(result.tool.as_deref(), Some("first"));
    }

    #[test]
    fn test_idempotent() {
        let tools = builtin_tools();
        let q = "Plot the Depth curve";
        assert_eq!(match_query(q, &tools), match_query(q, &tools));
    }
}
