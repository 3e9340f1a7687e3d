/// Tool catalog: descriptors, per-session snapshot, and interchangeable sources

pub mod builtin;
pub mod command;
pub mod discovery;

pub use builtin::StaticCatalog;
pub use command::CommandCatalog;
pub use discovery::DiscoveredCatalog;

use crate::error::{Result, RouterError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OutputCategory {
    Visualization,
    Analysis,
    Calculation,
    Estimation,
}

impl OutputCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputCategory::Visualization => "visualization",
            OutputCategory::Analysis => "analysis",
            OutputCategory::Calculation => "calculation",
            OutputCategory::Estimation => "estimation",
        }
    }
}

impl fmt::Display for OutputCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub output_type: OutputCategory,
    pub keywords: Vec<String>,
    #[serde(default)]
    pub compatible_scripts: Vec<String>,
    #[serde(default = "default_implemented")]
    pub implemented: bool,
}

fn default_implemented() -> bool {
    true
}

impl ToolDescriptor {
    pub fn new<K, S>(
        name: impl Into<String>,
        description: impl Into<String>,
        output_type: OutputCategory,
        keywords: K,
    ) -> Self
    where
        K: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tool = Self {
            name: name.into(),
            description: description.into(),
            output_type,
            keywords: Vec::new(),
            compatible_scripts: Vec::new(),
            implemented: true,
        };
        tool.extend_keywords(keywords);
        tool
    }

    pub fn with_script(mut self, script: impl Into<String>) -> Self {
        self.compatible_scripts.push(script.into());
        self
    }

    pub fn unimplemented(mut self) -> Self {
        self.implemented = false;
        self
    }

    /// Adds keywords lower-cased, keeping first occurrence order and dropping duplicates.
    pub fn extend_keywords<K, S>(&mut self, keywords: K)
    where
        K: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for keyword in keywords {
            let keyword = keyword.as_ref().trim().to_lowercase();
            if !keyword.is_empty() && !self.keywords.contains(&keyword) {
                self.keywords.push(keyword);
            }
        }
    }

    /// Re-establishes the keyword invariants on descriptors that came from outside
    /// (deserialized from a discovery process, for instance).
    pub fn normalized(mut self) -> Self {
        let keywords = std::mem::take(&mut self.keywords);
        self.extend_keywords(keywords);
        self
    }

    /// The identifier with underscores replaced by spaces, as a user would type it.
    pub fn spoken_name(&self) -> String {
        self.name.replace('_', " ")
    }

    pub fn primary_script(&self, script_extension: &str) -> String {
        self.compatible_scripts
            .first()
            .cloned()
            .unwrap_or_else(|| format!("{}.{}", self.name, script_extension))
    }
}

/// Immutable catalog snapshot for one routing session.
#[derive(Debug, Clone, Default)]
pub struct ToolCatalog {
    tools: Vec<ToolDescriptor>,
}

impl ToolCatalog {
    /// Later descriptors reusing an identifier are dropped.
    pub fn new(tools: Vec<ToolDescriptor>) -> Self {
        let mut unique: Vec<ToolDescriptor> = Vec::with_capacity(tools.len());
        for tool in tools {
            if unique.iter().any(|t| t.name == tool.name) {
                tracing::warn!(tool = %tool.name, "Duplicate tool identifier ignored");
                continue;
            }
            unique.push(tool);
        }
        Self { tools: unique }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn list(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name.clone()).collect()
    }

    pub fn get(&self, name: &str) -> Result<&ToolDescriptor> {
        self.tools
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| RouterError::ToolNotFound {
                name: name.to_string(),
                available: self.names(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.iter().any(|t| t.name == name)
    }

    pub fn by_output(&self, output_type: OutputCategory) -> Vec<&ToolDescriptor> {
        self.tools
            .iter()
            .filter(|t| t.output_type == output_type)
            .collect()
    }

    /// Tools ranked by how many of `keywords` they declare, best first.
    pub fn search_by_keywords(&self, keywords: &[&str]) -> Vec<KeywordHit<'_>> {
        let mut hits: Vec<KeywordHit<'_>> = self
            .tools
            .iter()
            .filter_map(|tool| {
                let matched: Vec<String> = keywords
                    .iter()
                    .map(|k| k.to_lowercase())
                    .filter(|k| tool.keywords.contains(k))
                    .collect();
                if matched.is_empty() {
                    None
                } else {
                    Some(KeywordHit {
                        tool,
                        score: matched.len(),
                        matched_keywords: matched,
                    })
                }
            })
            .collect();

        // stable sort keeps catalog order among equal scores
        hits.sort_by(|a, b| b.score.cmp(&a.score));
        hits
    }

    pub fn validate_combination(&self, script: &str, tool: &str) -> Result<&ToolDescriptor> {
        let descriptor = self.get(tool)?;
        if descriptor.compatible_scripts.iter().any(|s| s == script) {
            Ok(descriptor)
        } else {
            Err(RouterError::InvalidInput(format!(
                "Script '{}' is not compatible with tool '{}' (compatible: {})",
                script,
                tool,
                descriptor.compatible_scripts.join(", ")
            )))
        }
    }
}

#[derive(Debug, Clone)]
pub struct KeywordHit<'a> {
    pub tool: &'a ToolDescriptor,
    pub score: usize,
    pub matched_keywords: Vec<String>,
}

/// A backend able to populate the catalog for a routing session.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    fn name(&self) -> &str;

    async fn load(&self) -> Result<Vec<ToolDescriptor>>;
}

/// Loads a session snapshot; an unreachable source degrades to an empty catalog.
pub async fn load_catalog(source: &dyn CatalogSource) -> ToolCatalog {
    match source.load().await {
        Ok(tools) => {
            tracing::debug!(source = source.name(), tools = tools.len(), "Catalog loaded");
            ToolCatalog::new(tools)
        }
        Err(e) => {
            tracing::warn!(source = source.name(), error = %e, "Catalog unavailable, continuing with empty catalog");
            ToolCatalog::empty()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ToolCatalog {
        ToolCatalog::new(builtin::extended_tools())
    }

    struct UnreachableSource;

    #[async_trait]
    impl CatalogSource for UnreachableSource {
        fn name(&self) -> &str {
            "unreachable"
        }

        async fn load(&self) -> Result<Vec<ToolDescriptor>> {
            Err(RouterError::Timeout("catalog table".to_string()))
        }
    }

    #[tokio::test]
    async fn test_unreachable_source_loads_empty_catalog() {
        let catalog = load_catalog(&UnreachableSource).await;
        assert!(catalog.is_empty());
        assert!(catalog.names().is_empty());
        assert!(matches!(
            catalog.get("depth_plotter"),
            Err(RouterError::ToolNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_static_source_loads_builtin_catalog() {
        let catalog = load_catalog(&StaticCatalog::new()).await;
        assert_eq!(catalog.len(), 5);
    }

    #[test]
    fn test_keywords_are_deduplicated_and_lowercased() {
        let tool = ToolDescriptor::new(
            "sonic_analyzer",
            "Sonic log analysis",
            OutputCategory::Analysis,
            ["Sonic", "slowness", "sonic", " ", "SLOWNESS"],
        );
        assert_eq!(tool.keywords, vec!["sonic", "slowness"]);
        assert_eq!(tool.spoken_name(), "sonic analyzer");
    }

    #[test]
    fn test_get_unknown_tool_enumerates_identifiers() {
        let catalog = catalog();
        match catalog.get("sonic_analyzer") {
            Err(RouterError::ToolNotFound { name, available }) => {
                assert_eq!(name, "sonic_analyzer");
                assert_eq!(available.len(), catalog.len());
                assert!(available.contains(&"gamma_analyzer".to_string()));
            }
            other => panic!("expected ToolNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_identifiers_keep_first() {
        let first = ToolDescriptor::new("a", "first", OutputCategory::Analysis, ["x"]);
        let second = ToolDescriptor::new("a", "second", OutputCategory::Analysis, ["y"]);
        let catalog = ToolCatalog::new(vec![first, second]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("a").unwrap().description, "first");
    }

    #[test]
    fn test_search_by_keywords_ranks_by_hits() {
        let catalog = catalog();
        let hits = catalog.search_by_keywords(&["Reservoir", "porosity"]);
        assert_eq!(hits[0].tool.name, "porosity_calculator");
        assert_eq!(hits[0].score, 2);
        assert!(hits.iter().any(|h| h.tool.name == "permeability_estimator"));
        assert!(catalog.search_by_keywords(&["seismic"]).is_empty());
    }

    #[test]
    fn test_by_output() {
        let catalog = catalog();
        let estimators = catalog.by_output(OutputCategory::Estimation);
        assert_eq!(estimators.len(), 1);
        assert_eq!(estimators[0].name, "permeability_estimator");
    }

    #[test]
    fn test_validate_combination() {
        let catalog = catalog();
        assert!(catalog
            .validate_combination("porosity_calculator.py", "porosity_calculator")
            .is_ok());
        assert!(matches!(
            catalog.validate_combination("depth_visualization.py", "porosity_calculator"),
            Err(RouterError::InvalidInput(_))
        ));
        assert!(matches!(
            catalog.validate_combination("x.py", "nope"),
            Err(RouterError::ToolNotFound { .. })
        ));
    }

    #[test]
    fn test_primary_script_fallback() {
        let tool = ToolDescriptor::new("sonic_analyzer", "", OutputCategory::Analysis, ["sonic"]);
        assert_eq!(tool.primary_script("py"), "sonic_analyzer.py");
        let tool = tool.with_script("sonic.py");
        assert_eq!(tool.primary_script("py"), "sonic.py");
    }
}
