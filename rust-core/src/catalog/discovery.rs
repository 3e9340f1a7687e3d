/// Catalog inferred from the scripts directory

use super::{CatalogSource, OutputCategory, ToolDescriptor};
use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

const VISUALIZATION_WORDS: &[&str] = &["plot", "chart", "visualize"];
const CALCULATION_WORDS: &[&str] = &["calculate", "compute"];

/// Filename fragment -> keywords injected for that domain.
const DOMAIN_KEYWORDS: &[(&str, &[&str])] = &[
    ("depth", &["depth", "log", "curve"]),
    ("gamma", &["gamma", "ray", "formation"]),
    ("porosity", &["porosity", "neutron", "density"]),
];

pub struct DiscoveredCatalog {
    scripts_dir: PathBuf,
    extension: String,
}

impl DiscoveredCatalog {
    pub fn new(scripts_dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            scripts_dir: scripts_dir.into(),
            extension: extension.into(),
        }
    }

    pub fn scripts_dir(&self) -> &Path {
        &self.scripts_dir
    }
}

#[async_trait]
impl CatalogSource for DiscoveredCatalog {
    fn name(&self) -> &str {
        "discovered"
    }

    async fn load(&self) -> Result<Vec<ToolDescriptor>> {
        if !self.scripts_dir.is_dir() {
            tracing::debug!(dir = %self.scripts_dir.display(), "Scripts directory missing");
            return Ok(Vec::new());
        }

        let mut tools = Vec::new();
        for entry in std::fs::read_dir(&self.scripts_dir)? {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable directory entry");
                    continue;
                }
            };
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(self.extension.as_str()) {
                continue;
            }
            let content = match std::fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!(script = %path.display(), error = %e, "Skipping unreadable script");
                    continue;
                }
            };
            if let Some(tool) = describe_script(&path, &content) {
                tools.push(tool);
            }
        }

        Ok(tools)
    }
}

/// Infers a descriptor from a script's filename and source text.
pub fn describe_script(path: &Path, content: &str) -> Option<ToolDescriptor> {
    let stem = path.file_stem()?.to_str()?.to_string();
    let filename = path.file_name()?.to_str()?.to_string();
    let lower_stem = stem.to_lowercase();
    let lower_content = content.to_lowercase();

    let mut keywords: Vec<&str> = Vec::new();
    let mut output_type = OutputCategory::Analysis;

    if VISUALIZATION_WORDS.iter().any(|w| lower_content.contains(w)) {
        output_type = OutputCategory::Visualization;
        keywords.extend(VISUALIZATION_WORDS);
    } else if CALCULATION_WORDS.iter().any(|w| lower_content.contains(w)) {
        output_type = OutputCategory::Calculation;
        keywords.extend(CALCULATION_WORDS);
    }

    for (fragment, injected) in DOMAIN_KEYWORDS {
        if lower_stem.contains(fragment) {
            keywords.extend(injected.iter());
        }
    }

    let mut tool = ToolDescriptor::new(
        stem.clone(),
        leading_docstring(content).unwrap_or_else(|| format!("Python script: {}", stem)),
        output_type,
        keywords,
    )
    .with_script(filename);

    if tool.keywords.is_empty() {
        tool.extend_keywords(lower_stem.split('_'));
    }

    Some(tool)
}

/// First line of the leading triple-quoted block, if any.
fn leading_docstring(content: &str) -> Option<String> {
    let mut inside = false;
    for line in content.lines() {
        let trimmed = line.trim();
        let delimiter = ["\"\"\"", "'''"].into_iter().find(|d| trimmed.contains(d));
        match (inside, delimiter) {
            (false, Some(d)) => {
                let rest = trimmed.splitn(2, d).nth(1).unwrap_or("").trim_end_matches(d).trim();
                if !rest.is_empty() {
                    return Some(rest.to_string());
                }
                inside = true;
            }
            (true, Some(_)) => return None,
            (true, None) if !trimmed.is_empty() => return Some(trimmed.to_string()),
            _ => {}
        }
    }
    None
}
