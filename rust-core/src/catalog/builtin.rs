/// Compiled-in tool table

use super::{CatalogSource, OutputCategory, ToolDescriptor};
use crate::error::Result;
use async_trait::async_trait;

/// The five tools backed by scripts shipped with the resources directory.
pub fn builtin_tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::new(
            "depth_plotter",
            "Creates depth plots and visualizations from LAS file depth data",
            OutputCategory::Visualization,
            ["depth", "plot", "visualization", "curve", "log"],
        )
        .with_script("depth_visualization.py"),
        ToolDescriptor::new(
            "gamma_analyzer",
            "Analyzes gamma ray data for geological formations",
            OutputCategory::Analysis,
            ["gamma", "ray", "formation", "geology", "analysis"],
        )
        .with_script("gamma_ray_analyzer.py"),
        ToolDescriptor::new(
            "porosity_calculator",
            "Calculates porosity from neutron and density logs",
            OutputCategory::Calculation,
            ["porosity", "neutron", "density", "reservoir", "calculation"],
        )
        .with_script("porosity_calculator.py"),
        ToolDescriptor::new(
            "resistivity_analyzer",
            "Analyzes resistivity logs for formation evaluation",
            OutputCategory::Analysis,
            ["resistivity", "conductivity", "invasion", "evaluation"],
        )
        .with_script("resistivity_analyzer.py"),
        ToolDescriptor::new(
            "lithology_classifier",
            "Classifies rock types based on well log responses",
            OutputCategory::Analysis,
            ["lithology", "rock", "sandstone", "shale", "limestone", "classification"],
        )
        .with_script("lithology_classifier.py"),
    ]
}

/// Declared for completeness; no script implements them yet.
pub fn extension_tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::new(
            "permeability_estimator",
            "Estimates permeability from porosity and other log data",
            OutputCategory::Estimation,
            ["permeability", "flow", "reservoir", "estimation", "analysis"],
        )
        .with_script("permeability_analysis.py")
        .unimplemented(),
        ToolDescriptor::new(
            "saturation_analyzer",
            "Analyzes water and hydrocarbon saturation",
            OutputCategory::Analysis,
            ["saturation", "water", "hydrocarbon", "oil", "gas"],
        )
        .with_script("saturation_analysis.py")
        .unimplemented(),
    ]
}

pub fn extended_tools() -> Vec<ToolDescriptor> {
    let mut tools = builtin_tools();
    tools.extend(extension_tools());
    tools
}

#[derive(Debug, Clone)]
pub struct StaticCatalog {
    tools: Vec<ToolDescriptor>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self {
            tools: builtin_tools(),
        }
    }

    pub fn with_extensions() -> Self {
        Self {
            tools: extended_tools(),
        }
    }

    pub fn from_tools(tools: Vec<ToolDescriptor>) -> Self {
        Self { tools }
    }
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    fn name(&self) -> &str {
        "static"
    }

    async fn load(&self) -> Result<Vec<ToolDescriptor>> {
        Ok(self.tools.clone())
    }
}
