/// Fixed three-step execution plans

use crate::catalog::ToolDescriptor;
use crate::error::{Result, RouterError};
use crate::inventory::ResourceFile;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const RESOURCE_COLLABORATOR: &str = "resource_inventory";
pub const SCRIPT_COLLABORATOR: &str = "script_runner";
pub const OUTPUT_COLLABORATOR: &str = "output_store";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutionStep {
    pub step: u32,
    pub description: String,
    pub collaborator: String,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<BTreeMap<String, Value>>,
}

impl ExecutionStep {
    fn new(step: u32, description: String, collaborator: &str, action: &str) -> Self {
        Self {
            step,
            description,
            collaborator: collaborator.to_string(),
            action: action.to_string(),
            params: None,
        }
    }

    fn param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params
            .get_or_insert_with(BTreeMap::new)
            .insert(key.to_string(), value.into());
        self
    }

    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.as_ref()?.get(key)?.as_str()
    }
}

#[derive(Debug, Clone)]
pub struct ExecutionPlanner {
    output_dir: PathBuf,
    script_extension: String,
}

impl ExecutionPlanner {
    pub fn new(output_dir: impl Into<PathBuf>, script_extension: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            script_extension: script_extension.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Load input, run the tool, persist the output. Without an input file no
    /// plan can be built.
    pub fn plan(
        &self,
        tool: &ToolDescriptor,
        resource: Option<&ResourceFile>,
    ) -> Result<Vec<ExecutionStep>> {
        let resource = resource.ok_or(RouterError::NoResourceAvailable)?;
        let script = tool.primary_script(&self.script_extension);
        let artifact = format!("{}_{}.png", tool.name, resource.stem);

        Ok(vec![
            ExecutionStep::new(
                1,
                format!("Load input file {}", resource.filename),
                RESOURCE_COLLABORATOR,
                "load_input",
            )
            .param("resource_file", resource.filename.as_str())
            .param("path", resource.path.to_string_lossy().into_owned()),
            ExecutionStep::new(
                2,
                format!("Execute {} ({}) with {}", tool.name, script, resource.filename),
                SCRIPT_COLLABORATOR,
                "execute_tool",
            )
            .param("tool", tool.name.as_str())
            .param("script", script)
            .param("resource_file", resource.filename.as_str()),
            ExecutionStep::new(
                3,
                format!("Save {} output to {}", tool.output_type, self.output_dir.display()),
                OUTPUT_COLLABORATOR,
                "save_output",
            )
            .param("output_dir", self.output_dir.to_string_lossy().into_owned())
            .param("artifact", artifact),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::builtin::builtin_tools;

    fn resource() -> ResourceFile {
        ResourceFile {
            stem: "sample_well_01".to_string(),
            filename: "sample_well_01.las".to_string(),
            path: PathBuf::from("mcp_resources/las_files/sample_well_01.las"),
            size: 64,
        }
    }

    #[test]
    fn test_plan_has_three_ordered_steps() {
        let planner = ExecutionPlanner::new("output", "py");
        let tool = &builtin_tools()[1];
        let steps = planner.plan(tool, Some(&resource())).unwrap();

        assert_eq!(steps.len(), 3);
        assert_eq!(steps.iter().map(|s| s.step).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(steps[0].action, "load_input");
        assert_eq!(steps[1].collaborator, SCRIPT_COLLABORATOR);
        assert_eq!(steps[1].param_str("script"), Some("gamma_ray_analyzer.py"));
        assert_eq!(steps[2].param_str("artifact"), Some("gamma_analyzer_sample_well_01.png"));
    }

    #[test]
    fn test_plan_without_resource_fails_distinctly() {
        let planner = ExecutionPlanner::new("output", "py");
        let err = planner.plan(&builtin_tools()[0], None).unwrap_err();
        assert!(matches!(err, RouterError::NoResourceAvailable));
    }

    #[test]
    fn test_plan_is_deterministic() {
        let planner = ExecutionPlanner::new("output", "py");
        let tool = &builtin_tools()[0];
        assert_eq!(
            planner.plan(tool, Some(&resource())).unwrap(),
            planner.plan(tool, Some(&resource())).unwrap()
        );
    }
}
