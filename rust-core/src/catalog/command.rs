/// Catalog served by a sibling discovery process

use super::{CatalogSource, ToolDescriptor};
use crate::error::{Result, RouterError};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Spawns `program args..` and reads a JSON array of tool descriptors from its stdout.
#[derive(Debug, Clone)]
pub struct CommandCatalog {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandCatalog {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }
}

#[async_trait]
impl CatalogSource for CommandCatalog {
    fn name(&self) -> &str {
        "command"
    }

    async fn load(&self) -> Result<Vec<ToolDescriptor>> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| {
                RouterError::Timeout(format!(
                    "catalog discovery '{}' did not answer within {:?}",
                    self.program, self.timeout
                ))
            })??;

        if !output.status.success() {
            return Err(RouterError::Collaborator {
                collaborator: format!("catalog discovery '{}'", self.program),
                message: format!("exited with {}", output.status),
                output: Some(String::from_utf8_lossy(&output.stderr).into_owned()),
            });
        }

        let tools: Vec<ToolDescriptor> = serde_json::from_slice(&output.stdout)?;
        Ok(tools.into_iter().map(ToolDescriptor::normalized).collect())
    }
}
