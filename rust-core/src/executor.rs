/// Runs analysis scripts as child processes

use crate::error::{Result, RouterError};
use crate::security::sanitize_path;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScriptOutcome {
    pub script: String,
    pub input: PathBuf,
    pub output: PathBuf,
    pub stdout: String,
    pub stderr: Option<String>,
    pub elapsed_ms: u64,
}

/// `<interpreter> <script> <input> <output>`; exit status 0 means the artifact was written.
#[derive(Debug, Clone)]
pub struct ScriptRunner {
    interpreter: String,
    scripts_dir: PathBuf,
    data_dir: PathBuf,
    output_root: PathBuf,
    timeout: Duration,
}

impl ScriptRunner {
    pub fn new(
        interpreter: impl Into<String>,
        scripts_dir: impl Into<PathBuf>,
        data_dir: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Self {
        Self {
            interpreter: interpreter.into(),
            scripts_dir: scripts_dir.into(),
            data_dir: data_dir.into(),
            output_root: output_root.into(),
            timeout,
        }
    }

    /// Fresh `<output_root>/<YYYY-MM-DD_HH-MM-SS>` directory for one run.
    pub fn create_run_dir(&self) -> Result<PathBuf> {
        let stamp = Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
        let dir = self.output_root.join(stamp);
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    pub async fn run(&self, script: &str, input_file: &str, artifact: &str) -> Result<ScriptOutcome> {
        let script_path = sanitize_path(&self.scripts_dir, script).map_err(|e| {
            RouterError::collaborator("script_runner", format!("script {} unavailable: {}", script, e))
        })?;
        let input_path = sanitize_path(&self.data_dir, input_file).map_err(|e| {
            RouterError::collaborator("script_runner", format!("input {} unavailable: {}", input_file, e))
        })?;
        let output_path = self.create_run_dir()?.join(artifact);

        crate::log_collaborator!(info, "script_runner",
            script = %script_path.display(),
            input = %input_path.display(),
            "Executing script"
        );

        let start = Instant::now();
        let mut command = Command::new(&self.interpreter);
        command
            .arg(&script_path)
            .arg(&input_path)
            .arg(&output_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| {
                RouterError::Timeout(format!(
                    "script {} did not finish within {} seconds",
                    script,
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| {
                RouterError::collaborator("script_runner", format!("failed to start {}: {}", self.interpreter, e))
            })?;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            crate::log_collaborator!(warn, "script_runner", status = %output.status, "Script failed");
            return Err(RouterError::Collaborator {
                collaborator: "script_runner".to_string(),
                message: format!("{} exited with {}", script, output.status),
                output: Some(format!("{}{}", stdout, stderr)),
            });
        }

        Ok(ScriptOutcome {
            script: script.to_string(),
            input: input_path,
            output: output_path,
            stdout,
            stderr: (!stderr.is_empty()).then_some(stderr),
            elapsed_ms,
        })
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }
}
