pub mod analyzer;
pub mod envelope;
pub mod gate;
pub mod matcher;
pub mod planner;

pub use analyzer::Intent;
pub use envelope::{ClarificationResponse, FinalResult, ResponseEnvelope, Status, StepRecord};
pub use gate::{ClarificationGate, ClarifyReason, Decision};
pub use matcher::{match_query, MatchResult};
pub use planner::{ExecutionPlanner, ExecutionStep};

use crate::catalog::{
    load_catalog, CatalogSource, CommandCatalog, DiscoveredCatalog, StaticCatalog, ToolCatalog,
};
use crate::classifier::{Classifier, RemoteClassifier};
use crate::config::{CatalogKind, ModelConfig, RouterConfig};
use crate::error::{Result, RouterError};
use crate::executor::ScriptRunner;
use crate::inventory::{ResourceFile, ResourceInventory};
use crate::observability::{RequestOutcome, RouterMetrics};
use crate::security::validate_query;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    CheckClarification,
    ProcessQuery,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::CheckClarification => "check_clarification",
            Action::ProcessQuery => "process_query",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Catalog and inventory snapshot taken at the start of a request.
#[derive(Debug, Clone)]
pub struct RoutingSession {
    pub catalog: ToolCatalog,
    pub resources: Vec<ResourceFile>,
}

pub struct QueryRouter {
    config: RouterConfig,
    catalog_source: Box<dyn CatalogSource>,
    inventory: ResourceInventory,
    planner: ExecutionPlanner,
    classifier: Option<Box<dyn Classifier>>,
    runner: Option<ScriptRunner>,
    metrics: RouterMetrics,
}

impl QueryRouter {
    pub fn new(config: RouterConfig) -> Result<Self> {
        config.validate()?;

        let catalog_source = catalog_source_for(&config)?;
        let inventory = ResourceInventory::new(
            config.data_path(),
            config.data_extension.clone(),
            config.scripts_path(),
            config.script_extension.clone(),
            config.output_path.clone(),
        );
        let planner = ExecutionPlanner::new(config.output_path.clone(), config.script_extension.clone());
        let runner = config.execute.then(|| {
            ScriptRunner::new(
                config.interpreter.clone(),
                config.scripts_path(),
                config.data_path(),
                config.output_path.clone(),
                config.script_timeout(),
            )
        });

        Ok(Self {
            config,
            catalog_source,
            inventory,
            planner,
            classifier: None,
            runner,
            metrics: RouterMetrics::new()?,
        })
    }

    pub fn with_catalog_source(mut self, source: Box<dyn CatalogSource>) -> Self {
        self.catalog_source = source;
        self
    }

    pub fn with_classifier(mut self, classifier: Box<dyn Classifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Attaches a remote classifier when the model configuration names one.
    pub fn with_model_config(self, model: &ModelConfig) -> Self {
        match RemoteClassifier::from_config(model, self.config.discovery_timeout()) {
            Some(classifier) => self.with_classifier(Box::new(classifier)),
            None => self,
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn inventory(&self) -> &ResourceInventory {
        &self.inventory
    }

    pub fn metrics(&self) -> &RouterMetrics {
        &self.metrics
    }

    pub async fn open_session(&self) -> RoutingSession {
        RoutingSession {
            catalog: load_catalog(self.catalog_source.as_ref()).await,
            resources: self.inventory.list_data_files(),
        }
    }

    /// Classifier suggestion when one is configured and usable, keyword scoring otherwise.
    pub async fn select(&self, query: &str, catalog: &ToolCatalog) -> MatchResult {
        if let Some(classifier) = &self.classifier {
            match classifier.classify(query, catalog.list()).await {
                Ok(Some(result)) if result.tool.as_deref().is_some_and(|t| catalog.contains(t)) => {
                    tracing::info!(classifier = classifier.name(), tool = ?result.tool, "Using classifier match");
                    return result;
                }
                Ok(Some(result)) => {
                    tracing::warn!(
                        classifier = classifier.name(),
                        tool = ?result.tool,
                        "Classifier suggested a tool outside the catalog, falling back to keywords"
                    );
                }
                Ok(None) => {
                    tracing::debug!(classifier = classifier.name(), "Classifier had no suggestion");
                }
                Err(e) => {
                    self.metrics.record_collaborator_failure();
                    tracing::warn!(classifier = classifier.name(), error = %e, "Classifier failed, falling back to keywords");
                }
            }
        }
        match_query(query, catalog.list())
    }

    pub async fn check_clarification(&self, query: &str) -> ClarificationResponse {
        let start = Instant::now();
        let response = self.clarify(query).await;
        let outcome = if response.needs_clarification {
            RequestOutcome::Clarified
        } else {
            RequestOutcome::Proceeded
        };
        self.metrics
            .record_request(Action::CheckClarification.as_str(), outcome, start.elapsed());
        crate::log_request!(info,
            action = %Action::CheckClarification,
            needs_clarification = response.needs_clarification,
            confidence = response.confidence,
            "Clarification check finished"
        );
        response
    }

    async fn clarify(&self, query: &str) -> ClarificationResponse {
        if let Err(e) = validate_query(query, self.config.max_query_length) {
            return ClarificationResponse {
                needs_clarification: true,
                confidence: 0.0,
                suggestions: vec!["Please rephrase your analysis request".to_string()],
                message: format!("Cannot route query: {}", e),
                agent_plan: None,
            };
        }

        let session = self.open_session().await;
        let result = self.select(query, &session.catalog).await;
        self.metrics.record_confidence(result.confidence);

        let gate = ClarificationGate::new(self.config.clarification_threshold)
            .with_suggestion_limits(self.config.suggestion_tools, self.config.max_suggestions);
        let confidence = result.confidence;

        match gate.decide(result, &session.catalog, &session.resources) {
            Decision::Proceed(result) => {
                let plan = result
                    .tool
                    .as_deref()
                    .ok_or(RouterError::NoToolMatched)
                    .and_then(|name| session.catalog.get(name))
                    .and_then(|tool| self.planner.plan(tool, session.resources.first()));
                match plan {
                    Ok(steps) => ClarificationResponse {
                        needs_clarification: false,
                        confidence,
                        suggestions: Vec::new(),
                        message: format!(
                            "Understood: {} request using {}",
                            result.intent,
                            result.tool.as_deref().unwrap_or_default()
                        ),
                        agent_plan: Some(steps),
                    },
                    Err(e) => ClarificationResponse {
                        needs_clarification: true,
                        confidence,
                        suggestions: vec!["Please rephrase your analysis request".to_string()],
                        message: format!("Cannot plan query: {}", e),
                        agent_plan: None,
                    },
                }
            }
            Decision::Clarify { reason, suggestions } => ClarificationResponse {
                needs_clarification: true,
                confidence,
                suggestions,
                message: clarification_message(reason),
                agent_plan: None,
            },
        }
    }

    pub async fn process_query(&self, query: &str) -> ResponseEnvelope {
        let start = Instant::now();
        let outcome = self.run_pipeline(query).await;
        let elapsed = start.elapsed();
        let elapsed_ms = elapsed.as_millis() as u64;

        match outcome {
            Ok((steps, final_result)) => {
                self.metrics
                    .record_request(Action::ProcessQuery.as_str(), RequestOutcome::Completed, elapsed);
                crate::log_request!(info,
                    action = %Action::ProcessQuery,
                    tool = %final_result.tool,
                    confidence = final_result.confidence,
                    elapsed_ms,
                    "Query processed"
                );
                ResponseEnvelope::completed(query, steps, final_result, elapsed_ms)
            }
            Err(e) => {
                if matches!(e, RouterError::Collaborator { .. } | RouterError::Timeout(_)) {
                    self.metrics.record_collaborator_failure();
                }
                self.metrics
                    .record_request(Action::ProcessQuery.as_str(), RequestOutcome::Failed, elapsed);
                crate::log_request!(warn,
                    action = %Action::ProcessQuery,
                    error = %e,
                    elapsed_ms,
                    "Query failed"
                );
                ResponseEnvelope::failed(query, &e, elapsed_ms)
            }
        }
    }

    async fn run_pipeline(&self, query: &str) -> Result<(Vec<StepRecord>, FinalResult)> {
        validate_query(query, self.config.max_query_length)
            .map_err(|e| RouterError::InvalidInput(e.to_string()))?;

        let session = self.open_session().await;
        let result = self.select(query, &session.catalog).await;
        self.metrics.record_confidence(result.confidence);

        let tool_name = result.tool.as_deref().ok_or(RouterError::NoToolMatched)?;
        if result.confidence < self.config.process_threshold {
            return Err(RouterError::InsufficientConfidence {
                confidence: result.confidence,
                threshold: self.config.process_threshold,
            });
        }
        let tool = session.catalog.get(tool_name)?;
        let plan = self.planner.plan(tool, session.resources.first())?;

        let script = tool.primary_script(&self.config.script_extension);
        let resource_file = step_param(&plan, 0, "resource_file");
        let mut steps: Vec<StepRecord> = plan
            .iter()
            .map(|step| StepRecord::from_step(step, result.confidence))
            .collect();

        if let Some(runner) = &self.runner {
            if !tool.implemented {
                return Err(RouterError::collaborator(
                    planner::SCRIPT_COLLABORATOR,
                    format!("tool '{}' is declared but has no implementation", tool.name),
                ));
            }
            let artifact = step_param(&plan, 2, "artifact");
            let outcome = runner.run(&script, &resource_file, &artifact).await?;
            if let Some(step) = steps.get_mut(1) {
                step.result_summary = format!("Executed {} in {} ms", script, outcome.elapsed_ms);
            }
            if let Some(step) = steps.get_mut(2) {
                step.result_summary = format!("Saved {}", outcome.output.display());
            }
        }

        let final_result = FinalResult {
            script,
            resource_file,
            tool: tool.name.clone(),
            confidence: result.confidence,
            reasoning: result.reasoning.clone(),
        };
        Ok((steps, final_result))
    }
}

fn step_param(plan: &[ExecutionStep], index: usize, key: &str) -> String {
    plan.get(index)
        .and_then(|step| step.param_str(key))
        .unwrap_or_default()
        .to_string()
}

fn clarification_message(reason: ClarifyReason) -> String {
    match reason {
        ClarifyReason::NoToolMatched => {
            "No analysis tool matches the request; please describe the analysis you need".to_string()
        }
        ClarifyReason::InsufficientConfidence => {
            "More specific information about the analysis is needed".to_string()
        }
        ClarifyReason::NoResourceAvailable => {
            "No input LAS files are available; provide an input file to continue".to_string()
        }
    }
}

fn catalog_source_for(config: &RouterConfig) -> Result<Box<dyn CatalogSource>> {
    Ok(match config.catalog {
        CatalogKind::Static => Box::new(StaticCatalog::new()),
        CatalogKind::StaticExtended => Box::new(StaticCatalog::with_extensions()),
        CatalogKind::Discovered => Box::new(DiscoveredCatalog::new(
            config.scripts_path(),
            config.script_extension.clone(),
        )),
        CatalogKind::Command => {
            let command = config.catalog_command.as_ref().ok_or_else(|| {
                RouterError::InvalidConfig("command catalog without a command".to_string())
            })?;
            Box::new(CommandCatalog::new(
                command.program.clone(),
                command.args.clone(),
                config.discovery_timeout(),
            ))
        }
    })
}
