pub mod engine;
pub mod fallback;
mod parse;
mod prompt;

use std::sync::Arc;

use cloudcompass_core::{ai_configured, synthesize, AiSettings, ArchitectureGraph, AwsNode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use engine::{Generator, LlmEngine};

#[derive(Debug, Error)]
pub enum SuggestError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    #[error("build LLM: {0}")]
    Build(String),

    #[error("chat: {0}")]
    Chat(String),

    #[error("LLM returned no text")]
    EmptyResponse,

    #[error("could not parse model output: {0}")]
    Unparseable(String),

    #[error("No nodes provided")]
    NoNodes,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CostItem {
    pub service: String,
    pub cost: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CostEstimate {
    pub total_cost: f64,
    pub breakdown: Vec<CostItem>,
}

/// Model-backed advice with a deterministic fallback for every question.
///
/// Without a generator (AI not configured) every call answers from the
/// fallback tables without touching the network.
#[derive(Clone, Default)]
pub struct Advisor {
    generator: Option<Arc<dyn Generator>>,
}

impl Advisor {
    pub fn from_settings(settings: &AiSettings) -> Self {
        if ai_configured(settings) {
            Self::with_generator(Arc::new(LlmEngine::new(settings.clone())))
        } else {
            Self::offline()
        }
    }

    pub fn offline() -> Self {
        Self { generator: None }
    }

    pub fn with_generator(generator: Arc<dyn Generator>) -> Self {
        Self {
            generator: Some(generator),
        }
    }

    pub fn is_online(&self) -> bool {
        self.generator.is_some()
    }

    /// Ask the model, logging and swallowing failures.
    async fn ask(&self, task: &str, system: &str, user_msg: &str) -> Option<String> {
        let generator = self.generator.as_ref()?;
        tracing::debug!(task, "sending prompt to model");
        match generator.generate(system, user_msg).await {
            Ok(raw) => {
                tracing::trace!(task, raw = %raw, "raw model output");
                Some(raw)
            }
            Err(e) => {
                tracing::warn!(task, error = %e, "model call failed, using fallback");
                None
            }
        }
    }

    pub async fn estimate_cost(&self, nodes: &[AwsNode]) -> CostEstimate {
        if nodes.is_empty() {
            return CostEstimate::default();
        }
        let raw = self
            .ask("cost", prompt::COST_SYSTEM, &prompt::cost_user_message(nodes))
            .await;
        match raw.map(|r| parse::parse_cost(&r)) {
            Some(Ok(estimate)) => estimate,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "unusable cost estimate, using price table");
                fallback::cost(nodes)
            }
            None => fallback::cost(nodes),
        }
    }

    /// Markdown explanation of the architecture.
    pub async fn explain(&self, context: Option<&str>, graph: &ArchitectureGraph) -> String {
        if graph.is_empty() {
            return fallback::NO_ARCHITECTURE.to_string();
        }
        let user_msg = prompt::explain_user_message(context, graph);
        self.ask("explain", prompt::EXPLAIN_SYSTEM, &user_msg)
            .await
            .unwrap_or_else(|| fallback::explanation(&graph.nodes))
    }

    /// HCL for the architecture. Fails only when there is nothing to export.
    pub async fn export_terraform(&self, graph: &ArchitectureGraph) -> Result<String, SuggestError> {
        if graph.is_empty() {
            return Err(SuggestError::NoNodes);
        }
        let user_msg = prompt::terraform_user_message(graph);
        let code = match self
            .ask("terraform", prompt::TERRAFORM_SYSTEM, &user_msg)
            .await
        {
            Some(raw) => parse::strip_code_fences(&raw),
            None => fallback::terraform(graph, chrono::Utc::now()),
        };
        Ok(code)
    }

    /// Model-generated architecture, or the keyword synthesizer's answer when
    /// the model is unavailable or returns an unusable graph.
    pub async fn generate_architecture(&self, user_prompt: &str) -> ArchitectureGraph {
        let raw = self
            .ask(
                "generate",
                prompt::GENERATE_SYSTEM,
                &prompt::generate_user_message(user_prompt),
            )
            .await;
        if let Some(raw) = raw {
            match parse::parse_graph(&raw) {
                Ok(graph) => {
                    tracing::info!(
                        nodes = graph.nodes.len(),
                        edges = graph.edges.len(),
                        "model generated architecture"
                    );
                    return graph;
                }
                Err(e) => tracing::warn!(error = %e, "discarding generated graph"),
            }
        }
        synthesize(user_prompt)
    }
}
