use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use cloudcompass_core::{ai_configured, ArchitectureGraph, AwsEdge, AwsNode};
use cloudcompass_suggest::CostEstimate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::{ApiError, ApiResult, AppState};

pub async fn health() -> &'static str {
    "OK"
}

/// Pull a non-empty string `prompt` out of a JSON body.
fn require_prompt(body: &Value) -> ApiResult<&str> {
    body.get("prompt")
        .and_then(Value::as_str)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Prompt is required".to_string()))
}

pub async fn generate(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<ArchitectureGraph>> {
    let Json(body) = body?;
    let prompt = require_prompt(&body)?;

    if !state.generate_delay.is_zero() {
        tokio::time::sleep(state.generate_delay).await;
    }

    let graph = cloudcompass_core::synthesize(prompt);
    info!(
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        "synthesized architecture"
    );
    Ok(Json(graph))
}

pub async fn generate_with_model(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<ArchitectureGraph>> {
    let Json(body) = body?;
    let prompt = require_prompt(&body)?;
    let graph = state.advisor().await.generate_architecture(prompt).await;
    Ok(Json(graph))
}

#[derive(Debug, Deserialize)]
pub struct CostRequest {
    #[serde(default)]
    pub nodes: Vec<AwsNode>,
}

pub async fn estimate_cost(
    State(state): State<AppState>,
    body: Result<Json<CostRequest>, JsonRejection>,
) -> ApiResult<Json<CostEstimate>> {
    let Json(req) = body?;
    debug!(nodes = req.nodes.len(), "estimating cost");
    let estimate = state.advisor().await.estimate_cost(&req.nodes).await;
    Ok(Json(estimate))
}

#[derive(Debug, Deserialize)]
pub struct ExplainRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub nodes: Vec<AwsNode>,
    #[serde(default)]
    pub edges: Vec<AwsEdge>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExplainResponse {
    pub explanation: String,
}

pub async fn explain(
    State(state): State<AppState>,
    body: Result<Json<ExplainRequest>, JsonRejection>,
) -> ApiResult<Json<ExplainResponse>> {
    let Json(req) = body?;
    let graph = ArchitectureGraph {
        nodes: req.nodes,
        edges: req.edges,
    };
    let explanation = state
        .advisor()
        .await
        .explain(req.prompt.as_deref(), &graph)
        .await;
    Ok(Json(ExplainResponse { explanation }))
}

#[derive(Debug, Deserialize)]
pub struct TerraformRequest {
    #[serde(default)]
    pub nodes: Vec<AwsNode>,
    #[serde(default)]
    pub edges: Vec<AwsEdge>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TerraformResponse {
    pub code: String,
}

pub async fn export_terraform(
    State(state): State<AppState>,
    body: Result<Json<TerraformRequest>, JsonRejection>,
) -> ApiResult<Json<TerraformResponse>> {
    let Json(req) = body?;
    let graph = ArchitectureGraph {
        nodes: req.nodes,
        edges: req.edges,
    };
    let code = state.advisor().await.export_terraform(&graph).await?;
    Ok(Json(TerraformResponse { code }))
}

pub async fn get_settings(State(state): State<AppState>) -> Json<Value> {
    let settings = state.settings.read().await;
    // Mask API key, only report whether one is set
    Json(json!({
        "provider": settings.provider,
        "model": settings.model,
        "hasKey": !settings.api_key.is_empty(),
        "configured": ai_configured(&settings),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSettingsRequest {
    pub provider: String,
    #[serde(default)]
    pub api_key: String,
    pub model: String,
}

pub async fn save_settings(
    State(state): State<AppState>,
    body: Result<Json<SaveSettingsRequest>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Json(req) = body?;
    let mut settings = state.settings.write().await;
    let mut updated = settings.clone();
    updated.provider = req.provider;
    updated.model = req.model;
    // Empty key means "keep existing"
    if !req.api_key.is_empty() {
        updated.api_key = req.api_key;
    }
    // The write guard stays held until the file is replaced, so saves hit disk in order.
    let path = state.settings_path.clone();
    let to_disk = updated.clone();
    tokio::task::spawn_blocking(move || cloudcompass_core::write_settings_to(&path, &to_disk))
        .await??;
    info!(provider = %updated.provider, model = %updated.model, "saved AI settings");
    *settings = updated;
    Ok(StatusCode::NO_CONTENT)
}
