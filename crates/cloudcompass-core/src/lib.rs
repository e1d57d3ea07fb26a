pub mod rules;
pub mod synth;

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use synth::synthesize;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate node id: {0}")]
    DuplicateNode(String),

    #[error("edge {edge} references unknown node {endpoint}")]
    DanglingEdge { edge: String, endpoint: String },

    #[error("edge {0} connects a node to itself")]
    SelfLoop(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;

// --- Types (matching the canvas node/edge shapes) ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ServiceCategory {
    Compute,
    Storage,
    Database,
    Networking,
}

impl ServiceCategory {
    pub const ALL: [ServiceCategory; 4] = [
        ServiceCategory::Compute,
        ServiceCategory::Storage,
        ServiceCategory::Database,
        ServiceCategory::Networking,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(name))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ServiceCategory::Compute => "compute",
            ServiceCategory::Storage => "storage",
            ServiceCategory::Database => "database",
            ServiceCategory::Networking => "networking",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            ServiceCategory::Compute => "#06b6d4",
            ServiceCategory::Storage => "#10b981",
            ServiceCategory::Database => "#8b5cf6",
            ServiceCategory::Networking => "#d946ef",
        }
    }
}

/// The closed set of AWS services the synthesizer can place.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    ApiGateway,
    Lambda,
    Ec2,
    DynamoDb,
    Rds,
    S3,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 6] = [
        ServiceKind::ApiGateway,
        ServiceKind::Lambda,
        ServiceKind::Ec2,
        ServiceKind::DynamoDb,
        ServiceKind::Rds,
        ServiceKind::S3,
    ];

    /// Stable identifier, also used as the node id prefix.
    pub fn id(self) -> &'static str {
        match self {
            ServiceKind::ApiGateway => "apigateway",
            ServiceKind::Lambda => "lambda",
            ServiceKind::Ec2 => "ec2",
            ServiceKind::DynamoDb => "dynamodb",
            ServiceKind::Rds => "rds",
            ServiceKind::S3 => "s3",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ServiceKind::ApiGateway => "API Gateway",
            ServiceKind::Lambda => "Lambda",
            ServiceKind::Ec2 => "EC2",
            ServiceKind::DynamoDb => "DynamoDB",
            ServiceKind::Rds => "RDS",
            ServiceKind::S3 => "S3",
        }
    }

    /// Lucide icon name rendered by the canvas.
    pub fn icon(self) -> &'static str {
        match self {
            ServiceKind::ApiGateway => "Globe",
            ServiceKind::Lambda => "Zap",
            ServiceKind::Ec2 => "Server",
            ServiceKind::DynamoDb => "Table",
            ServiceKind::Rds => "HardDrive",
            ServiceKind::S3 => "Database",
        }
    }

    pub fn category(self) -> ServiceCategory {
        match self {
            ServiceKind::ApiGateway => ServiceCategory::Networking,
            ServiceKind::Lambda | ServiceKind::Ec2 => ServiceCategory::Compute,
            ServiceKind::DynamoDb | ServiceKind::Rds => ServiceCategory::Database,
            ServiceKind::S3 => ServiceCategory::Storage,
        }
    }

    pub fn color(self) -> &'static str {
        self.category().color()
    }

    /// Resolve a display label (as stored on canvas nodes) back to a kind.
    pub fn from_label(label: &str) -> Option<ServiceKind> {
        Self::ALL.into_iter().find(|k| k.label() == label)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AwsNodeData {
    pub label: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
    #[serde(
        default,
        deserialize_with = "known_category",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<ServiceCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ServiceKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// Canvas and model nodes may carry categories outside the known four
/// (`messaging`, `analytics`, ...). Those read as `None`.
fn known_category<'de, D>(deserializer: D) -> std::result::Result<Option<ServiceCategory>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(ServiceCategory::from_name))
}

impl AwsNodeData {
    /// Node data with the display metadata copied from `kind`.
    pub fn for_kind(kind: ServiceKind) -> Self {
        Self {
            label: kind.label().to_string(),
            icon: kind.icon().to_string(),
            color: kind.color().to_string(),
            category: Some(kind.category()),
            kind: Some(kind),
            instance_type: None,
            storage_size: None,
            region: None,
        }
    }
}

/// A placed service. Matches ReactFlow's Node structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AwsNode {
    pub id: String,
    #[serde(rename = "type", default = "default_node_type")]
    pub node_type: String,
    #[serde(default)]
    pub position: Position,
    pub data: AwsNodeData,
}

fn default_node_type() -> String {
    "awsNode".to_string()
}

impl AwsNode {
    pub fn new(id: String, kind: ServiceKind, position: Position) -> Self {
        Self {
            id,
            node_type: default_node_type(),
            position,
            data: AwsNodeData::for_kind(kind),
        }
    }

    /// The node's service kind, falling back to its label for nodes that
    /// were dropped onto the canvas without an explicit kind.
    pub fn service_kind(&self) -> Option<ServiceKind> {
        self.data
            .kind
            .or_else(|| ServiceKind::from_label(&self.data.label))
    }
}

pub const EDGE_STROKE: &str = "#8b5cf6";
pub const EDGE_STROKE_WIDTH: f64 = 2.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStyle {
    #[serde(default = "default_stroke")]
    pub stroke: String,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
}

fn default_stroke() -> String {
    EDGE_STROKE.to_string()
}

fn default_stroke_width() -> f64 {
    EDGE_STROKE_WIDTH
}

impl Default for EdgeStyle {
    fn default() -> Self {
        Self {
            stroke: default_stroke(),
            stroke_width: default_stroke_width(),
        }
    }
}

/// A directed connection. Matches ReactFlow's Edge structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AwsEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub animated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<EdgeStyle>,
}

impl AwsEdge {
    /// An animated edge with the default stroke, id derived from its endpoints.
    pub fn connect(source: &str, target: &str) -> Self {
        Self {
            id: make_edge_id(source, target),
            source: source.to_string(),
            target: target.to_string(),
            animated: true,
            style: Some(EdgeStyle::default()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ArchitectureGraph {
    #[serde(default)]
    pub nodes: Vec<AwsNode>,
    #[serde(default)]
    pub edges: Vec<AwsEdge>,
}

impl ArchitectureGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&AwsNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Display label for a node id, or the id itself when it is unknown.
    pub fn label_of<'a>(&'a self, id: &'a str) -> &'a str {
        self.node(id).map(|n| n.data.label.as_str()).unwrap_or(id)
    }

    /// Check that node ids are unique and every edge joins two distinct,
    /// existing nodes.
    pub fn validate(&self) -> Result<()> {
        let mut ids: HashSet<&str> = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if !ids.insert(node.id.as_str()) {
                return Err(CoreError::DuplicateNode(node.id.clone()));
            }
        }
        for edge in &self.edges {
            for endpoint in [&edge.source, &edge.target] {
                if !ids.contains(endpoint.as_str()) {
                    return Err(CoreError::DanglingEdge {
                        edge: edge.id.clone(),
                        endpoint: endpoint.clone(),
                    });
                }
            }
            if edge.source == edge.target {
                return Err(CoreError::SelfLoop(edge.id.clone()));
            }
        }
        Ok(())
    }
}

/// Generate a node ID from its kind and creation index within one graph.
pub fn make_node_id(kind: ServiceKind, index: usize) -> String {
    format!("{}-{}", kind.id(), index)
}

/// Generate an edge ID from source and target node IDs.
pub fn make_edge_id(source: &str, target: &str) -> String {
    format!("edge-{}-{}", source, target)
}

// --- AI Settings ---

/// Resolve the global config directory (~/.cloudcompass/).
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".cloudcompass")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AiSettings {
    pub provider: String,
    pub api_key: String,
    pub model: String,
}

/// Read settings from `path`. A missing or unreadable file yields defaults.
pub fn read_settings_from(path: &Path) -> AiSettings {
    if !path.exists() {
        return AiSettings::default();
    }
    fs::read_to_string(path)
        .ok()
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

pub fn read_settings() -> AiSettings {
    read_settings_from(&settings_path())
}

/// Write settings to `path` atomically (temp file + rename).
pub fn write_settings_to(path: &Path, settings: &AiSettings) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

pub fn write_settings(settings: &AiSettings) -> Result<()> {
    write_settings_to(&settings_path(), settings)
}

pub fn ai_configured(settings: &AiSettings) -> bool {
    !settings.provider.is_empty()
        && !settings.model.is_empty()
        && (settings.provider == "ollama" || !settings.api_key.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, kind: ServiceKind) -> AwsNode {
        AwsNode::new(id.to_string(), kind, Position::default())
    }

    #[test]
    fn kind_metadata_is_consistent() {
        for kind in ServiceKind::ALL {
            assert_eq!(ServiceKind::from_label(kind.label()), Some(kind));
            assert_eq!(kind.color(), kind.category().color());
        }
        assert_eq!(ServiceKind::from_label("CloudFront"), None);
    }

    #[test]
    fn node_serializes_in_canvas_shape() {
        let n = node("lambda-1", ServiceKind::Lambda);
        let v = serde_json::to_value(&n).unwrap();
        assert_eq!(v["type"], "awsNode");
        assert_eq!(v["data"]["label"], "Lambda");
        assert_eq!(v["data"]["icon"], "Zap");
        assert_eq!(v["data"]["category"], "compute");
        assert_eq!(v["data"]["kind"], "lambda");
        assert!(v["data"].get("instanceType").is_none());
    }

    #[test]
    fn canvas_node_without_kind_resolves_by_label() {
        let raw = r#"{"id":"x","position":{"x":1,"y":2},"data":{"label":"RDS","instanceType":"db.t3.micro"}}"#;
        let n: AwsNode = serde_json::from_str(raw).unwrap();
        assert_eq!(n.node_type, "awsNode");
        assert_eq!(n.service_kind(), Some(ServiceKind::Rds));
        assert_eq!(n.data.instance_type.as_deref(), Some("db.t3.micro"));
    }

    #[test]
    fn edge_serializes_style_camel_case() {
        let e = AwsEdge::connect("a", "b");
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v["id"], "edge-a-b");
        assert_eq!(v["animated"], true);
        assert_eq!(v["style"]["stroke"], "#8b5cf6");
        assert_eq!(v["style"]["strokeWidth"], 2.0);
    }

    #[test]
    fn partial_edge_style_takes_defaults() {
        let raw = r##"{"id":"e","source":"a","target":"b","style":{"stroke":"#3b82f6"}}"##;
        let e: AwsEdge = serde_json::from_str(raw).unwrap();
        let style = e.style.unwrap();
        assert_eq!(style.stroke, "#3b82f6");
        assert_eq!(style.stroke_width, EDGE_STROKE_WIDTH);

        let e: AwsEdge =
            serde_json::from_str(r#"{"id":"e","source":"a","target":"b","style":{}}"#).unwrap();
        assert_eq!(e.style, Some(EdgeStyle::default()));
    }

    #[test]
    fn unknown_category_reads_as_none() {
        let data: AwsNodeData =
            serde_json::from_str(r#"{"label":"Amazon SQS","category":"messaging"}"#).unwrap();
        assert_eq!(data.category, None);

        let data: AwsNodeData =
            serde_json::from_str(r#"{"label":"S3","category":"Storage"}"#).unwrap();
        assert_eq!(data.category, Some(ServiceCategory::Storage));

        let data: AwsNodeData = serde_json::from_str(r#"{"label":"S3","category":null}"#).unwrap();
        assert_eq!(data.category, None);
    }

    #[test]
    fn validate_rejects_broken_graphs() {
        let mut g = ArchitectureGraph {
            nodes: vec![node("a", ServiceKind::Ec2), node("b", ServiceKind::S3)],
            edges: vec![AwsEdge::connect("a", "b")],
        };
        assert!(g.validate().is_ok());

        g.edges.push(AwsEdge::connect("a", "missing"));
        assert!(matches!(
            g.validate(),
            Err(CoreError::DanglingEdge { endpoint, .. }) if endpoint == "missing"
        ));

        g.edges.pop();
        g.edges.push(AwsEdge::connect("b", "b"));
        assert!(matches!(g.validate(), Err(CoreError::SelfLoop(_))));

        g.edges.pop();
        g.nodes.push(node("a", ServiceKind::Rds));
        assert!(matches!(g.validate(), Err(CoreError::DuplicateNode(id)) if id == "a"));
    }

    #[test]
    fn settings_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        assert_eq!(read_settings_from(&path), AiSettings::default());

        let settings = AiSettings {
            provider: "anthropic".into(),
            api_key: "sk-test".into(),
            model: "claude-3-haiku".into(),
        };
        write_settings_to(&path, &settings).unwrap();
        assert_eq!(read_settings_from(&path), settings);
    }

    #[test]
    fn ai_configured_requires_key_except_ollama() {
        let mut s = AiSettings {
            provider: "openai".into(),
            api_key: String::new(),
            model: "gpt-4o".into(),
        };
        assert!(!ai_configured(&s));
        s.provider = "ollama".into();
        assert!(ai_configured(&s));
        s.model.clear();
        assert!(!ai_configured(&s));
    }
}
