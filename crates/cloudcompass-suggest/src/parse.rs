use std::sync::LazyLock;

use cloudcompass_core::{ArchitectureGraph, AwsNodeData, EdgeStyle};
use regex::Regex;

use crate::{CostEstimate, SuggestError};

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?:hcl|terraform)?\n?").expect("valid fence pattern"));

/// Extract the outermost JSON object substring from raw LLM output.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&raw[start..=end])
}

pub fn parse_cost(raw: &str) -> Result<CostEstimate, SuggestError> {
    let json = extract_json_object(raw)
        .ok_or_else(|| SuggestError::Unparseable("no JSON object in cost output".into()))?;
    serde_json::from_str(json).map_err(|e| SuggestError::Unparseable(e.to_string()))
}

/// Parse a model-generated graph, filling display metadata for recognised
/// services and rejecting graphs that are empty or structurally broken.
pub fn parse_graph(raw: &str) -> Result<ArchitectureGraph, SuggestError> {
    let json = extract_json_object(raw)
        .ok_or_else(|| SuggestError::Unparseable("no JSON object in graph output".into()))?;
    let mut graph: ArchitectureGraph =
        serde_json::from_str(json).map_err(|e| SuggestError::Unparseable(e.to_string()))?;

    if graph.is_empty() {
        return Err(SuggestError::Unparseable("graph has no nodes".into()));
    }
    graph
        .validate()
        .map_err(|e| SuggestError::Unparseable(e.to_string()))?;

    for node in &mut graph.nodes {
        if let Some(kind) = node.service_kind() {
            let defaults = AwsNodeData::for_kind(kind);
            let d = &mut node.data;
            d.kind = Some(kind);
            if d.icon.is_empty() {
                d.icon = defaults.icon;
            }
            if d.color.is_empty() {
                d.color = defaults.color;
            }
            d.category.get_or_insert(kind.category());
        }
    }
    for edge in &mut graph.edges {
        edge.animated = true;
        edge.style.get_or_insert_with(EdgeStyle::default);
    }
    Ok(graph)
}

/// Strip Markdown code fences the model may wrap Terraform in.
pub fn strip_code_fences(raw: &str) -> String {
    CODE_FENCE.replace_all(raw, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudcompass_core::ServiceKind;

    #[test]
    fn extracts_object_from_chatter() {
        let raw = "Sure! Here it is:\n{\"a\": {\"b\": 1}}\nHope that helps.";
        assert_eq!(extract_json_object(raw), Some("{\"a\": {\"b\": 1}}"));
        assert_eq!(extract_json_object("no json"), None);
        assert_eq!(extract_json_object("} backwards {"), None);
    }

    #[test]
    fn parses_cost_output() {
        let raw = r#"Estimate: { "totalCost": 40.5, "breakdown": [{"service": "EC2", "cost": 35.5}, {"service": "S3", "cost": 5}] }"#;
        let cost = parse_cost(raw).unwrap();
        assert_eq!(cost.total_cost, 40.5);
        assert_eq!(cost.breakdown.len(), 2);
        assert_eq!(cost.breakdown[1].service, "S3");
        assert!(parse_cost("{ \"total\": 3 }").is_err());
    }

    #[test]
    fn parses_and_normalizes_generated_graph() {
        let raw = r#"```json
{
  "nodes": [
    { "id": "1", "type": "default", "position": { "x": 0, "y": 0 }, "data": { "label": "Lambda" } },
    { "id": "2", "position": { "x": 300, "y": 0 }, "data": { "label": "Amazon SQS" } }
  ],
  "edges": [ { "id": "e1-2", "source": "1", "target": "2" } ]
}
```"#;
        let graph = parse_graph(raw).unwrap();
        let lambda = &graph.nodes[0].data;
        assert_eq!(lambda.kind, Some(ServiceKind::Lambda));
        assert_eq!(lambda.icon, "Zap");
        let sqs = &graph.nodes[1];
        assert_eq!(sqs.node_type, "awsNode");
        assert_eq!(sqs.data.kind, None);
        assert!(graph.edges[0].animated);
        assert_eq!(graph.edges[0].style, Some(EdgeStyle::default()));
    }

    #[test]
    fn keeps_graph_with_partial_style_and_unknown_category() {
        let raw = r##"{
  "nodes": [
    { "id": "1", "data": { "label": "Lambda", "category": "compute" } },
    { "id": "2", "data": { "label": "Amazon SQS", "category": "messaging" } }
  ],
  "edges": [ { "id": "e1-2", "source": "1", "target": "2", "animated": true, "style": { "stroke": "#3b82f6" } } ]
}"##;
        let graph = parse_graph(raw).unwrap();
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.nodes[1].data.category, None);
        let style = graph.edges[0].style.as_ref().unwrap();
        assert_eq!(style.stroke, "#3b82f6");
        assert_eq!(style.stroke_width, cloudcompass_core::EDGE_STROKE_WIDTH);
    }

    #[test]
    fn rejects_empty_or_dangling_graphs() {
        assert!(parse_graph(r#"{"nodes": [], "edges": []}"#).is_err());
        let dangling = r#"{"nodes": [{"id": "1", "data": {"label": "S3"}}],
            "edges": [{"id": "e", "source": "1", "target": "9"}]}"#;
        assert!(matches!(
            parse_graph(dangling),
            Err(SuggestError::Unparseable(msg)) if msg.contains("unknown node 9")
        ));
    }

    #[test]
    fn strips_terraform_fences() {
        let raw = "```hcl\nprovider \"aws\" {}\n```\n";
        assert_eq!(strip_code_fences(raw), "provider \"aws\" {}");
        assert_eq!(strip_code_fences("  resource {}  "), "resource {}");
    }
}
