use cloudcompass_core::{ArchitectureGraph, AwsNode};

/// One service per line: label plus any instance/storage/region details.
fn service_line(node: &AwsNode) -> String {
    let d = &node.data;
    let mut parts = vec![d.label.clone()];
    if let Some(t) = &d.instance_type {
        parts.push(format!("instance: {t}"));
    }
    if let Some(s) = &d.storage_size {
        parts.push(format!("storage: {s}"));
    }
    if let Some(r) = &d.region {
        parts.push(format!("region: {r}"));
    }
    parts.join(", ")
}

pub fn service_list(nodes: &[AwsNode]) -> String {
    nodes
        .iter()
        .map(service_line)
        .collect::<Vec<_>>()
        .join("\n- ")
}

/// `A → B` for every edge whose endpoints both resolve.
pub fn connection_list(graph: &ArchitectureGraph) -> String {
    let lines: Vec<String> = graph
        .edges
        .iter()
        .filter_map(|e| {
            let source = graph.node(&e.source)?;
            let target = graph.node(&e.target)?;
            Some(format!("{} → {}", source.data.label, target.data.label))
        })
        .collect();
    if lines.is_empty() {
        "No connections defined".to_string()
    } else {
        lines.join("\n- ")
    }
}

// --- Cost ---

pub const COST_SYSTEM: &str = "You are an AWS Billing Agent. Estimate the monthly cost for these \
specific services (e.g., t3.micro vs c5.large). Assume standard production traffic. Return ONLY a \
single JSON object: { totalCost: number, breakdown: [{ service, cost }] }.";

pub fn cost_user_message(nodes: &[AwsNode]) -> String {
    format!("Estimate monthly AWS costs for:\n- {}", service_list(nodes))
}

// --- Explanation ---

pub const EXPLAIN_SYSTEM: &str = "You are a Senior Cloud Architect. Briefly explain this \
architecture to a client. Use Markdown formatting.\n\
Structure:\n\
**The Strategy:** 1 sentence summary.\n\
**Key Decisions:** 3 bullet points explaining why specific services were chosen \
(e.g., \"Chosen DynamoDB for millisecond latency\").\n\
**Data Flow:** How data moves through the system.\n\
Keep it under 150 words. Be professional and concise.";

pub fn explain_user_message(context: Option<&str>, graph: &ArchitectureGraph) -> String {
    let context = context
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or("AWS cloud architecture");
    format!(
        "Architecture context: {context}\n\nServices:\n- {}\n\nConnections:\n- {}",
        service_list(&graph.nodes),
        connection_list(graph)
    )
}

// --- Terraform ---

pub const TERRAFORM_SYSTEM: &str =
    "You are an infrastructure engineer who writes production-ready Terraform for AWS.";

pub fn terraform_user_message(graph: &ArchitectureGraph) -> String {
    let mut out = String::with_capacity(1024);
    out.push_str("Generate a valid main.tf Terraform configuration for these AWS resources:\n\n");
    out.push_str("Resources:\n");
    for node in &graph.nodes {
        out.push_str("- ");
        out.push_str(&node.data.label);
        if let Some(category) = node.data.category {
            out.push_str(" (");
            out.push_str(category.as_str());
            out.push(')');
        }
        out.push('\n');
    }

    if !graph.edges.is_empty() {
        out.push_str("\nConnections:\n");
        for edge in &graph.edges {
            out.push_str("- ");
            out.push_str(graph.label_of(&edge.source));
            out.push_str(" connects to ");
            out.push_str(graph.label_of(&edge.target));
            out.push('\n');
        }
    }

    out.push_str(
        "\nRequirements:\n\
- Use AWS provider with region variable\n\
- Include proper resource configurations with sensible defaults\n\
- Add appropriate tags to all resources\n\
- Include any necessary IAM roles and policies\n\
- Add comments explaining each resource\n\
- Make the configuration production-ready\n\n\
Return ONLY the raw Terraform code, no explanations or markdown formatting.",
    );
    out
}

// --- Generation ---

pub const GENERATE_SYSTEM: &str = "You are an expert AWS Solutions Architect. Generate a React \
Flow JSON structure for the user's goal.\n\n\
Requirements:\n\
1. Use accurate AWS service names. Prefer these labels when they fit: \
\"API Gateway\", \"Lambda\", \"EC2\", \"DynamoDB\", \"RDS\", \"S3\".\n\
2. Layout: Input/Client on Left -> Processing in Middle -> Database/Storage on Right.\n\
3. Edges: Connect them logically. Add \"animated\": true to all edges.\n\
4. Every edge source and target must be the id of a node you emitted.\n\
5. Return STRICT JSON only. No markdown.\n\n\
Output Format:\n\
{\n\
  \"nodes\": [\n\
    { \"id\": \"1\", \"type\": \"awsNode\", \"position\": { \"x\": 0, \"y\": 0 }, \
\"data\": { \"label\": \"Service Name\" } }\n\
  ],\n\
  \"edges\": [\n\
    { \"id\": \"e1-2\", \"source\": \"1\", \"target\": \"2\", \"animated\": true }\n\
  ]\n\
}";

pub fn generate_user_message(prompt: &str) -> String {
    format!("User Goal: \"{}\"", prompt.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudcompass_core::{synthesize, AwsEdge, Position, ServiceKind};

    #[test]
    fn service_lines_include_details() {
        let mut node = AwsNode::new("ec2-0".into(), ServiceKind::Ec2, Position::default());
        node.data.instance_type = Some("c5.large".into());
        node.data.region = Some("eu-west-1".into());
        let bare = AwsNode::new("s3-1".into(), ServiceKind::S3, Position::default());
        assert_eq!(
            service_list(&[node, bare]),
            "EC2, instance: c5.large, region: eu-west-1\n- S3"
        );
    }

    #[test]
    fn connections_skip_unresolved_edges() {
        let mut graph = synthesize("");
        assert_eq!(
            connection_list(&graph),
            "API Gateway → Lambda\n- Lambda → DynamoDB"
        );
        graph.edges = vec![AwsEdge::connect("lambda-1", "gone")];
        assert_eq!(connection_list(&graph), "No connections defined");
    }

    #[test]
    fn explain_message_defaults_context() {
        let graph = synthesize("");
        let msg = explain_user_message(Some("  "), &graph);
        assert!(msg.starts_with("Architecture context: AWS cloud architecture\n"));
        assert!(msg.contains("Services:\n- API Gateway\n- Lambda\n- DynamoDB"));
    }

    #[test]
    fn terraform_message_lists_resources_and_connections() {
        let msg = terraform_user_message(&synthesize(""));
        assert!(msg.contains("- API Gateway (networking)\n"));
        assert!(msg.contains("- Lambda connects to DynamoDB\n"));
        assert!(msg.ends_with("no explanations or markdown formatting."));
    }
}
