//! Deterministic answers used when no model is configured or the model fails.

use std::fmt::Write as _;

use chrono::{DateTime, SecondsFormat, Utc};
use cloudcompass_core::{ArchitectureGraph, AwsNode, ServiceKind};

use crate::{CostEstimate, CostItem};

/// Monthly price assumed for services outside the table.
pub const DEFAULT_MONTHLY_PRICE: f64 = 10.00;

/// Rough monthly USD price per service at small production scale.
pub fn monthly_price(kind: Option<ServiceKind>) -> f64 {
    match kind {
        Some(ServiceKind::Ec2) => 35.04, // t3.micro
        Some(ServiceKind::Lambda) => 5.00,
        Some(ServiceKind::S3) => 2.30,
        Some(ServiceKind::DynamoDb) => 12.50,
        Some(ServiceKind::Rds) => 45.00,
        Some(ServiceKind::ApiGateway) => 3.50,
        None => DEFAULT_MONTHLY_PRICE,
    }
}

pub fn cost(nodes: &[AwsNode]) -> CostEstimate {
    let breakdown: Vec<CostItem> = nodes
        .iter()
        .map(|n| CostItem {
            service: n.data.label.clone(),
            cost: monthly_price(n.service_kind()),
        })
        .collect();
    let total_cost = breakdown.iter().map(|i| i.cost).sum();
    CostEstimate {
        total_cost,
        breakdown,
    }
}

pub const NO_ARCHITECTURE: &str = "## No Architecture to Explain\n\n\
Add some AWS services to the canvas to generate an architecture explanation.";

pub fn explanation(nodes: &[AwsNode]) -> String {
    let primary = nodes
        .first()
        .map(|n| n.data.label.as_str())
        .unwrap_or("Primary Service");
    format!(
        "## Architecture Overview\n\n\
**The Strategy:** This architecture leverages {count} AWS services to build a scalable cloud solution.\n\n\
**Key Decisions:**\n\
- **{primary}** selected as the foundation for reliable performance\n\
- **Multi-service approach** ensures separation of concerns and scalability\n\
- **AWS-native services** provide seamless integration and managed infrastructure\n\n\
**Data Flow:** Requests flow through the connected services, with each component handling its \
specialized function before passing data downstream.",
        count = nodes.len(),
    )
}

// --- Terraform ---

/// Terraform resource name for a node: `-` becomes `_`, at most 30 chars.
pub fn resource_name(node_id: &str) -> String {
    node_id.replace('-', "_").chars().take(30).collect()
}

/// DNS-style identifier for buckets and DB instances.
fn dns_name(resource: &str) -> String {
    resource.to_lowercase().replace('_', "-")
}

const TAGS: &str = "    Environment = \"production\"\n    ManagedBy   = \"terraform\"\n";

pub fn terraform(graph: &ArchitectureGraph, generated_at: DateTime<Utc>) -> String {
    let mut out = String::with_capacity(4096);
    let _ = write!(
        out,
        "# CloudCompass AI - Generated Terraform Configuration\n\
# Generated on {}\n\n",
        generated_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    );
    out.push_str(
        r#"terraform {
  required_providers {
    aws = {
      source  = "hashicorp/aws"
      version = "~> 5.0"
    }
  }
}

variable "region" {
  description = "AWS region"
  default     = "us-east-1"
}

provider "aws" {
  region = var.region
}

"#,
    );

    for node in &graph.nodes {
        let Some(kind) = node.service_kind() else {
            continue;
        };
        let name = resource_name(&node.id);
        let label = &node.data.label;
        match kind {
            ServiceKind::Ec2 => write_ec2(&mut out, &name, label),
            ServiceKind::Lambda => write_lambda(&mut out, &name, label),
            ServiceKind::S3 => write_s3(&mut out, &name, label),
            ServiceKind::DynamoDb => write_dynamodb(&mut out, &name, label),
            ServiceKind::Rds => write_rds(&mut out, &name, label),
            ServiceKind::ApiGateway => write_api_gateway(&mut out, &name, label),
        }
    }

    if !graph.edges.is_empty() {
        out.push_str(
            "\n# Resource Connections\n# The following connections were defined in the architecture:\n",
        );
        for (i, edge) in graph.edges.iter().enumerate() {
            let _ = writeln!(
                out,
                "# {}. {} -> {}",
                i + 1,
                graph.label_of(&edge.source),
                graph.label_of(&edge.target)
            );
        }
    }

    out
}

fn write_ec2(out: &mut String, name: &str, label: &str) {
    let _ = write!(
        out,
        r#"
# EC2 Instance
resource "aws_instance" "{name}" {{
  ami           = "ami-0c55b159cbfafe1f0"
  instance_type = "t3.micro"

  tags = {{
    Name        = "{label}-instance"
{TAGS}  }}
}}
"#
    );
}

fn write_lambda(out: &mut String, name: &str, label: &str) {
    let _ = write!(
        out,
        r#"
# Lambda Function
resource "aws_lambda_function" "{name}" {{
  filename      = "lambda_function.zip"
  function_name = "{name}"
  role          = aws_iam_role.{name}_role.arn
  handler       = "index.handler"
  runtime       = "nodejs18.x"
  timeout       = 30
  memory_size   = 256

  tags = {{
    Name        = "{label}-function"
{TAGS}  }}
}}

resource "aws_iam_role" "{name}_role" {{
  name = "{name}_role"

  assume_role_policy = jsonencode({{
    Version = "2012-10-17"
    Statement = [{{
      Action = "sts:AssumeRole"
      Effect = "Allow"
      Principal = {{
        Service = "lambda.amazonaws.com"
      }}
    }}]
  }})
}}

resource "aws_iam_role_policy_attachment" "{name}_basic" {{
  role       = aws_iam_role.{name}_role.name
  policy_arn = "arn:aws:iam::aws:policy/service-role/AWSLambdaBasicExecutionRole"
}}
"#
    );
}

fn write_s3(out: &mut String, name: &str, label: &str) {
    let bucket = dns_name(name);
    let _ = write!(
        out,
        r#"
# S3 Bucket
resource "aws_s3_bucket" "{name}" {{
  bucket = "{bucket}-bucket"

  tags = {{
    Name        = "{label}-bucket"
{TAGS}  }}
}}

resource "aws_s3_bucket_versioning" "{name}_versioning" {{
  bucket = aws_s3_bucket.{name}.id
  versioning_configuration {{
    status = "Enabled"
  }}
}}
"#
    );
}

fn write_dynamodb(out: &mut String, name: &str, label: &str) {
    let _ = write!(
        out,
        r#"
# DynamoDB Table
resource "aws_dynamodb_table" "{name}" {{
  name           = "{name}_table"
  billing_mode   = "PAY_PER_REQUEST"
  hash_key       = "id"

  attribute {{
    name = "id"
    type = "S"
  }}

  tags = {{
    Name        = "{label}-table"
{TAGS}  }}
}}
"#
    );
}

fn write_rds(out: &mut String, name: &str, label: &str) {
    let identifier = dns_name(name);
    let _ = write!(
        out,
        r#"
# RDS Database Instance
resource "aws_db_instance" "{name}" {{
  identifier           = "{identifier}-db"
  engine               = "postgres"
  engine_version       = "15.3"
  instance_class       = "db.t3.micro"
  allocated_storage    = 20
  storage_encrypted    = true
  username             = "admin"
  password             = "CHANGE_ME_IMMEDIATELY"
  skip_final_snapshot  = true
  publicly_accessible  = false

  tags = {{
    Name        = "{label}-database"
{TAGS}  }}
}}
"#
    );
}

fn write_api_gateway(out: &mut String, name: &str, label: &str) {
    let _ = write!(
        out,
        r#"
# API Gateway REST API
resource "aws_api_gateway_rest_api" "{name}" {{
  name        = "{name}_api"
  description = "API Gateway managed by Terraform"

  endpoint_configuration {{
    types = ["REGIONAL"]
  }}

  tags = {{
    Name        = "{label}-api"
{TAGS}  }}
}}
"#
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use cloudcompass_core::{synthesize, AwsNodeData, Position};

    fn canvas_node(id: &str, label: &str) -> AwsNode {
        AwsNode {
            id: id.to_string(),
            node_type: "awsNode".to_string(),
            position: Position::default(),
            data: AwsNodeData {
                label: label.to_string(),
                icon: String::new(),
                color: String::new(),
                category: None,
                kind: None,
                instance_type: None,
                storage_size: None,
                region: None,
            },
        }
    }

    #[test]
    fn cost_uses_price_table_with_default() {
        let nodes = vec![
            canvas_node("a", "EC2"),
            canvas_node("b", "RDS"),
            canvas_node("c", "CloudFront"),
        ];
        let estimate = cost(&nodes);
        let prices: Vec<f64> = estimate.breakdown.iter().map(|i| i.cost).collect();
        assert_eq!(prices, vec![35.04, 45.00, DEFAULT_MONTHLY_PRICE]);
        assert!((estimate.total_cost - 90.04).abs() < 1e-9);
        assert_eq!(estimate.breakdown[2].service, "CloudFront");
    }

    #[test]
    fn explanation_names_first_service() {
        let text = explanation(&synthesize("").nodes);
        assert!(text.contains("leverages 3 AWS services"));
        assert!(text.contains("- **API Gateway** selected as the foundation"));
    }

    #[test]
    fn resource_names_are_terraform_safe() {
        assert_eq!(resource_name("apigateway-0"), "apigateway_0");
        let long = "dndnode-1700000000000-some-very-long-suffix";
        assert_eq!(resource_name(long).len(), 30);
        assert!(!resource_name(long).contains('-'));
        assert_eq!(dns_name("S3_Bucket_1"), "s3-bucket-1");
    }

    #[test]
    fn terraform_renders_one_block_per_known_node() {
        let mut graph = synthesize("web frontend on ec2 with mysql");
        graph.nodes.push(canvas_node("sqs-9", "Amazon SQS"));
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let hcl = terraform(&graph, at);

        assert!(hcl.starts_with("# CloudCompass AI - Generated Terraform Configuration\n"));
        assert!(hcl.contains("# Generated on 2024-05-01T12:00:00.000Z"));
        assert!(hcl.contains("source  = \"hashicorp/aws\""));
        assert!(hcl.contains("resource \"aws_api_gateway_rest_api\" \"apigateway_0\""));
        assert!(hcl.contains("resource \"aws_instance\" \"ec2_1\""));
        assert!(hcl.contains("identifier           = \"rds-2-db\""));
        assert!(hcl.contains("bucket = \"s3-3-bucket\""));
        assert!(hcl.contains("    Name        = \"EC2-instance\"\n    Environment = \"production\""));
        assert!(!hcl.contains("sqs_9"));
        assert!(hcl.contains("# 1. API Gateway -> EC2\n"));
        assert!(hcl.contains("# 3. EC2 -> S3\n"));
    }

    #[test]
    fn terraform_lambda_wires_its_role() {
        let hcl = terraform(&synthesize("lambda"), Utc::now());
        assert!(hcl.contains("role          = aws_iam_role.lambda_0_role.arn"));
        assert!(hcl.contains("resource \"aws_iam_role_policy_attachment\" \"lambda_0_basic\""));
        assert!(!hcl.contains("# Resource Connections"));
    }
}
