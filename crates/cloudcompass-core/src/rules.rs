//! Keyword and placement tables driving [`crate::synth::synthesize`].
//!
//! Both tables are plain data so they can be inspected, tested and extended
//! without touching the construction loop.

use crate::{Position, ServiceKind};

/// A boolean signal extracted from a free-text prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Api,
    Serverless,
    Database,
    DynamoDb,
    Rds,
    S3,
    Ec2,
    Web,
}

impl Feature {
    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Substring triggers for each feature, matched against the lowercased prompt.
pub const FEATURE_KEYWORDS: &[(Feature, &[&str])] = &[
    (Feature::Api, &["api", "rest", "endpoint"]),
    (Feature::Serverless, &["serverless", "lambda", "function"]),
    (Feature::Database, &["database", "data", "store", "storage"]),
    (Feature::DynamoDb, &["dynamodb", "nosql"]),
    (Feature::Rds, &["rds", "postgres", "mysql", "sql"]),
    (Feature::S3, &["s3", "bucket", "static", "file", "asset"]),
    (Feature::Ec2, &["ec2", "server", "instance", "vm"]),
    (Feature::Web, &["web", "website", "frontend"]),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureSet(u8);

impl FeatureSet {
    pub fn has(self, feature: Feature) -> bool {
        self.0 & feature.bit() != 0
    }

    pub fn insert(&mut self, feature: Feature) {
        self.0 |= feature.bit();
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn with(mut self, feature: Feature) -> Self {
        self.insert(feature);
        self
    }
}

impl FromIterator<Feature> for FeatureSet {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        iter.into_iter().fold(FeatureSet::default(), FeatureSet::with)
    }
}

/// Lowercase the prompt and evaluate every feature predicate. Features are
/// independent and may overlap.
pub fn extract_features(prompt: &str) -> FeatureSet {
    let lower = prompt.to_lowercase();
    FEATURE_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(feature, _)| *feature)
        .collect()
}

/// Where a newly placed node draws its incoming edge from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    /// Entry point; no incoming edge.
    None,
    /// From the edge-layer node, only when no compute node has claimed it yet.
    /// The first compute node placed also becomes the compute anchor.
    FromEdgeLayer,
    /// From the compute anchor, if one exists.
    FromCompute,
}

#[derive(Debug, Clone, Copy)]
pub struct PlacementRule {
    pub kind: ServiceKind,
    pub applies: fn(FeatureSet) -> bool,
    pub link: Link,
}

/// Evaluated top to bottom; order encodes precedence (Lambda is placed before
/// EC2, so it claims the API Gateway edge and the compute anchor).
pub const PLACEMENT_RULES: [PlacementRule; 6] = [
    PlacementRule {
        kind: ServiceKind::ApiGateway,
        applies: |f| f.has(Feature::Api) || f.has(Feature::Web),
        link: Link::None,
    },
    PlacementRule {
        kind: ServiceKind::Lambda,
        applies: |f| f.has(Feature::Serverless),
        link: Link::FromEdgeLayer,
    },
    PlacementRule {
        kind: ServiceKind::Ec2,
        applies: |f| {
            f.has(Feature::Ec2)
                || (!f.has(Feature::Serverless) && (f.has(Feature::Web) || f.has(Feature::Api)))
        },
        link: Link::FromEdgeLayer,
    },
    PlacementRule {
        kind: ServiceKind::DynamoDb,
        applies: |f| {
            f.has(Feature::DynamoDb) || (f.has(Feature::Database) && f.has(Feature::Serverless))
        },
        link: Link::FromCompute,
    },
    PlacementRule {
        kind: ServiceKind::Rds,
        applies: |f| {
            f.has(Feature::Rds)
                || (f.has(Feature::Database)
                    && !f.has(Feature::DynamoDb)
                    && !f.has(Feature::Serverless))
        },
        link: Link::FromCompute,
    },
    PlacementRule {
        kind: ServiceKind::S3,
        applies: |f| f.has(Feature::S3) || f.has(Feature::Web),
        link: Link::FromCompute,
    },
];

/// Emitted as a chain when no placement rule fires.
pub const FALLBACK_CHAIN: [ServiceKind; 3] = [
    ServiceKind::ApiGateway,
    ServiceKind::Lambda,
    ServiceKind::DynamoDb,
];

/// Row-major grid used for initial canvas placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub start_x: f64,
    pub start_y: f64,
    pub spacing_x: f64,
    pub spacing_y: f64,
    pub per_row: usize,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            start_x: 100.0,
            start_y: 100.0,
            spacing_x: 300.0,
            spacing_y: 200.0,
            per_row: 3,
        }
    }
}

impl GridLayout {
    pub fn position(&self, index: usize) -> Position {
        let per_row = self.per_row.max(1);
        let row = index / per_row;
        let col = index % per_row;
        Position {
            x: self.start_x + col as f64 * self.spacing_x,
            y: self.start_y + row as f64 * self.spacing_y,
        }
    }
}
