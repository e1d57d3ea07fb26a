//! Prompt to architecture graph synthesis.
//!
//! The synthesizer is total: any prompt, including an empty one, yields a
//! non-empty graph whose edges all resolve to nodes of the same graph.

use crate::rules::{extract_features, GridLayout, Link, FALLBACK_CHAIN, PLACEMENT_RULES};
use crate::{make_node_id, ArchitectureGraph, AwsEdge, AwsNode, ServiceKind};

/// Synthesize a graph from a free-text prompt using the default grid layout.
pub fn synthesize(prompt: &str) -> ArchitectureGraph {
    synthesize_with_layout(prompt, &GridLayout::default())
}

pub fn synthesize_with_layout(prompt: &str, layout: &GridLayout) -> ArchitectureGraph {
    let features = extract_features(prompt);
    let mut builder = GraphBuilder::new(layout);

    let mut edge_anchor: Option<String> = None;
    let mut compute_anchor: Option<String> = None;

    for rule in PLACEMENT_RULES.iter().filter(|r| (r.applies)(features)) {
        let id = builder.place(rule.kind);
        match rule.link {
            Link::None => {
                edge_anchor.get_or_insert(id);
            }
            Link::FromEdgeLayer => {
                // Only the first compute node is wired from the edge layer.
                if compute_anchor.is_none() {
                    if let Some(source) = &edge_anchor {
                        builder.connect(source, &id);
                    }
                    compute_anchor = Some(id);
                }
            }
            Link::FromCompute => {
                if let Some(source) = &compute_anchor {
                    builder.connect(source, &id);
                }
            }
        }
    }

    if builder.is_empty() {
        return fallback_chain(layout);
    }
    builder.finish()
}

/// The canned API Gateway -> Lambda -> DynamoDB chain.
pub fn fallback_chain(layout: &GridLayout) -> ArchitectureGraph {
    let mut builder = GraphBuilder::new(layout);
    let mut previous: Option<String> = None;
    for kind in FALLBACK_CHAIN {
        let id = builder.place(kind);
        if let Some(source) = &previous {
            builder.connect(source, &id);
        }
        previous = Some(id);
    }
    builder.finish()
}

/// Accumulates nodes in creation order; ids and grid slots come from the
/// per-call creation index.
struct GraphBuilder<'a> {
    layout: &'a GridLayout,
    graph: ArchitectureGraph,
}

impl<'a> GraphBuilder<'a> {
    fn new(layout: &'a GridLayout) -> Self {
        Self {
            layout,
            graph: ArchitectureGraph::default(),
        }
    }

    fn is_empty(&self) -> bool {
        self.graph.nodes.is_empty()
    }

    fn place(&mut self, kind: ServiceKind) -> String {
        let index = self.graph.nodes.len();
        let id = make_node_id(kind, index);
        let position = self.layout.position(index);
        self.graph
            .nodes
            .push(AwsNode::new(id.clone(), kind, position));
        id
    }

    fn connect(&mut self, source: &str, target: &str) {
        self.graph.edges.push(AwsEdge::connect(source, target));
    }

    fn finish(self) -> ArchitectureGraph {
        self.graph
    }
}
