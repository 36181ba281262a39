//! Graph edges.

use serde::Serialize;

use policygraph_core::identifier::Id;

use crate::path::PathStyle;

/// Visual category of an edge.
///
/// Rule edges are classified by the policy evaluator; structural edges get
/// a fixed category from the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeCategory {
    /// Traffic permitted in both directions, drawn as two opposing arcs.
    Bidirectional,
    /// Traffic permitted into the target only.
    DirectionalIn,
    /// Structural curve, e.g. group to resource membership.
    Floating,
    /// Structural straight line, e.g. network to resource.
    FloatingStraight,
    /// Plain straight connector.
    Simple,
}

impl EdgeCategory {
    /// The path style this category is drawn with.
    pub fn path_style(self) -> PathStyle {
        match self {
            Self::Bidirectional | Self::Floating => PathStyle::Bezier,
            Self::DirectionalIn => PathStyle::SmoothStep,
            Self::FloatingStraight | Self::Simple => PathStyle::Straight,
        }
    }
}

/// Why an edge exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeOrigin {
    /// Produced by one rule of one policy.
    Rule {
        policy: Id,
        rule: Id,
        /// The rule is enabled and so is its policy.
        enabled: bool,
        /// Protocol and ports, e.g. `tcp/443`.
        traffic: String,
    },
    /// A group containing a peer or resource.
    Membership,
    /// A network owning a resource.
    Network,
    /// A policy node pointing at the source of one of its rules.
    Policy { policy: Id },
}

/// A directed edge of the topology graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    id: String,
    category: EdgeCategory,
    origin: EdgeOrigin,
}

impl Edge {
    pub(crate) fn new(id: String, category: EdgeCategory, origin: EdgeOrigin) -> Self {
        Self {
            id,
            category,
            origin,
        }
    }

    /// Stable id, unique within one topology.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn category(&self) -> EdgeCategory {
        self.category
    }

    pub fn origin(&self) -> &EdgeOrigin {
        &self.origin
    }

    pub fn is_rule(&self) -> bool {
        matches!(self.origin, EdgeOrigin::Rule { .. })
    }

    pub fn is_membership(&self) -> bool {
        matches!(self.origin, EdgeOrigin::Membership)
    }

    /// The effective enabled flag of the producing rule, or `None` for
    /// structural edges.
    pub fn rule_enabled(&self) -> Option<bool> {
        match self.origin {
            EdgeOrigin::Rule { enabled, .. } => Some(enabled),
            _ => None,
        }
    }

    /// Label drawn at the middle of the edge.
    pub fn label(&self) -> Option<&str> {
        match &self.origin {
            EdgeOrigin::Rule { traffic, .. } => Some(traffic),
            _ => None,
        }
    }
}
