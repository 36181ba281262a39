//! Policies, rules, and rule side resolution.
//!
//! A [`PolicyRule`] names its source and its destination independently. Each
//! side is *either* a list of group ids *or* a single [`ResourceRef`]; a
//! side carrying both, or neither, is malformed. [`PolicyRule::side`]
//! performs that check and hands back a resolved [`RuleSide`].

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::network::{ResourceRef, default_enabled};
use crate::identifier::Id;

/// Transport protocol a rule applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    All,
    Tcp,
    Udp,
    Icmp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::All => "all",
            Self::Tcp => "tcp",
            Self::Udp => "udp",
            Self::Icmp => "icmp",
        };
        f.write_str(name)
    }
}

/// Which end of a rule a side describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleEnd {
    Source,
    Destination,
}

impl fmt::Display for RuleEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::Destination => f.write_str("destination"),
        }
    }
}

/// A rule side that cannot be resolved to exactly one shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MalformedRule {
    #[error("{end} side has neither a group list nor a resource reference")]
    Missing { end: RuleEnd },

    #[error("{end} side has both a group list and a resource reference")]
    Ambiguous { end: RuleEnd },
}

impl MalformedRule {
    /// Returns the rule end the defect was found on.
    pub fn end(&self) -> RuleEnd {
        match self {
            Self::Missing { end } | Self::Ambiguous { end } => *end,
        }
    }
}

/// A resolved rule side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSide<'a> {
    /// One node per listed group.
    Groups(&'a [Id]),
    /// A single resource or peer.
    Resource(&'a ResourceRef),
}

/// One access-control rule inside a [`Policy`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyRule {
    pub id: Id,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub bidirectional: bool,
    #[serde(default)]
    pub protocol: Protocol,
    #[serde(default)]
    pub ports: Vec<String>,
    #[serde(default)]
    pub sources: Option<Vec<Id>>,
    #[serde(default)]
    pub destinations: Option<Vec<Id>>,
    #[serde(default, alias = "sourceResource")]
    pub source_resource: Option<ResourceRef>,
    #[serde(default, alias = "destinationResource")]
    pub destination_resource: Option<ResourceRef>,
}

impl PolicyRule {
    /// Creates an enabled, unidirectional rule with no sides set.
    pub fn new(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            enabled: true,
            bidirectional: false,
            protocol: Protocol::All,
            ports: Vec::new(),
            sources: None,
            destinations: None,
            source_resource: None,
            destination_resource: None,
        }
    }

    /// Returns the group list for a side, treating an empty list as absent.
    pub fn groups(&self, end: RuleEnd) -> Option<&[Id]> {
        let list = match end {
            RuleEnd::Source => self.sources.as_deref(),
            RuleEnd::Destination => self.destinations.as_deref(),
        };
        list.filter(|groups| !groups.is_empty())
    }

    /// Returns the single reference for a side, if any.
    pub fn reference(&self, end: RuleEnd) -> Option<&ResourceRef> {
        match end {
            RuleEnd::Source => self.source_resource.as_ref(),
            RuleEnd::Destination => self.destination_resource.as_ref(),
        }
    }

    /// Resolves one side of the rule.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedRule::Missing`] if the side has neither a
    /// non-empty group list nor a reference, and [`MalformedRule::Ambiguous`]
    /// if it has both.
    ///
    /// # Examples
    ///
    /// ```
    /// use policygraph_core::entity::{PolicyRule, RuleEnd, RuleSide};
    /// use policygraph_core::identifier::Id;
    ///
    /// let mut rule = PolicyRule::new("r1");
    /// rule.sources = Some(vec![Id::new("devs")]);
    ///
    /// assert!(matches!(rule.side(RuleEnd::Source), Ok(RuleSide::Groups(_))));
    /// assert!(rule.side(RuleEnd::Destination).is_err());
    /// ```
    pub fn side(&self, end: RuleEnd) -> Result<RuleSide<'_>, MalformedRule> {
        match (self.groups(end), self.reference(end)) {
            (Some(groups), None) => Ok(RuleSide::Groups(groups)),
            (None, Some(reference)) => Ok(RuleSide::Resource(reference)),
            (Some(_), Some(_)) => Err(MalformedRule::Ambiguous { end }),
            (None, None) => Err(MalformedRule::Missing { end }),
        }
    }

    /// Returns true if the destination is a single reference to something
    /// other than a peer.
    pub fn targets_single_resource(&self) -> bool {
        self.destination_resource
            .is_some_and(|reference| !reference.is_peer())
    }

    /// Short human-readable description of the traffic the rule admits,
    /// e.g. `tcp/80,443` or `all`.
    pub fn traffic_label(&self) -> String {
        if self.ports.is_empty() || self.protocol == Protocol::All {
            self.protocol.to_string()
        } else {
            format!("{}/{}", self.protocol, self.ports.join(","))
        }
    }
}

/// A container of rules with its own enabled switch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub id: Id,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub rules: Vec<PolicyRule>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::ResourceKind;

    fn ids(names: &[&str]) -> Vec<Id> {
        names.iter().map(|name| Id::new(name)).collect()
    }

    #[test]
    fn test_group_side() {
        let mut rule = PolicyRule::new("r");
        rule.destinations = Some(ids(&["g1", "g2"]));

        match rule.side(RuleEnd::Destination) {
            Ok(RuleSide::Groups(groups)) => assert_eq!(groups.len(), 2),
            other => panic!("unexpected side: {other:?}"),
        }
    }

    #[test]
    fn test_resource_side() {
        let mut rule = PolicyRule::new("r");
        rule.source_resource = Some(ResourceRef::new("p1", ResourceKind::Peer));

        match rule.side(RuleEnd::Source) {
            Ok(RuleSide::Resource(reference)) => assert!(reference.is_peer()),
            other => panic!("unexpected side: {other:?}"),
        }
    }

    #[test]
    fn test_empty_list_counts_as_missing() {
        let mut rule = PolicyRule::new("r");
        rule.sources = Some(Vec::new());

        assert_eq!(
            rule.side(RuleEnd::Source),
            Err(MalformedRule::Missing {
                end: RuleEnd::Source
            })
        );
    }

    #[test]
    fn test_empty_list_with_reference_is_not_ambiguous() {
        let mut rule = PolicyRule::new("r");
        rule.destinations = Some(Vec::new());
        rule.destination_resource = Some(ResourceRef::new("r1", ResourceKind::Host));

        assert!(matches!(
            rule.side(RuleEnd::Destination),
            Ok(RuleSide::Resource(_))
        ));
    }

    #[test]
    fn test_both_present_is_ambiguous() {
        let mut rule = PolicyRule::new("r");
        rule.destinations = Some(ids(&["g1"]));
        rule.destination_resource = Some(ResourceRef::new("r1", ResourceKind::Host));

        let err = rule.side(RuleEnd::Destination).unwrap_err();
        assert_eq!(err.end(), RuleEnd::Destination);
        assert_eq!(
            err.to_string(),
            "destination side has both a group list and a resource reference"
        );
    }

    #[test]
    fn test_targets_single_resource() {
        let mut rule = PolicyRule::new("r");
        assert!(!rule.targets_single_resource());

        rule.destination_resource = Some(ResourceRef::new("p1", ResourceKind::Peer));
        assert!(!rule.targets_single_resource());

        rule.destination_resource = Some(ResourceRef::new("r1", ResourceKind::Subnet));
        assert!(rule.targets_single_resource());
    }

    #[test]
    fn test_traffic_label() {
        let mut rule = PolicyRule::new("r");
        assert_eq!(rule.traffic_label(), "all");

        rule.protocol = Protocol::Tcp;
        rule.ports = vec!["80".to_string(), "443".to_string()];
        assert_eq!(rule.traffic_label(), "tcp/80,443");
    }

    #[test]
    fn test_camel_case_aliases() {
        let json = r#"{
            "id": "rule-1",
            "bidirectional": true,
            "sources": ["g1"],
            "destinationResource": {"id": "r1", "type": "domain"}
        }"#;
        let rule: PolicyRule = serde_json::from_str(json).unwrap();

        assert!(rule.enabled);
        assert!(rule.bidirectional);
        assert_eq!(
            rule.destination_resource,
            Some(ResourceRef::new("r1", ResourceKind::Domain))
        );
    }
}
