//! Policy evaluation: turning a rule into an edge category and an effective
//! enabled flag.

use policygraph_core::entity::{Policy, PolicyRule};

use crate::topology::EdgeCategory;

/// Outcome of evaluating one rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub category: EdgeCategory,
    pub enabled: bool,
}

/// Classifies a rule of the given policy.
///
/// A bidirectional rule whose destination is a single non-peer resource is
/// still drawn as one-way: a plain resource cannot originate traffic back.
/// A rule is only effectively enabled when its policy is enabled too.
///
/// # Examples
///
/// ```
/// # use policygraph::policy::classify;
/// # use policygraph::topology::EdgeCategory;
/// # use policygraph_core::entity::{Policy, PolicyRule};
/// let mut rule = PolicyRule::new("r1");
/// rule.bidirectional = true;
/// let policy = Policy {
///     id: "p1".into(),
///     name: String::new(),
///     enabled: false,
///     rules: vec![rule.clone()],
/// };
///
/// let outcome = classify(&policy, &rule);
/// assert_eq!(outcome.category, EdgeCategory::Bidirectional);
/// assert!(!outcome.enabled);
/// ```
pub fn classify(policy: &Policy, rule: &PolicyRule) -> Classification {
    let category = if rule.bidirectional && !rule.targets_single_resource() {
        EdgeCategory::Bidirectional
    } else {
        EdgeCategory::DirectionalIn
    };

    Classification {
        category,
        enabled: rule.enabled && policy.enabled,
    }
}
