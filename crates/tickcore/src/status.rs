use serde::{Deserialize, Serialize};
use std::fmt;

/// Execution state of a node, as produced by its most recent tick.
///
/// `Idle` is the rest state: a node that has never been ticked, or was
/// halted, reports `Idle`. The other three states are "valid" states in the
/// sense of [`wait_valid_status`](crate::TreeNode::wait_valid_status).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeStatus {
    Idle,
    Running,
    Success,
    Failure,
}

impl NodeStatus {
    /// A valid status is any post-execution state, i.e. not `Idle`.
    pub fn is_valid(self) -> bool {
        self != NodeStatus::Idle
    }

    /// Whether the node finished its work, successfully or not.
    pub fn is_completed(self) -> bool {
        matches!(self, NodeStatus::Success | NodeStatus::Failure)
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeStatus::Idle => "IDLE",
            NodeStatus::Running => "RUNNING",
            NodeStatus::Success => "SUCCESS",
            NodeStatus::Failure => "FAILURE",
        };
        f.write_str(name)
    }
}

/// Category of a node variant, carried by its manifest so that external
/// tooling (factory, parsers, editors) can classify registered types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Undefined,
    Action,
    Condition,
    Control,
    Decorator,
    Subtree,
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeType::Undefined => "Undefined",
            NodeType::Action => "Action",
            NodeType::Condition => "Condition",
            NodeType::Control => "Control",
            NodeType::Decorator => "Decorator",
            NodeType::Subtree => "Subtree",
        };
        f.write_str(name)
    }
}
