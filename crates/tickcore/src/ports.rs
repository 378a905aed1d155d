use crate::{BlackboardHandle, NodeType, PortError, PortValue, Value};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Binding value meaning "use the port's own name as the blackboard key".
pub const IDENTITY_REMAP: &str = "=";

/// Fixed mapping from a node's locally-declared port names to their
/// bindings: a quoted literal, the identity marker, or a blackboard key.
/// Built once when the node is wired, never mutated afterwards.
pub type PortRemapping = HashMap<String, String>;

/// Port names a variant declares, as reported by its manifest.
pub type PortsList = BTreeSet<String>;

/// Introspection record for a registered node variant, consumed by the
/// external factory/parser layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeManifest {
    pub node_type: NodeType,
    pub registration_id: String,
    pub ports: PortsList,
}

impl NodeManifest {
    pub fn new(node_type: NodeType, registration_id: impl Into<String>, ports: PortsList) -> Self {
        Self {
            node_type,
            registration_id: registration_id.into(),
            ports,
        }
    }
}

/// Immutable configuration bundle passed to a node at construction.
///
/// The blackboard handle is shared across every node of the same tree; the
/// remapping table and registration id are owned by the node alone.
#[derive(Clone)]
pub struct NodeConfig {
    pub blackboard: Option<BlackboardHandle>,
    pub registration_id: String,
    pub ports: PortRemapping,
}

impl NodeConfig {
    pub fn new(registration_id: impl Into<String>) -> Self {
        Self {
            blackboard: None,
            registration_id: registration_id.into(),
            ports: PortRemapping::new(),
        }
    }

    pub fn with_blackboard(mut self, blackboard: BlackboardHandle) -> Self {
        self.blackboard = Some(blackboard);
        self
    }

    /// Binds `port` to `binding`: a quoted literal, [`IDENTITY_REMAP`], or
    /// an explicit blackboard key.
    pub fn with_port(mut self, port: impl Into<String>, binding: impl Into<String>) -> Self {
        self.ports.insert(port.into(), binding.into());
        self
    }
}

/// A binding is a literal when it is wrapped in single or double quotes.
pub fn is_literal(binding: &str) -> bool {
    let bytes = binding.as_bytes();
    bytes.len() >= 2
        && ((bytes[0] == b'\'' && bytes[bytes.len() - 1] == b'\'')
            || (bytes[0] == b'"' && bytes[bytes.len() - 1] == b'"'))
}

fn strip_literal(binding: &str) -> &str {
    &binding[1..binding.len() - 1]
}

/// Read/write view over a node's port bindings, handed to the variant's
/// tick step and backing [`TreeNode::get_param`](crate::TreeNode::get_param)
/// and [`TreeNode::set_output`](crate::TreeNode::set_output).
pub struct Ports<'a> {
    config: &'a NodeConfig,
}

impl<'a> Ports<'a> {
    pub(crate) fn new(config: &'a NodeConfig) -> Self {
        Self { config }
    }

    fn resolve<'k>(&'k self, key: &'k str) -> Result<&'k str, PortError> {
        match self.config.ports.get(key) {
            Some(binding) if binding == IDENTITY_REMAP => Ok(key),
            Some(binding) => Ok(binding),
            None => {
                tracing::warn!(port = key, "port was never wired in the node configuration");
                Err(PortError::Unbound(key.to_string()))
            }
        }
    }

    /// Resolves `key` through the binding table and returns it as `T`.
    ///
    /// Literal bindings are parsed directly and never touch the blackboard.
    /// A stored textual entry is lazily coerced into `T` when `T` is not
    /// itself textual, so a string written into the store can be read back
    /// as any parseable type.
    pub fn get_param<T: PortValue>(&self, key: &str) -> Result<T, PortError> {
        let resolved = self.resolve(key)?;

        if is_literal(resolved) {
            return T::parse_text(strip_literal(resolved));
        }

        let Some(blackboard) = self.config.blackboard.as_ref() else {
            tracing::warn!(
                port = key,
                "get_param resolves to a blackboard entry, but no blackboard is attached"
            );
            return Err(PortError::NoBlackboard);
        };

        let Some(stored) = blackboard.get(resolved) else {
            return Err(PortError::KeyNotFound(resolved.to_string()));
        };

        match T::from_value(&stored) {
            Some(value) => Ok(value),
            None => {
                if let Value::String(text) = &stored {
                    T::parse_text(text).map_err(|err| {
                        tracing::warn!(port = key, key = resolved, %err, "late coercion failed");
                        err
                    })
                } else {
                    let err = PortError::TypeMismatch {
                        key: resolved.to_string(),
                        expected: T::TYPE_NAME,
                        actual: stored.type_name(),
                    };
                    tracing::warn!(port = key, %err, "get_param type mismatch");
                    Err(err)
                }
            }
        }
    }

    /// Writes `value` to the blackboard at the resolved key, creating the
    /// entry if absent. Fails without touching the store when the port is
    /// unbound or bound to a literal.
    pub fn set_output<T: PortValue>(&self, key: &str, value: T) -> Result<(), PortError> {
        let resolved = self.resolve(key)?;

        if is_literal(resolved) {
            tracing::warn!(port = key, "set_output refused: the port is bound to a literal");
            return Err(PortError::LiteralBinding(key.to_string()));
        }

        let Some(blackboard) = self.config.blackboard.as_ref() else {
            tracing::warn!(
                port = key,
                "set_output resolves to a blackboard entry, but no blackboard is attached"
            );
            return Err(PortError::NoBlackboard);
        };

        blackboard.set(resolved, value.into_value());
        Ok(())
    }
}
