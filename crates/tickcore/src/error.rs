use thiserror::Error;

/// Failures of the port get/set protocol.
///
/// None of these are fatal: every variant is reported to the immediate
/// caller, which decides whether to fall back to a default, fail the tick,
/// or abort the tree. The core never panics on a port failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PortError {
    /// The port name has no entry in the remapping table, i.e. it was never
    /// wired when the node was built. A construction-time mistake surfaced
    /// at read time.
    #[error("port '{0}' has no entry in the port remapping table")]
    Unbound(String),

    /// Writing through a port bound to a literal value. Literals are
    /// immutable and never reach the blackboard.
    #[error("port '{0}' is bound to a literal value and cannot be written")]
    LiteralBinding(String),

    /// The binding resolves to a blackboard key, but the node was configured
    /// without a blackboard.
    #[error("port resolves to a blackboard key, but no blackboard is attached to this node")]
    NoBlackboard,

    /// The blackboard has no entry under the resolved key.
    #[error("blackboard has no entry under key '{0}'")]
    KeyNotFound(String),

    /// The stored value's dynamic type cannot be extracted as the requested
    /// type.
    #[error("type mismatch for blackboard key '{key}': requested {expected}, stored {actual}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// A literal binding or a stored textual value could not be parsed into
    /// the requested type.
    #[error("cannot parse '{text}' as {target}")]
    Parse { text: String, target: &'static str },
}
