//! Execution-node core of the tick engine
//!
//! This crate defines the single-node execution contract every concrete
//! node variant and every external driver (factory, parser, scheduler)
//! builds on: the status state machine, the thread-safe status commit with
//! its blocking wait, the status-change subscription channel, and the port
//! binding protocol that resolves declared parameters to literal values or
//! shared blackboard entries.

mod blackboard;
mod error;
mod node;
mod ports;
mod signal;
mod status;
mod value;

pub use blackboard::{Blackboard, BlackboardHandle, InMemoryBlackboard};
pub use error::PortError;
pub use node::{Behavior, TreeNode};
pub use ports::{
    is_literal, NodeConfig, NodeManifest, PortRemapping, Ports, PortsList, IDENTITY_REMAP,
};
pub use signal::{attach_tracing_logger, StatusChangeCallback, StatusChangeSubscription};
pub use status::{NodeStatus, NodeType};
pub use value::{PortValue, Value};

/// Result type for port operations.
pub type Result<T> = std::result::Result<T, PortError>;

use std::sync::{Mutex, MutexGuard, PoisonError};

// A poisoned lock only means some thread panicked mid-update; the guarded
// state (a status scalar, a slot list, a value map) is still coherent.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
