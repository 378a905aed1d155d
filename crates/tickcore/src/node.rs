use crate::signal::StatusChangeSignal;
use crate::{
    lock, NodeConfig, NodeStatus, NodeType, PortError, Ports, PortsList, PortValue,
    StatusChangeSubscription,
};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

// Process-wide identity source. Ids start at 1 and are never reused, so a
// uid correlates log lines unambiguously even when node names collide.
static NEXT_UID: AtomicU64 = AtomicU64::new(1);

/// The per-variant capability set: the step function producing a status and
/// the cooperative abort. Concrete variants (sequence, fallback, decorator,
/// leaf action) implement this and are selected at tree-construction time.
pub trait Behavior: Send {
    fn node_type(&self) -> NodeType;

    /// One execution step. Invoked only through
    /// [`TreeNode::execute_tick`]; the returned status is committed by the
    /// node, never by the variant itself.
    fn tick(&mut self, ports: &Ports<'_>) -> NodeStatus;

    /// Abort an in-progress execution and release variant-local progress
    /// state. The node commits `Idle` afterwards, so the next tick starts
    /// fresh.
    fn halt(&mut self);

    /// Ports this variant declares, feeding its manifest. Variants without
    /// ports keep the default.
    fn provided_ports() -> PortsList
    where
        Self: Sized,
    {
        PortsList::new()
    }
}

/// The stateful execution unit of the tree.
///
/// A node owns its identity, its lock-guarded status register, a condvar
/// for [`wait_valid_status`](TreeNode::wait_valid_status), the subscription
/// registry, and the boxed variant behavior. The status lock is held only
/// for the instant of reading or writing the status value — never across a
/// variant step, and never while subscriber callbacks run.
///
/// Concurrent `execute_tick` calls on one node are not a supported usage
/// pattern; the owning scheduler must keep at most one tick in flight per
/// node. Waiters and parameter accessors may run concurrently with ticking.
pub struct TreeNode {
    name: String,
    uid: u64,
    config: NodeConfig,
    behavior: Mutex<Box<dyn Behavior>>,
    status: Mutex<NodeStatus>,
    status_changed: Condvar,
    signal: StatusChangeSignal,
}

impl TreeNode {
    pub fn new(
        name: impl Into<String>,
        config: NodeConfig,
        behavior: impl Behavior + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            uid: NEXT_UID.fetch_add(1, Ordering::Relaxed),
            config,
            behavior: Mutex::new(Box::new(behavior)),
            status: Mutex::new(NodeStatus::Idle),
            status_changed: Condvar::new(),
            signal: StatusChangeSignal::new(),
        }
    }

    /// Runs the variant's step, commits the resulting status, and returns
    /// it. This is the one path by which ticking changes the status.
    pub fn execute_tick(&self) -> NodeStatus {
        let new_status = {
            let mut behavior = lock(&self.behavior);
            let ports = Ports::new(&self.config);
            behavior.tick(&ports)
        };
        self.set_status(new_status);
        new_status
    }

    /// Interrupts a running execution: the variant releases its progress
    /// state, then the node commits back to `Idle`. Safe to call on an
    /// already-idle node, and from within a status-change callback.
    pub fn halt(&self) {
        {
            let mut behavior = lock(&self.behavior);
            behavior.halt();
        }
        self.set_status(NodeStatus::Idle);
    }

    /// Commits `new_status`. Writing the current value again is a no-op:
    /// no waiter is woken and no notification is emitted. An actual change
    /// wakes every parked waiter exactly once and then fans out to the
    /// subscribers, synchronously, on the calling thread.
    pub fn set_status(&self, new_status: NodeStatus) {
        let (previous, at) = {
            let mut status = lock(&self.status);
            if *status == new_status {
                return;
            }
            let previous = *status;
            *status = new_status;
            (previous, Utc::now())
        };
        self.status_changed.notify_all();
        self.signal.emit(at, self, previous, new_status);
    }

    pub fn status(&self) -> NodeStatus {
        *lock(&self.status)
    }

    pub fn is_halted(&self) -> bool {
        self.status() == NodeStatus::Idle
    }

    /// Parks the calling thread until the status is no longer `Idle`, then
    /// returns it. Pairs with a node ticked from another thread.
    pub fn wait_valid_status(&self) -> NodeStatus {
        let mut status = lock(&self.status);
        while !status.is_valid() {
            status = self
                .status_changed
                .wait(status)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *status
    }

    /// Bounded variant of [`wait_valid_status`](TreeNode::wait_valid_status)
    /// for drivers that must give up: returns `None` if the node is still
    /// idle when `timeout` elapses.
    pub fn wait_valid_status_for(&self, timeout: Duration) -> Option<NodeStatus> {
        let deadline = Instant::now() + timeout;
        let mut status = lock(&self.status);
        while !status.is_valid() {
            let remaining = deadline.checked_duration_since(Instant::now())?;
            let (guard, wait) = self
                .status_changed
                .wait_timeout(status, remaining)
                .unwrap_or_else(PoisonError::into_inner);
            status = guard;
            if wait.timed_out() && !status.is_valid() {
                return None;
            }
        }
        Some(*status)
    }

    /// Instance name, not necessarily unique; use [`uid`](TreeNode::uid)
    /// for correlation.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Id under which the variant was registered with the factory.
    pub fn registration_name(&self) -> &str {
        &self.config.registration_id
    }

    pub fn uid(&self) -> u64 {
        self.uid
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Resolves `key` through the port binding table; see
    /// [`Ports::get_param`].
    pub fn get_param<T: PortValue>(&self, key: &str) -> Result<T, PortError> {
        Ports::new(&self.config).get_param(key)
    }

    /// Writes through an output port; see [`Ports::set_output`].
    pub fn set_output<T: PortValue>(&self, key: &str, value: T) -> Result<(), PortError> {
        Ports::new(&self.config).set_output(key, value)
    }

    /// Registers a callback invoked on every status transition. The
    /// subscription lives as long as at least one clone of the returned
    /// handle; dropping the last clone deregisters it permanently.
    pub fn subscribe_to_status_change(
        &self,
        callback: impl Fn(DateTime<Utc>, &TreeNode, NodeStatus, NodeStatus) + Send + Sync + 'static,
    ) -> StatusChangeSubscription {
        self.signal.subscribe(callback)
    }
}
