use crate::{lock, NodeStatus, TreeNode};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, Weak};

/// Callback invoked synchronously on every status transition of a node,
/// with the commit timestamp, the node itself, and the (previous, new)
/// status pair.
pub type StatusChangeCallback =
    dyn Fn(DateTime<Utc>, &TreeNode, NodeStatus, NodeStatus) + Send + Sync;

/// Handle keeping a status-change subscription alive.
///
/// The registry holds only a weak reference to the callback; dropping the
/// last clone of this handle permanently deregisters it. A notification in
/// flight upgrades the weak reference for the duration of the call, so the
/// callback is never torn down mid-invocation.
#[derive(Clone)]
pub struct StatusChangeSubscription {
    _callback: Arc<StatusChangeCallback>,
}

/// Per-node publish/subscribe registry for status transitions.
pub(crate) struct StatusChangeSignal {
    slots: Mutex<Vec<Weak<StatusChangeCallback>>>,
}

impl StatusChangeSignal {
    pub(crate) fn new() -> Self {
        Self {
            slots: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn subscribe(
        &self,
        callback: impl Fn(DateTime<Utc>, &TreeNode, NodeStatus, NodeStatus) + Send + Sync + 'static,
    ) -> StatusChangeSubscription {
        let callback: Arc<StatusChangeCallback> = Arc::new(callback);
        lock(&self.slots).push(Arc::downgrade(&callback));
        StatusChangeSubscription {
            _callback: callback,
        }
    }

    /// Fans one committed transition out to every live subscriber, in
    /// registration order. Dead slots are pruned on the way. Callbacks run
    /// with no lock held.
    pub(crate) fn emit(
        &self,
        at: DateTime<Utc>,
        node: &TreeNode,
        previous: NodeStatus,
        new_status: NodeStatus,
    ) {
        let live: Vec<Arc<StatusChangeCallback>> = {
            let mut slots = lock(&self.slots);
            slots.retain(|slot| slot.strong_count() > 0);
            slots.iter().filter_map(Weak::upgrade).collect()
        };
        for callback in live {
            callback(at, node, previous, new_status);
        }
    }
}

/// Subscribes a logger that reports every transition of `node` as a
/// `tracing` event. The subscription lasts as long as the returned handle.
pub fn attach_tracing_logger(node: &TreeNode) -> StatusChangeSubscription {
    node.subscribe_to_status_change(|_at, node, previous, new_status| {
        tracing::info!(
            target: "tickcore::status",
            uid = node.uid(),
            name = %node.name(),
            %previous,
            %new_status,
            "node status changed"
        );
    })
}
