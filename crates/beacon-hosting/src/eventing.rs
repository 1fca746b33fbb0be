//! Lifecycle eventing
//!
//! An explicit two-phase protocol replacing a live event-loop abstraction:
//! registration appends pending actions under a lifecycle phase, and
//! dispatch drains a phase's list and invokes each action exactly once, in
//! registration order. Dispatch is directly invokable, which is also what
//! makes the propagation path testable without a running host.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;
use ulid::Ulid;

use beacon_discovery::AllocatedEndpoint;

use crate::error::HostingError;

/// Lifecycle phases a host run moves through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecyclePhase {
    /// Before the host starts allocating anything
    BeforeStart,
    /// After network endpoints have been allocated for all resources
    AfterEndpointsAllocated,
}

/// Unique identifier of one registered pending action (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BindingId(pub Ulid);

impl BindingId {
    /// Generate new binding ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for BindingId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Endpoints allocated to one resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceAllocation {
    /// Resource name
    pub resource: String,
    /// Allocated endpoints in declaration order
    pub endpoints: Vec<AllocatedEndpoint>,
}

/// Immutable snapshot passed to after-allocation subscribers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllocatedEndpointsEvent {
    allocations: Vec<ResourceAllocation>,
}

impl AllocatedEndpointsEvent {
    /// Build the event from per-resource allocations
    #[inline]
    #[must_use]
    pub fn new(allocations: Vec<ResourceAllocation>) -> Self {
        Self { allocations }
    }

    /// All allocations in resource registration order
    #[inline]
    #[must_use]
    pub fn allocations(&self) -> &[ResourceAllocation] {
        &self.allocations
    }

    /// Allocated endpoints of one resource, by exact name
    #[must_use]
    pub fn resource(&self, name: &str) -> Option<&[AllocatedEndpoint]> {
        self.allocations
            .iter()
            .find(|a| a.resource == name)
            .map(|a| a.endpoints.as_slice())
    }
}

/// Event object delivered to pending actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Delivered on [`LifecyclePhase::BeforeStart`]
    BeforeStart,
    /// Delivered on [`LifecyclePhase::AfterEndpointsAllocated`]
    AfterEndpointsAllocated(AllocatedEndpointsEvent),
}

/// A registered one-shot action: consumed on dispatch, never re-run
pub type PendingAction = Box<
    dyn FnOnce(
            Arc<LifecycleEvent>,
            CancellationToken,
        ) -> BoxFuture<'static, Result<(), HostingError>>
        + Send
        + Sync,
>;

struct PendingRegistration {
    id: BindingId,
    action: PendingAction,
}

/// Phase-keyed registry of pending actions
///
/// Each phase's list is drained on dispatch, so every action runs at most
/// once per host run; dispatching an already-drained phase is a no-op.
#[derive(Default)]
pub struct LifecycleEventing {
    pending: DashMap<LifecyclePhase, Vec<PendingRegistration>>,
}

impl LifecycleEventing {
    /// Create an empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pending action under a phase
    ///
    /// Actions registered under the same phase run in registration order.
    pub fn subscribe(&self, phase: LifecyclePhase, action: PendingAction) -> BindingId {
        let id = BindingId::new();
        self.pending
            .entry(phase)
            .or_default()
            .push(PendingRegistration { id, action });
        tracing::debug!("Registered pending action {} for {:?}", id, phase);
        id
    }

    /// Number of actions currently pending for a phase
    #[must_use]
    pub fn pending_count(&self, phase: LifecyclePhase) -> usize {
        self.pending.get(&phase).map_or(0, |list| list.len())
    }

    /// Drain a phase and invoke each pending action exactly once
    ///
    /// Actions are awaited sequentially in registration order; the first
    /// failure propagates and abandons the remainder. A cancelled token
    /// suppresses the dispatch entirely, leaving nothing invoked.
    ///
    /// Returns the number of actions invoked.
    pub async fn dispatch(
        &self,
        phase: LifecyclePhase,
        event: LifecycleEvent,
        cancellation: CancellationToken,
    ) -> Result<usize, HostingError> {
        if cancellation.is_cancelled() {
            tracing::warn!("Skipping {:?} dispatch: host is shutting down", phase);
            return Ok(0);
        }
        let Some((_, drained)) = self.pending.remove(&phase) else {
            return Ok(0);
        };

        let event = Arc::new(event);
        let mut fired = 0;
        for registration in drained {
            tracing::debug!("Dispatching {:?} action {}", phase, registration.id);
            (registration.action)(Arc::clone(&event), cancellation.clone()).await?;
            fired += 1;
        }
        Ok(fired)
    }
}

impl fmt::Debug for LifecycleEventing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut counts = f.debug_struct("LifecycleEventing");
        for entry in self.pending.iter() {
            counts.field(&format!("{:?}", entry.key()), &entry.value().len());
        }
        counts.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn recording_action(log: Arc<Mutex<Vec<usize>>>, index: usize) -> PendingAction {
        Box::new(move |_event, _cancel| {
            Box::pin(async move {
                log.lock().push(index);
                Ok(())
            })
        })
    }

    #[tokio::test]
    async fn dispatch_drains_and_fires_once() {
        let eventing = LifecycleEventing::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        eventing.subscribe(
            LifecyclePhase::AfterEndpointsAllocated,
            recording_action(Arc::clone(&log), 0),
        );
        assert_eq!(eventing.pending_count(LifecyclePhase::AfterEndpointsAllocated), 1);

        let fired = eventing
            .dispatch(
                LifecyclePhase::AfterEndpointsAllocated,
                LifecycleEvent::AfterEndpointsAllocated(AllocatedEndpointsEvent::default()),
                CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(fired, 1);

        let fired = eventing
            .dispatch(
                LifecyclePhase::AfterEndpointsAllocated,
                LifecycleEvent::AfterEndpointsAllocated(AllocatedEndpointsEvent::default()),
                CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(fired, 0);
        assert_eq!(log.lock().len(), 1);
    }

    #[tokio::test]
    async fn actions_run_in_registration_order() {
        let eventing = LifecycleEventing::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        for index in 0..4 {
            eventing.subscribe(
                LifecyclePhase::BeforeStart,
                recording_action(Arc::clone(&log), index),
            );
        }

        eventing
            .dispatch(
                LifecyclePhase::BeforeStart,
                LifecycleEvent::BeforeStart,
                CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(*log.lock(), vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn cancelled_token_suppresses_dispatch() {
        let eventing = LifecycleEventing::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        eventing.subscribe(
            LifecyclePhase::BeforeStart,
            recording_action(Arc::clone(&log), 0),
        );

        let cancellation = CancellationToken::new();
        cancellation.cancel();
        let fired = eventing
            .dispatch(
                LifecyclePhase::BeforeStart,
                LifecycleEvent::BeforeStart,
                cancellation,
            )
            .await
            .unwrap();
        assert_eq!(fired, 0);
        assert!(log.lock().is_empty());
    }

    #[tokio::test]
    async fn first_failure_propagates() {
        let eventing = LifecycleEventing::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        eventing.subscribe(
            LifecyclePhase::BeforeStart,
            Box::new(|_event, _cancel| {
                Box::pin(async { Err(HostingError::InvalidArgument("boom")) })
            }),
        );
        eventing.subscribe(
            LifecyclePhase::BeforeStart,
            recording_action(Arc::clone(&log), 1),
        );

        let result = eventing
            .dispatch(
                LifecyclePhase::BeforeStart,
                LifecycleEvent::BeforeStart,
                CancellationToken::new(),
            )
            .await;
        assert!(result.is_err());
        assert!(log.lock().is_empty());
    }

    #[test]
    fn event_snapshot_lookup() {
        let event = AllocatedEndpointsEvent::new(vec![ResourceAllocation {
            resource: "api".to_string(),
            endpoints: vec![AllocatedEndpoint::new("http", "http://localhost:5000")],
        }]);
        assert_eq!(event.resource("api").map(<[_]>::len), Some(1));
        assert!(event.resource("API").is_none());
    }
}
