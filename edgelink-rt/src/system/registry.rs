//! The local actor registry.

// Layer 1: Standard library imports
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

// Layer 2: Third-party crate imports
use parking_lot::Mutex;
use tracing::warn;

// Layer 3: Internal module imports
use super::errors::RpcError;
use crate::actor::DistributedActor;
use crate::util::ActorId;

/// Type-erased strong reference to a registered actor.
///
/// Keeps both the dispatch seam and an `Any` handle so `resolve` can
/// hand back the concrete type. The registry owns the reference for the
/// lifetime of the registration.
#[derive(Clone)]
pub struct RegisteredActor {
    dispatcher: Arc<dyn DistributedActor>,
    instance: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl RegisteredActor {
    /// The dispatch seam for inbound invocations.
    pub fn dispatcher(&self) -> &Arc<dyn DistributedActor> {
        &self.dispatcher
    }

    /// The registered implementation's type name.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Recover the concrete actor type.
    pub fn downcast<A: DistributedActor>(&self) -> Option<Arc<A>> {
        Arc::clone(&self.instance).downcast::<A>().ok()
    }
}

/// Thread-safe map from actor id to local actor handle.
///
/// A single mutex serializes all mutation; holding time is O(1). A
/// registered id resolves to the same reference until `unregister` is
/// called; registering an id twice replaces the prior entry and logs a
/// warning.
#[derive(Default)]
pub struct ActorRegistry {
    entries: Mutex<HashMap<ActorId, RegisteredActor>>,
}

impl ActorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a local actor under its id.
    pub fn register<A: DistributedActor>(&self, actor: Arc<A>) {
        let id = actor.id().clone();
        let record = RegisteredActor {
            type_name: actor.type_name(),
            dispatcher: Arc::clone(&actor) as Arc<dyn DistributedActor>,
            instance: actor as Arc<dyn Any + Send + Sync>,
        };

        if self.entries.lock().insert(id.clone(), record).is_some() {
            warn!(actor_id = %id, "replacing existing registration for actor id");
        }
    }

    /// Look up the registered handle for an id.
    pub fn find(&self, id: &ActorId) -> Option<RegisteredActor> {
        self.entries.lock().get(id).cloned()
    }

    /// Look up an id and recover its concrete type.
    ///
    /// `Ok(None)` signals the id is not local (the caller should build a
    /// remote proxy).
    ///
    /// # Errors
    ///
    /// `TypeMismatch` when the registered implementation is not an `A`.
    pub fn resolve_typed<A: DistributedActor>(
        &self,
        id: &ActorId,
    ) -> Result<Option<Arc<A>>, RpcError> {
        match self.find(id) {
            None => Ok(None),
            Some(record) => match record.downcast::<A>() {
                Some(actor) => Ok(Some(actor)),
                None => Err(RpcError::TypeMismatch {
                    id: id.clone(),
                    expected: std::any::type_name::<A>().to_string(),
                    actual: record.type_name().to_string(),
                }),
            },
        }
    }

    /// Remove a registration.
    ///
    /// # Errors
    ///
    /// `ActorNotFound` when the id is not registered.
    pub fn unregister(&self, id: &ActorId) -> Result<(), RpcError> {
        match self.entries.lock().remove(id) {
            Some(_) => Ok(()),
            None => Err(RpcError::ActorNotFound(id.clone())),
        }
    }

    /// Number of registered actors.
    pub fn count(&self) -> usize {
        self.entries.lock().len()
    }
}
