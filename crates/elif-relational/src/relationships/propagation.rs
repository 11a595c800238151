//! Change propagation from a materialized collection to its parent

use crate::collection::{Collection, WeakCollection};
use crate::events::CollectionEvent;
use crate::model::Model;
use crate::observers::ObserverId;

/// Subscription that forwards a collection's mutations to a parent model.
///
/// Dropping the handle leaves the subscription in place; call
/// [`unbind`](AssociationBinding::unbind) to remove it.
#[derive(Debug)]
pub struct AssociationBinding {
    collection: WeakCollection,
    observer: ObserverId,
}

impl AssociationBinding {
    /// Remove the subscription. Returns false when it was already gone or
    /// the collection no longer exists.
    pub fn unbind(self) -> bool {
        match self.collection.upgrade() {
            Some(collection) => {
                let removed = collection.off(self.observer);
                if removed {
                    tracing::debug!(
                        collection = collection.collection_type().name(),
                        observer = %self.observer,
                        "association unbound"
                    );
                }
                removed
            }
            None => false,
        }
    }

    pub fn is_bound(&self) -> bool {
        self.collection
            .upgrade()
            .is_some_and(|collection| collection.is_observing(self.observer))
    }

    pub fn observer_id(&self) -> ObserverId {
        self.observer
    }
}

/// Re-emit every `Add`, `Remove`, `Change` and `Reset` of `collection` as a
/// single `Change` on `parent`. Event payloads are discarded. Only a weak
/// reference to the parent is held.
pub fn bind(collection: &Collection, parent: &Model) -> AssociationBinding {
    let weak_parent = parent.downgrade();
    let observer = collection.on(move |event: &CollectionEvent| match event {
        CollectionEvent::Add { .. }
        | CollectionEvent::Remove { .. }
        | CollectionEvent::Change { .. }
        | CollectionEvent::Reset => {
            if let Some(parent) = weak_parent.upgrade() {
                parent.trigger_change();
            }
        }
    });

    tracing::debug!(
        collection = collection.collection_type().name(),
        parent = %parent.cid(),
        observer = %observer,
        "association bound"
    );

    AssociationBinding {
        collection: collection.downgrade(),
        observer,
    }
}
