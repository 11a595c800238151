use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Handle returned by [`ObserverRegistry::register`], used to unregister
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "observer#{}", self.0)
    }
}

type Observer<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Synchronous observer list for one event type.
///
/// Observers run in registration order. The list is snapshotted before
/// dispatch, so an observer may register, unregister or trigger again
/// without deadlocking.
pub struct ObserverRegistry<E> {
    next_id: AtomicU64,
    observers: RwLock<Vec<(ObserverId, Observer<E>)>>,
}

impl<E> ObserverRegistry<E> {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            observers: RwLock::new(Vec::new()),
        }
    }

    pub fn register<F>(&self, observer: F) -> ObserverId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = ObserverId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(observer)));
        id
    }

    /// Remove an observer; returns false if it was already gone
    pub fn unregister(&self, id: ObserverId) -> bool {
        let mut observers = self.observers.write().unwrap_or_else(PoisonError::into_inner);
        let before = observers.len();
        observers.retain(|(observer_id, _)| *observer_id != id);
        observers.len() != before
    }

    pub fn is_registered(&self, id: ObserverId) -> bool {
        self.observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|(observer_id, _)| *observer_id == id)
    }

    pub fn observer_count(&self) -> usize {
        self.observers.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn clear(&self) {
        self.observers.write().unwrap_or_else(PoisonError::into_inner).clear();
    }

    pub fn trigger(&self, event: &E) {
        let snapshot: Vec<Observer<E>> = self
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();

        tracing::trace!("Dispatching event to {} observer(s)", snapshot.len());
        for observer in snapshot {
            observer(event);
        }
    }
}

impl<E> Default for ObserverRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for ObserverRegistry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observers", &self.observer_count())
            .finish()
    }
}
