//! Lifecycle event system.
//!
//! Every component that touches the shared cache (the borrow protocol, the
//! worker loop, the reaper) reports what it did through a set of listeners.
//! Listeners are plain callbacks; the guard never depends on them for
//! correctness.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Trait for events emitted while managing a guarded cache.
pub trait LifecycleEvent: Send + Sync + fmt::Debug {
    /// Returns the type of event (e.g., "cache_created", "cache_evicted").
    fn event_type(&self) -> &'static str;

    /// Returns when this event occurred.
    fn timestamp(&self) -> Instant;

    /// Returns the name of the guard instance that emitted this event.
    fn guard_name(&self) -> &str;
}

/// Trait for listening to lifecycle events.
pub trait EventListener<E: LifecycleEvent>: Send + Sync {
    /// Called when an event occurs.
    fn on_event(&self, event: &E);
}

/// Type alias for boxed event listeners.
pub type BoxedEventListener<E> = Arc<dyn EventListener<E>>;

/// A collection of event listeners.
#[derive(Clone)]
pub struct EventListeners<E: LifecycleEvent> {
    listeners: Vec<BoxedEventListener<E>>,
}

impl<E: LifecycleEvent> EventListeners<E> {
    /// Creates a new empty event listener collection.
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Adds a listener to the collection.
    pub fn add<L>(&mut self, listener: L)
    where
        L: EventListener<E> + 'static,
    {
        self.listeners.push(Arc::new(listener));
    }

    /// Emits an event to all registered listeners.
    ///
    /// A panicking listener is isolated: the panic is caught and the
    /// remaining listeners still receive the event. Emission happens while
    /// the slot may be locked, so a listener must never be able to unwind
    /// through the borrow protocol.
    pub fn emit(&self, event: &E) {
        for listener in &self.listeners {
            let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                listener.on_event(event);
            }));
        }
    }

    /// Registers a callback that only receives events whose
    /// [`event_type`](LifecycleEvent::event_type) equals `event_type`.
    pub fn add_for_type<F>(&mut self, event_type: &'static str, f: F)
    where
        F: Fn(&E) + Send + Sync + 'static,
        E: 'static,
    {
        self.add(TypedListener::new(event_type, f));
    }

    /// Returns true if there are no listeners.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Returns the number of listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }
}

impl<E: LifecycleEvent> Default for EventListeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: LifecycleEvent> fmt::Debug for EventListeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventListeners")
            .field("len", &self.listeners.len())
            .finish()
    }
}

/// A closure-backed event listener.
pub struct FnListener<E, F>
where
    F: Fn(&E) + Send + Sync,
{
    f: F,
    _phantom: std::marker::PhantomData<E>,
}

impl<E, F> FnListener<E, F>
where
    F: Fn(&E) + Send + Sync,
{
    /// Creates a new function-based listener.
    pub fn new(f: F) -> Self {
        Self {
            f,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<E, F> EventListener<E> for FnListener<E, F>
where
    E: LifecycleEvent,
    F: Fn(&E) + Send + Sync,
{
    fn on_event(&self, event: &E) {
        (self.f)(event)
    }
}

/// A closure-backed listener restricted to a single event type.
///
/// Guards emit many event kinds through one listener list; this lets a
/// callback subscribe to one kind by name without matching on the enum.
pub struct TypedListener<E, F>
where
    F: Fn(&E) + Send + Sync,
{
    event_type: &'static str,
    f: F,
    _phantom: std::marker::PhantomData<E>,
}

impl<E, F> TypedListener<E, F>
where
    F: Fn(&E) + Send + Sync,
{
    pub fn new(event_type: &'static str, f: F) -> Self {
        Self {
            event_type,
            f,
            _phantom: std::marker::PhantomData,
        }
    }

    /// The event type this listener accepts.
    pub fn event_type(&self) -> &'static str {
        self.event_type
    }
}

impl<E, F> EventListener<E> for TypedListener<E, F>
where
    E: LifecycleEvent,
    F: Fn(&E) + Send + Sync,
{
    fn on_event(&self, event: &E) {
        if event.event_type() == self.event_type {
            (self.f)(event)
        }
    }
}
