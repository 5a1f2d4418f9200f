//! Core infrastructure for cache-guard.
//!
//! Holds the pieces shared between the guard itself and anything observing it:
//! - Lifecycle event trait
//! - Listener collection with panic isolation
//! - Listeners filtered by event type

pub mod events;

pub use events::{
    BoxedEventListener, EventListener, EventListeners, FnListener, LifecycleEvent,
    TypedListener,
};
