use std::any::Any;
use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use super::events::Event;

/// Errors a handler can report while processing an event
///
/// These never reach the publisher. The dispatcher logs them and moves on
/// to the next handler in the snapshot.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("Handler failed: {0}")]
    Failed(String),

    #[error("Handler panicked: {0}")]
    Panic(String),
}

impl EventError {
    /// Create a failure error
    pub fn failed(msg: impl Into<String>) -> Self {
        EventError::Failed(msg.into())
    }

    /// Build a panic error from the payload returned by `catch_unwind`
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(msg) = payload.downcast_ref::<&'static str>() {
            (*msg).to_string()
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            msg.clone()
        } else {
            "non-string panic payload".to_string()
        };
        EventError::Panic(message)
    }
}

type Callback<E> = dyn Fn(&E) -> Result<(), EventError>;

/// A callback registered for exactly one event type
///
/// Identity is the allocation behind the callback: clones of a handler are
/// the same handler for `unsubscribe`, two handlers built from identical
/// closures are not.
pub struct Handler<E> {
    name: &'static str,
    callback: Rc<Callback<E>>,
}

impl<E: Event> Handler<E> {
    /// Wrap a callback under a human-readable name (for logging/debugging)
    pub fn new<F>(name: &'static str, callback: F) -> Self
    where
        F: Fn(&E) -> Result<(), EventError> + 'static,
    {
        Self {
            name,
            callback: Rc::new(callback),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether both values refer to the same registered callback
    pub fn ptr_eq(&self, other: &Handler<E>) -> bool {
        Rc::ptr_eq(&self.callback, &other.callback)
    }

    pub fn call(&self, event: &E) -> Result<(), EventError> {
        (self.callback)(event)
    }
}

impl<E> Clone for Handler<E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            callback: Rc::clone(&self.callback),
        }
    }
}

impl<E> fmt::Debug for Handler<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler").field("name", &self.name).finish()
    }
}

/// Uniform invocation wrapper stored in the subscription table
pub(crate) trait ErasedHandler {
    fn invoke(&self, event: &dyn Event) -> Result<(), EventError>;

    fn handler_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;
}

impl<E: Event> ErasedHandler for Handler<E> {
    fn invoke(&self, event: &dyn Event) -> Result<(), EventError> {
        match event.as_any().downcast_ref::<E>() {
            Some(event) => self.call(event),
            // The table is keyed by TypeId, so this only fires on a routing bug
            None => Err(EventError::failed(format!(
                "handler {} received mismatched event {}",
                self.name,
                event.event_type()
            ))),
        }
    }

    fn handler_name(&self) -> &'static str {
        self.name
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
