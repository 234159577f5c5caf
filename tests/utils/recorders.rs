use std::cell::RefCell;
use std::rc::Rc;

use factorybase::{Event, EventError, Handler};

// ============================================================================
// Call recording
// ============================================================================

/// Shared, ordered log of handler invocations
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct CallLog(Rc<RefCell<Vec<String>>>);

#[allow(dead_code)]
impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.0.borrow_mut().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.0.borrow().iter().filter(|e| *e == entry).count()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// Handler that records its own name on every call
    pub fn handler<E: Event>(&self, name: &'static str) -> Handler<E> {
        let log = self.clone();
        Handler::new(name, move |_: &E| {
            log.push(name);
            Ok(())
        })
    }

    /// Handler that records `name:<describe(event)>`
    pub fn describing<E: Event>(
        &self,
        name: &'static str,
        describe: fn(&E) -> String,
    ) -> Handler<E> {
        let log = self.clone();
        Handler::new(name, move |e: &E| {
            log.push(format!("{name}:{}", describe(e)));
            Ok(())
        })
    }

    /// Handler that records its name, then fails
    pub fn failing<E: Event>(&self, name: &'static str) -> Handler<E> {
        let log = self.clone();
        Handler::new(name, move |_: &E| {
            log.push(name);
            Err(EventError::failed("simulated failure"))
        })
    }

    /// Handler that records its name, then panics
    pub fn panicking<E: Event>(&self, name: &'static str) -> Handler<E> {
        let log = self.clone();
        Handler::new(name, move |_: &E| {
            log.push(name);
            panic!("simulated panic in {name}");
        })
    }
}
