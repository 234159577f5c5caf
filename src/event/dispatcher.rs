use std::any::TypeId;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use tracing::{debug, error, info, trace};

use super::{
    events::Event,
    handler::{ErasedHandler, EventError, Handler},
};

type HandlerList = Vec<Rc<dyn ErasedHandler>>;

/// Routes typed events to the handlers subscribed for that exact type
///
/// The EventDispatcher:
/// - Keeps one ordered handler list per event type (subscription order is delivery order)
/// - Delivers synchronously on the caller's thread
/// - Queues events published from inside a handler and flushes them, oldest first,
///   before the outermost `publish` returns
/// - Provides isolation between handlers (one failing handler doesn't affect others)
///
/// Every method takes `&self`, so handlers holding an `Rc<EventDispatcher>` can
/// subscribe, unsubscribe and publish while a delivery is running. The type is
/// neither `Send` nor `Sync`.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: RefCell<HashMap<TypeId, HandlerList>>,
    pending: RefCell<VecDeque<(TypeId, Box<dyn Event>)>>,
    dispatching: Cell<bool>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initialize(&self) {
        info!("Event dispatcher initialized");
    }

    /// Drops every subscription and any event still waiting in the queue
    pub fn dispose(&self) {
        let handlers = std::mem::take(&mut *self.handlers.borrow_mut());
        let pending = std::mem::take(&mut *self.pending.borrow_mut());
        // Dropped after the borrows end: captured state may call back in
        drop(handlers);
        drop(pending);
        info!("Event dispatcher disposed");
    }

    /// Register a handler for events of type `E`
    ///
    /// Registering the same handler twice delivers every event to it twice.
    pub fn subscribe<E: Event>(&self, handler: Handler<E>) {
        debug!(
            handler = handler.name(),
            event_type = std::any::type_name::<E>(),
            "Subscribing event handler"
        );
        self.handlers
            .borrow_mut()
            .entry(TypeId::of::<E>())
            .or_default()
            .push(Rc::new(handler));
    }

    /// Remove the first registration of `handler` for `E`, if any
    pub fn unsubscribe<E: Event>(&self, handler: &Handler<E>) {
        let type_id = TypeId::of::<E>();
        let mut table = self.handlers.borrow_mut();

        let Some(list) = table.get_mut(&type_id) else {
            return;
        };

        let position = list.iter().position(|entry| {
            entry
                .as_any()
                .downcast_ref::<Handler<E>>()
                .is_some_and(|registered| registered.ptr_eq(handler))
        });

        if let Some(index) = position {
            list.remove(index);
            debug!(
                handler = handler.name(),
                event_type = std::any::type_name::<E>(),
                remaining = list.len(),
                "Unsubscribed event handler"
            );
        }

        if list.is_empty() {
            table.remove(&type_id);
        }
    }

    /// Deliver `event` to every handler subscribed to `E`
    ///
    /// Called from inside a handler, the event is queued and delivered after
    /// the current pass finishes. Handler failures are logged, never returned.
    pub fn publish<E: Event>(&self, event: E) {
        if self.dispatching.get() {
            trace!(
                event_type = event.event_type(),
                queued = self.pending.borrow().len() + 1,
                "Delivery in progress - queueing event"
            );
            self.pending
                .borrow_mut()
                .push_back((TypeId::of::<E>(), Box::new(event)));
            return;
        }

        self.deliver(TypeId::of::<E>(), &event);
        self.drain_pending();
    }

    /// Number of handlers currently registered for `E`
    pub fn subscriber_count<E: Event>(&self) -> usize {
        self.handlers
            .borrow()
            .get(&TypeId::of::<E>())
            .map_or(0, Vec::len)
    }

    /// Remove every subscription for every event type
    ///
    /// Events already queued are still drained, but find no handlers.
    pub fn clear_all_subscriptions(&self) {
        let handlers = std::mem::take(&mut *self.handlers.borrow_mut());
        drop(handlers);
        info!("All event subscriptions cleared");
    }

    /// Whether a delivery pass is currently invoking handlers
    pub fn is_dispatching(&self) -> bool {
        self.dispatching.get()
    }

    fn drain_pending(&self) {
        loop {
            // The queue borrow must end before any handler runs
            let next = self.pending.borrow_mut().pop_front();
            let Some((type_id, event)) = next else {
                break;
            };
            self.deliver(type_id, &*event);
        }
    }

    /// One delivery pass over a snapshot of the handler list
    fn deliver(&self, type_id: TypeId, event: &dyn Event) {
        let snapshot = self.handlers.borrow().get(&type_id).cloned();

        let Some(snapshot) = snapshot else {
            trace!(event_type = event.event_type(), "No subscribers for event");
            return;
        };

        debug!(
            event_type = event.event_type(),
            "Dispatching event to {} handlers",
            snapshot.len()
        );

        self.dispatching.set(true);

        for handler in &snapshot {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler.invoke(event)))
                .unwrap_or_else(|payload| Err(EventError::from_panic(payload)));

            if let Err(e) = outcome {
                error!(
                    handler = handler.handler_name(),
                    event_type = event.event_type(),
                    error = %e,
                    "Error handling event"
                );
            }
        }

        self.dispatching.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{GameInstanceReset, LevelChanged, ScoreChanged};
    use rstest::rstest;

    fn recording<E: Event>(log: &Rc<RefCell<Vec<String>>>, name: &'static str) -> Handler<E> {
        let log = log.clone();
        Handler::new(name, move |_: &E| {
            log.borrow_mut().push(name.to_string());
            Ok(())
        })
    }

    #[test]
    fn test_unknown_type_queries() {
        let dispatcher = EventDispatcher::new();
        let handler = Handler::new("never", |_: &ScoreChanged| Ok(()));

        assert_eq!(dispatcher.subscriber_count::<ScoreChanged>(), 0);
        dispatcher.unsubscribe(&handler);
        assert_eq!(dispatcher.subscriber_count::<ScoreChanged>(), 0);
    }

    #[rstest]
    #[case(1)]
    #[case(3)]
    #[case(8)]
    fn test_count_tracks_subscribe_and_unsubscribe(#[case] n: usize) {
        let dispatcher = EventDispatcher::new();
        let handlers: Vec<_> = (0..n)
            .map(|_| Handler::new("h", |_: &LevelChanged| Ok(())))
            .collect();

        for (i, handler) in handlers.iter().enumerate() {
            dispatcher.subscribe(handler.clone());
            assert_eq!(dispatcher.subscriber_count::<LevelChanged>(), i + 1);
        }

        for (i, handler) in handlers.iter().enumerate() {
            dispatcher.unsubscribe(handler);
            assert_eq!(dispatcher.subscriber_count::<LevelChanged>(), n - i - 1);
        }

        assert!(dispatcher.handlers.borrow().is_empty());
    }

    #[test]
    fn test_unsubscribe_removes_one_duplicate() {
        let dispatcher = EventDispatcher::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let handler = recording::<ScoreChanged>(&log, "dup");

        dispatcher.subscribe(handler.clone());
        dispatcher.subscribe(handler.clone());
        dispatcher.publish(ScoreChanged { score: 1 });
        assert_eq!(log.borrow().len(), 2);

        dispatcher.unsubscribe(&handler);
        assert_eq!(dispatcher.subscriber_count::<ScoreChanged>(), 1);

        dispatcher.publish(ScoreChanged { score: 2 });
        assert_eq!(log.borrow().len(), 3);
    }

    #[test]
    fn test_unsubscribe_keeps_other_handlers() {
        let dispatcher = EventDispatcher::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let first = recording::<ScoreChanged>(&log, "first");
        let second = recording::<ScoreChanged>(&log, "second");

        dispatcher.subscribe(first.clone());
        dispatcher.subscribe(second);
        dispatcher.unsubscribe(&first);
        dispatcher.publish(ScoreChanged { score: 5 });

        assert_eq!(*log.borrow(), vec!["second"]);
    }

    #[test]
    fn test_dispatching_flag_only_set_during_pass() {
        let dispatcher = Rc::new(EventDispatcher::new());
        let observed = Rc::new(Cell::new(false));

        let d = Rc::downgrade(&dispatcher);
        let seen = observed.clone();
        dispatcher.subscribe(Handler::new("observer", move |_: &GameInstanceReset| {
            if let Some(d) = d.upgrade() {
                seen.set(d.is_dispatching());
            }
            Ok(())
        }));

        assert!(!dispatcher.is_dispatching());
        dispatcher.publish(GameInstanceReset);
        assert!(observed.get());
        assert!(!dispatcher.is_dispatching());
    }

    #[test]
    fn test_publish_without_subscribers_is_noop() {
        let dispatcher = EventDispatcher::new();

        dispatcher.publish(ScoreChanged { score: 10 });

        assert!(!dispatcher.is_dispatching());
        assert!(dispatcher.pending.borrow().is_empty());
    }

    #[test]
    fn test_dispose_clears_table_and_queue() {
        let dispatcher = EventDispatcher::new();
        dispatcher.subscribe(Handler::new("h", |_: &ScoreChanged| Ok(())));
        dispatcher
            .pending
            .borrow_mut()
            .push_back((TypeId::of::<ScoreChanged>(), Box::new(ScoreChanged { score: 1 })));

        dispatcher.dispose();

        assert_eq!(dispatcher.subscriber_count::<ScoreChanged>(), 0);
        assert!(dispatcher.pending.borrow().is_empty());
    }
}
