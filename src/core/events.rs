//! Synchronous domain events
//!
//! The store publishes a [`DomainEvent`] after every successful write.
//! Handlers run on the calling thread, in subscription order, before the
//! write returns. A [`Subscription`] unregisters its handler when dropped.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::trace;

use crate::core::identity::EntityId;
use crate::core::query_cache::CacheError;
use crate::entities::{Goal, Project, Task};

/// What happened to a record
#[derive(Debug, Clone, PartialEq)]
pub enum Change<T> {
    Added(T),
    Updated(T),
    Deleted(EntityId),
}

impl<T> Change<T> {
    pub fn action(&self) -> &'static str {
        match self {
            Change::Added(_) => "added",
            Change::Updated(_) => "updated",
            Change::Deleted(_) => "deleted",
        }
    }
}

/// A mutation of one of the tracked entity types
#[derive(Debug, Clone, PartialEq)]
pub enum DomainEvent {
    Goal(Change<Goal>),
    Project(Change<Project>),
    Task(Change<Task>),
}

impl DomainEvent {
    fn describe(&self) -> (&'static str, &'static str) {
        match self {
            DomainEvent::Goal(c) => ("goal", c.action()),
            DomainEvent::Project(c) => ("project", c.action()),
            DomainEvent::Task(c) => ("task", c.action()),
        }
    }
}

/// Receives domain events
pub trait EventHandler {
    fn handle(&self, event: &DomainEvent) -> Result<(), CacheError>;
}

/// Ordered list of handlers with synchronous delivery
#[derive(Default)]
pub struct EventBus {
    handlers: RefCell<Vec<(u64, Rc<dyn EventHandler>)>>,
    next_id: Cell<u64>,
}

impl EventBus {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Register a handler; it stays registered while the returned guard lives
    pub fn subscribe(self: &Rc<Self>, handler: Rc<dyn EventHandler>) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.handlers.borrow_mut().push((id, handler));
        trace!(subscription = id, "event handler subscribed");

        Subscription {
            bus: Rc::downgrade(self),
            id,
        }
    }

    /// Deliver an event to every handler, stopping at the first failure
    pub fn publish(&self, event: &DomainEvent) -> Result<(), CacheError> {
        // Snapshot so handlers may subscribe or unsubscribe during delivery.
        let handlers: Vec<Rc<dyn EventHandler>> = self
            .handlers
            .borrow()
            .iter()
            .map(|(_, h)| Rc::clone(h))
            .collect();

        let (entity, action) = event.describe();
        trace!(entity, action, handlers = handlers.len(), "publishing event");

        for handler in handlers {
            handler.handle(event)?;
        }
        Ok(())
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.borrow().len()
    }

    fn unsubscribe(&self, id: u64) {
        self.handlers.borrow_mut().retain(|(hid, _)| *hid != id);
        trace!(subscription = id, "event handler unsubscribed");
    }
}

/// Keeps a handler registered; dropping it unsubscribes
#[must_use = "dropping a Subscription unsubscribes the handler immediately"]
pub struct Subscription {
    bus: Weak<EventBus>,
    id: u64,
}

impl Subscription {
    /// Unsubscribe now instead of at drop
    pub fn cancel(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.unsubscribe(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::EntityPrefix;

    struct Recorder {
        label: &'static str,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl EventHandler for Recorder {
        fn handle(&self, event: &DomainEvent) -> Result<(), CacheError> {
            let (entity, action) = event.describe();
            self.log
                .borrow_mut()
                .push(format!("{}:{}:{}", self.label, entity, action));
            Ok(())
        }
    }

    struct Failing;

    impl EventHandler for Failing {
        fn handle(&self, _event: &DomainEvent) -> Result<(), CacheError> {
            Err(CacheError::EntryNotFound {
                name: "AllTasks".to_string(),
                filter_term: String::new(),
            })
        }
    }

    fn deleted_task() -> DomainEvent {
        DomainEvent::Task(Change::Deleted(EntityId::new(EntityPrefix::Task)))
    }

    #[test]
    fn test_delivery_in_subscription_order() {
        let bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let _a = bus.subscribe(Rc::new(Recorder {
            label: "a",
            log: Rc::clone(&log),
        }));
        let _b = bus.subscribe(Rc::new(Recorder {
            label: "b",
            log: Rc::clone(&log),
        }));

        bus.publish(&deleted_task()).unwrap();

        assert_eq!(*log.borrow(), vec!["a:task:deleted", "b:task:deleted"]);
    }

    #[test]
    fn test_dropping_subscription_unsubscribes() {
        let bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let sub = bus.subscribe(Rc::new(Recorder {
            label: "a",
            log: Rc::clone(&log),
        }));
        assert_eq!(bus.handler_count(), 1);

        drop(sub);
        bus.publish(&deleted_task()).unwrap();

        assert_eq!(bus.handler_count(), 0);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_handler_error_stops_delivery() {
        let bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let _f = bus.subscribe(Rc::new(Failing));
        let _a = bus.subscribe(Rc::new(Recorder {
            label: "a",
            log: Rc::clone(&log),
        }));

        let err = bus.publish(&deleted_task()).unwrap_err();

        assert!(matches!(err, CacheError::EntryNotFound { .. }));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_subscription_outliving_bus_is_harmless() {
        let bus = EventBus::new();
        let sub = bus.subscribe(Rc::new(Failing));
        drop(bus);
        sub.cancel();
    }
}
