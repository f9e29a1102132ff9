//! Observable field variables and subscription tracking
//!
//! Every keyed field owns a `LiveVar`. Dependent UI pieces (tooltips, mostly)
//! subscribe to write events instead of polling. All subscriptions made while
//! a dialog is rendered go through one `TraceRegistry`, which removes them as
//! a batch at teardown.
//!
//! # Teardown discipline
//! - Subscriptions are removed before the variables and elements they point
//!   at are discarded, so no callback fires against a dead element.
//! - A failure to remove one subscription is logged and the batch continues.

use crate::spec::FieldValue;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

/// Identifier of one subscription on one variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TraceError {
    /// The subscription was already removed (or never existed)
    #[error("Subscription {id} is not registered on variable '{var}'")]
    UnknownSubscription { var: String, id: SubscriptionId },
}

type WriteCallback = Rc<dyn Fn(&FieldValue)>;

struct VarInner {
    name: String,
    value: FieldValue,
    next_id: u64,
    subscribers: Vec<(SubscriptionId, WriteCallback)>,
}

/// Shared, observable value of one keyed field.
///
/// Clones are handles to the same variable.
#[derive(Clone)]
pub struct LiveVar {
    inner: Rc<RefCell<VarInner>>,
}

impl LiveVar {
    pub fn new(name: impl Into<String>, value: FieldValue) -> Self {
        Self {
            inner: Rc::new(RefCell::new(VarInner {
                name: name.into(),
                value,
                next_id: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    pub fn name(&self) -> String {
        self.inner.borrow().name.clone()
    }

    pub fn get(&self) -> FieldValue {
        self.inner.borrow().value.clone()
    }

    /// Text content, or empty for non-text values
    pub fn text(&self) -> String {
        match &self.inner.borrow().value {
            FieldValue::Text(s) => s.clone(),
            _ => String::new(),
        }
    }

    /// Overwrite the value and notify every subscriber.
    ///
    /// Callbacks run after the internal borrow is released, so a subscriber
    /// may read the variable.
    pub fn set(&self, value: FieldValue) {
        let callbacks: Vec<WriteCallback> = {
            let mut inner = self.inner.borrow_mut();
            inner.value = value.clone();
            inner.subscribers.iter().map(|(_, cb)| Rc::clone(cb)).collect()
        };
        for callback in callbacks {
            callback(&value);
        }
    }

    /// Register a write callback
    pub fn subscribe(&self, callback: impl Fn(&FieldValue) + 'static) -> SubscriptionId {
        let mut inner = self.inner.borrow_mut();
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        inner.subscribers.push((id, Rc::new(callback)));
        id
    }

    /// Remove a write callback
    pub fn unsubscribe(&self, id: SubscriptionId) -> Result<(), TraceError> {
        let mut inner = self.inner.borrow_mut();
        let before = inner.subscribers.len();
        inner.subscribers.retain(|(sid, _)| *sid != id);
        if inner.subscribers.len() == before {
            return Err(TraceError::UnknownSubscription {
                var: inner.name.clone(),
                id,
            });
        }
        Ok(())
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }
}

impl fmt::Debug for LiveVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("LiveVar")
            .field("name", &inner.name)
            .field("value", &inner.value)
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

/// One tracked subscription
#[derive(Debug, Clone)]
struct TrackedSubscription {
    var: LiveVar,
    id: SubscriptionId,
}

/// Registry of every subscription created during a render pass
#[derive(Debug, Default)]
pub struct TraceRegistry {
    entries: Vec<TrackedSubscription>,
}

impl TraceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to `var` and track the subscription for teardown
    pub fn trace(&mut self, var: &LiveVar, callback: impl Fn(&FieldValue) + 'static) -> SubscriptionId {
        let id = var.subscribe(callback);
        tracing::trace!(var = %var.name(), %id, "Registered variable trace");
        self.entries.push(TrackedSubscription {
            var: var.clone(),
            id,
        });
        id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every tracked subscription.
    ///
    /// Failures are logged and skipped. Returns the number of failures.
    pub fn release_all(&mut self) -> usize {
        if self.entries.is_empty() {
            return 0;
        }

        tracing::debug!("Removing {} variable trace(s)", self.entries.len());
        let mut failures = 0;
        for entry in self.entries.drain(..) {
            if let Err(e) = entry.var.unsubscribe(entry.id) {
                tracing::warn!("Failed to remove trace: {}", e);
                failures += 1;
            }
        }
        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_set_notifies_subscribers() {
        let var = LiveVar::new("name", FieldValue::from("a"));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        var.subscribe(move |v| sink.borrow_mut().push(v.display_text()));

        var.set(FieldValue::from("b"));
        var.set(FieldValue::from("c"));
        assert_eq!(*seen.borrow(), vec!["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_subscriber_may_read_variable() {
        let var = LiveVar::new("name", FieldValue::Absent);
        let reader = var.clone();
        let observed = Rc::new(RefCell::new(String::new()));
        let sink = Rc::clone(&observed);
        var.subscribe(move |_| *sink.borrow_mut() = reader.text());

        var.set(FieldValue::from("live"));
        assert_eq!(*observed.borrow(), "live");
    }

    #[test]
    fn test_unsubscribe_unknown_is_error() {
        let var = LiveVar::new("name", FieldValue::Absent);
        let id = var.subscribe(|_| {});
        assert!(var.unsubscribe(id).is_ok());
        assert!(matches!(
            var.unsubscribe(id),
            Err(TraceError::UnknownSubscription { .. })
        ));
    }

    #[test]
    fn test_release_all_continues_after_failure() {
        let a = LiveVar::new("a", FieldValue::Absent);
        let b = LiveVar::new("b", FieldValue::Absent);
        let calls = Rc::new(Cell::new(0));

        let mut registry = TraceRegistry::new();
        let c1 = Rc::clone(&calls);
        let first = registry.trace(&a, move |_| c1.set(c1.get() + 1));
        let c2 = Rc::clone(&calls);
        registry.trace(&b, move |_| c2.set(c2.get() + 1));

        // Remove one behind the registry's back
        a.unsubscribe(first).expect("first unsubscribe");

        assert_eq!(registry.release_all(), 1);
        assert!(registry.is_empty());
        assert_eq!(b.subscriber_count(), 0);

        b.set(FieldValue::from("x"));
        assert_eq!(calls.get(), 0);
    }
}
