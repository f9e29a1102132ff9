//! Tooltip text attached to dialog elements
//!
//! A tooltip is either static (the field's help text) or follows a live
//! variable through a tracked write subscription.

use crate::trace::{LiveVar, SubscriptionId, TraceRegistry};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Default)]
pub struct Tooltip {
    text: Rc<RefCell<String>>,
}

impl Tooltip {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Rc::new(RefCell::new(text.into())),
        }
    }

    pub fn text(&self) -> String {
        self.text.borrow().clone()
    }

    pub fn set_text(&self, text: impl Into<String>) {
        *self.text.borrow_mut() = text.into();
    }

    pub fn is_empty(&self) -> bool {
        self.text.borrow().is_empty()
    }

    /// Mirror `var` into this tooltip. The subscription is tracked by
    /// `registry` and removed with the rest of the render pass.
    pub fn follow(&self, var: &LiveVar, registry: &mut TraceRegistry) -> SubscriptionId {
        self.set_text(var.get().display_text());
        let text = Rc::clone(&self.text);
        registry.trace(var, move |value| {
            *text.borrow_mut() = value.display_text();
        })
    }
}
