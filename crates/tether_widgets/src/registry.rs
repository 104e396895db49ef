//! Native handle → widget registry
//!
//! Populated when a container widget is constructed and erased when it
//! begins destruction. Entries are weak: the registry never keeps a widget
//! alive.

use rustc_hash::FxHashMap;
use std::cell::RefCell;

use crate::host::NativeHandle;
use crate::message::NativeMessage;
use crate::widget::{WeakWidget, Widget};

/// Registry of container widgets, keyed by native handle
#[derive(Default)]
pub struct WindowRegistry {
    windows: RefCell<FxHashMap<NativeHandle, WeakWidget>>,
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&self, handle: NativeHandle, widget: &Widget) {
        let previous = self
            .windows
            .borrow_mut()
            .insert(handle, widget.downgrade());
        if previous.is_some() {
            tracing::warn!(handle = %handle, "native handle registered twice");
        }
    }

    pub(crate) fn remove(&self, handle: NativeHandle) {
        self.windows.borrow_mut().remove(&handle);
    }

    /// Look up the widget registered under `handle`
    pub fn get(&self, handle: NativeHandle) -> Option<Widget> {
        self.windows
            .borrow()
            .get(&handle)
            .and_then(WeakWidget::upgrade)
    }

    /// Whether `handle` is registered
    pub fn contains(&self, handle: NativeHandle) -> bool {
        self.windows.borrow().contains_key(&handle)
    }

    /// Number of registered windows
    pub fn len(&self) -> usize {
        self.windows.borrow().len()
    }

    /// Check if no window is registered
    pub fn is_empty(&self) -> bool {
        self.windows.borrow().is_empty()
    }

    /// Route a message to the widget registered under `handle`
    ///
    /// The registry borrow is released before the widget runs any callback,
    /// so callbacks may create or destroy widgets.
    pub fn dispatch(&self, handle: NativeHandle, message: &NativeMessage) -> bool {
        let Some(widget) = self.get(handle) else {
            tracing::trace!(handle = %handle, ?message, "no widget for native handle");
            return false;
        };
        widget.handle_message(message)
    }
}
