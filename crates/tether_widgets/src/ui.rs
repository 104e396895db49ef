//! Shared widget context

use std::rc::Rc;

use crate::config::WidgetConfig;
use crate::error::Result;
use crate::host::{Host, NativeHandle};
use crate::kind::WidgetKind;
use crate::message::NativeMessage;
use crate::registry::WindowRegistry;
use crate::widget::Widget;

/// Host and window registry shared by every widget of one application
///
/// Cheap to clone. The registry is the explicit replacement for a global
/// handle-to-widget table: whatever drives the message loop holds a `Ui` and
/// calls [`Ui::dispatch`].
#[derive(Clone)]
pub struct Ui {
    host: Rc<dyn Host>,
    registry: Rc<WindowRegistry>,
}

impl Ui {
    /// Create a context over a host with an empty registry
    pub fn new(host: Rc<dyn Host>) -> Self {
        tracing::debug!(host = host.name(), "ui context created");
        Self {
            host,
            registry: Rc::new(WindowRegistry::new()),
        }
    }

    /// Get the native host
    pub fn host(&self) -> &dyn Host {
        self.host.as_ref()
    }

    /// Get the window registry
    pub fn registry(&self) -> &WindowRegistry {
        &self.registry
    }

    /// Create a top-level widget
    pub fn create(&self, kind: WidgetKind, config: WidgetConfig) -> Result<Widget> {
        Widget::create(self, None, kind, config)
    }

    /// Route a native message to the container registered under `handle`
    ///
    /// Returns `true` when the widget layer fully handled the message.
    pub fn dispatch(&self, handle: NativeHandle, message: &NativeMessage) -> bool {
        self.registry.dispatch(handle, message)
    }
}
