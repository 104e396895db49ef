//! Tether Widgets
//!
//! A parent-owns-children widget tree built on the ownership-safe events of
//! `tether_core`.
//!
//! # Architecture
//!
//! - [`Widget`] - one node of the tree, tagged with a [`WidgetKind`]; an
//!   event owner that also carries `on_click`/`on_close`/`on_resize` channels
//! - [`Host`] - the native windowing collaborator (create/destroy/quit)
//! - [`WindowRegistry`] - explicit native-handle → container lookup used to
//!   dispatch native messages
//! - [`Ui`] - host + registry shared by all widgets of one application
//!
//! Destroying a widget fires its destroy hooks, destroys every descendant,
//! detaches it from its parent and releases the native window. Any
//! subscription tied to a destroyed widget disappears from the channel it was
//! registered on, whichever widget that channel belongs to.
//!
//! # Example
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use tether_widgets::prelude::*;
//!
//! let host = Rc::new(HeadlessHost::new());
//! let ui = Ui::new(host.clone());
//!
//! let window = ui.create(WidgetKind::Window { main: true }, WidgetConfig::new("Demo").size(800, 450))?;
//! let panel = window.create_child(WidgetKind::Panel, WidgetConfig::untitled())?;
//! let button = window.create_child(WidgetKind::Button, WidgetConfig::new("Hello"))?;
//!
//! // The panel listens to the button; the subscription lives as long as the panel.
//! let clicks = Rc::new(Cell::new(0));
//! let clicks_clone = clicks.clone();
//! button.on_click().add_owned_event(move |_| clicks_clone.set(clicks_clone.get() + 1), &panel);
//!
//! let press = NativeMessage::Command { child: button.child_id().unwrap() };
//! ui.dispatch(window.handle(), &press);
//!
//! panel.destroy();
//! ui.dispatch(window.handle(), &press);
//!
//! assert_eq!(clicks.get(), 1);
//! assert!(button.on_click().is_empty());
//! # Ok::<(), WidgetError>(())
//! ```

mod config;
mod error;
mod host;
mod kind;
mod message;
mod registry;
mod ui;
mod widget;

// Re-export all public types
pub use config::{Point, Size, WidgetConfig};
pub use error::{Result, WidgetError};
pub use host::{CreateParams, HeadlessHost, Host, NativeHandle};
pub use kind::{WidgetKind, WindowStyle, BASE_WINDOW_CLASS};
pub use message::NativeMessage;
pub use registry::WindowRegistry;
pub use ui::Ui;
pub use widget::{ChildId, WeakWidget, Widget, WidgetState};

pub use tether_core::{AsEventOwner, EventHandler, EventId, EventOwner};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{Point, Size, WidgetConfig};
    pub use crate::error::{Result, WidgetError};
    pub use crate::host::{HeadlessHost, Host, NativeHandle};
    pub use crate::kind::WidgetKind;
    pub use crate::message::NativeMessage;
    pub use crate::ui::Ui;
    pub use crate::widget::{ChildId, WeakWidget, Widget, WidgetState};
    pub use tether_core::{AsEventOwner, EventHandler, EventId, EventOwner};
}
