//! Widget ownership tree
//!
//! A [`Widget`] is a cheap, clonable handle to one node of the tree. A parent
//! owns its children (strong references, keyed by [`ChildId`]); a child keeps
//! only a weak back-reference used to detach itself.
//!
//! Every widget is also an [`EventOwner`]: subscriptions tied to a widget go
//! away as soon as the widget starts tearing down.
//!
//! # Lifecycle
//!
//! ```text
//! Constructed ──▶ Live ──▶ Destroying ──▶ Destroyed
//!
//! destroy():
//!     owner hooks fire, registry entry erased
//!     ↓ children destroyed one by one (depth-first)
//!     ↓ detached from parent
//!     ↓ channels cleared, native window released
//! ```
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use tether_widgets::prelude::*;
//!
//! let host = Rc::new(HeadlessHost::new());
//! let ui = Ui::new(host.clone());
//!
//! let window = ui.create(WidgetKind::Window { main: true }, WidgetConfig::new("Demo"))?;
//! let button = window.create_child(WidgetKind::Button, WidgetConfig::new("OK"))?;
//! assert_eq!(window.child_count(), 1);
//!
//! window.destroy();
//! assert_eq!(button.state(), WidgetState::Destroyed);
//! assert_eq!(host.live_count(), 0);
//! # Ok::<(), WidgetError>(())
//! ```

use indexmap::IndexMap;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tether_core::{AsEventOwner, EventHandler, EventOwner};

use crate::config::{Size, WidgetConfig};
use crate::error::{Result, WidgetError};
use crate::host::NativeHandle;
use crate::kind::WidgetKind;
use crate::message::NativeMessage;
use crate::ui::Ui;

/// Identifier of a child within its parent
///
/// Minted by the parent from a strictly increasing counter starting at 1;
/// never reused for the parent's lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChildId(u64);

impl ChildId {
    /// Create from a raw value
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Convert to the raw value
    pub fn to_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ChildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a widget
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WidgetState {
    /// Native resource created, not yet attached
    ///
    /// Only held inside [`Widget::create`], which returns the widget already
    /// `Live`; callers never observe it.
    Constructed,
    /// Attached and usable
    Live,
    /// Teardown in progress
    Destroying,
    /// Terminal
    Destroyed,
}

struct WidgetInner {
    kind: WidgetKind,
    ui: Ui,
    handle: NativeHandle,
    child_id: Option<ChildId>,
    parent: Weak<WidgetInner>,
    children: RefCell<IndexMap<ChildId, Widget>>,
    last_child_id: Cell<u64>,
    state: Cell<WidgetState>,
    owner: EventOwner,
    on_click: EventHandler<()>,
    on_close: EventHandler<()>,
    on_resize: EventHandler<Size>,
}

impl WidgetInner {
    fn next_child_id(&self) -> ChildId {
        let raw = self.last_child_id.get() + 1;
        self.last_child_id.set(raw);
        ChildId(raw)
    }

    /// Enter `Destroying`; returns false if teardown already started
    fn begin_destroy(&self) -> bool {
        match self.state.get() {
            WidgetState::Destroying | WidgetState::Destroyed => false,
            WidgetState::Constructed | WidgetState::Live => {
                self.state.set(WidgetState::Destroying);
                tracing::debug!(
                    handle = %self.handle,
                    kind = ?self.kind,
                    children = self.children.borrow().len(),
                    "destroying widget"
                );
                if self.kind.is_container() {
                    self.ui.registry().remove(self.handle);
                }
                self.owner.begin_destroy();
                true
            }
        }
    }

    fn destroy_children(&self) {
        loop {
            let next = self
                .children
                .borrow()
                .first()
                .map(|(id, child)| (*id, child.clone()));
            let Some((id, child)) = next else {
                break;
            };

            child.destroy();

            // A child already tearing down when we reached it (its hook
            // destroyed us) still holds its subtree. Finish that subtree
            // before we release, then drop the child so the loop progresses.
            child.inner.destroy_children();
            let stale = self.children.borrow_mut().shift_remove(&id);
            drop(stale);
        }
    }

    fn detach_from_parent(&self) {
        let (Some(parent), Some(id)) = (self.parent.upgrade(), self.child_id) else {
            return;
        };
        let removed = parent.children.borrow_mut().shift_remove(&id);
        drop(removed);
    }

    fn release(&self) {
        self.on_click.clear();
        self.on_close.clear();
        self.on_resize.clear();
        self.ui.host().destroy_window(self.handle);
        self.state.set(WidgetState::Destroyed);
        tracing::debug!(handle = %self.handle, "widget destroyed");
    }
}

impl Drop for WidgetInner {
    fn drop(&mut self) {
        // An unreferenced widget is never in a live parent's child map, so
        // there is nothing to detach from.
        if self.begin_destroy() {
            self.destroy_children();
            self.release();
        }
    }
}

/// Handle to a node of the widget tree
#[derive(Clone)]
pub struct Widget {
    inner: Rc<WidgetInner>,
}

impl Widget {
    /// Create a widget, optionally as a child of `parent`
    ///
    /// The parent mints the child's id before the native window is created,
    /// so a failed creation still consumes an id.
    pub fn create(
        ui: &Ui,
        parent: Option<&Widget>,
        kind: WidgetKind,
        config: WidgetConfig,
    ) -> Result<Widget> {
        let link = match parent {
            Some(parent) => {
                if parent.state() != WidgetState::Live {
                    tracing::warn!(
                        parent = %parent.handle(),
                        state = ?parent.state(),
                        "refusing to create a child under a dead widget"
                    );
                    return Err(WidgetError::ParentDestroyed);
                }
                Some((parent.handle(), parent.inner.next_child_id()))
            }
            None => None,
        };

        let params = kind.creation_params(&config, link);
        let handle = ui.host().create_window(&params).map_err(|err| {
            tracing::debug!(kind = ?kind, error = %err, "native window creation failed");
            err
        })?;

        let widget = Widget {
            inner: Rc::new(WidgetInner {
                kind,
                ui: ui.clone(),
                handle,
                child_id: link.map(|(_, id)| id),
                parent: parent.map_or_else(Weak::new, |p| Rc::downgrade(&p.inner)),
                children: RefCell::new(IndexMap::new()),
                last_child_id: Cell::new(0),
                state: Cell::new(WidgetState::Constructed),
                owner: EventOwner::new(),
                on_click: EventHandler::new(),
                on_close: EventHandler::new(),
                on_resize: EventHandler::new(),
            }),
        };

        if let (Some(parent), Some((_, id))) = (parent, link) {
            parent
                .inner
                .children
                .borrow_mut()
                .insert(id, widget.clone());
        }
        if kind.is_container() {
            ui.registry().insert(handle, &widget);
        }

        widget.inner.state.set(WidgetState::Live);
        tracing::debug!(handle = %handle, kind = ?kind, child_id = ?widget.child_id(), "widget created");
        Ok(widget)
    }

    /// Create a widget as a child of this one
    pub fn create_child(&self, kind: WidgetKind, config: WidgetConfig) -> Result<Widget> {
        Widget::create(&self.inner.ui, Some(self), kind, config)
    }

    /// Destroy this widget and its whole subtree
    ///
    /// Order: own destroy hooks, then every descendant (a grandchild before
    /// its parent), then detach from the parent, then native release.
    /// Calling it again, or on a widget already tearing down, does nothing.
    pub fn destroy(&self) {
        if !self.inner.begin_destroy() {
            return;
        }
        self.inner.destroy_children();
        self.inner.detach_from_parent();
        self.inner.release();
    }

    /// Handle a native message for this widget's kind
    ///
    /// Containers fire `on_close`/`on_resize` and route commands to the
    /// addressed child; buttons fire `on_click`. Returns `true` when the
    /// message was fully handled.
    pub fn handle_message(&self, message: &NativeMessage) -> bool {
        if !self.is_live() {
            return false;
        }

        let kind = self.inner.kind;
        match message {
            NativeMessage::Command { .. } if kind == WidgetKind::Button => {
                self.inner.on_click.activate(&());
                true
            }
            NativeMessage::Command { child } if kind.is_container() => {
                match self.find_child(*child) {
                    Some(child) => child.handle_message(message),
                    None => {
                        tracing::trace!(handle = %self.inner.handle, child = %child, "command for unknown child");
                        false
                    }
                }
            }
            NativeMessage::Close if kind.is_container() => {
                self.inner.on_close.activate(&());
                if matches!(kind, WidgetKind::Window { main: true }) {
                    self.inner.ui.host().post_quit(0);
                    return true;
                }
                false
            }
            NativeMessage::Resize(size) if kind.is_container() => {
                self.inner.on_resize.activate(size);
                false
            }
            _ => false,
        }
    }

    pub fn kind(&self) -> WidgetKind {
        self.inner.kind
    }

    pub fn handle(&self) -> NativeHandle {
        self.inner.handle
    }

    /// Id minted by the parent, `None` for top-level widgets
    pub fn child_id(&self) -> Option<ChildId> {
        self.inner.child_id
    }

    pub fn state(&self) -> WidgetState {
        self.inner.state.get()
    }

    pub fn is_live(&self) -> bool {
        self.state() == WidgetState::Live
    }

    /// Get the parent, if it is still alive
    pub fn parent(&self) -> Option<Widget> {
        self.inner.parent.upgrade().map(|inner| Widget { inner })
    }

    /// Get the children in creation order
    pub fn children(&self) -> Vec<Widget> {
        self.inner.children.borrow().values().cloned().collect()
    }

    pub fn child_count(&self) -> usize {
        self.inner.children.borrow().len()
    }

    /// Look up a child by the id this widget minted for it
    pub fn find_child(&self, id: ChildId) -> Option<Widget> {
        self.inner.children.borrow().get(&id).cloned()
    }

    /// Fired when a button is pressed
    pub fn on_click(&self) -> &EventHandler<()> {
        &self.inner.on_click
    }

    /// Fired when a container is asked to close
    pub fn on_close(&self) -> &EventHandler<()> {
        &self.inner.on_close
    }

    /// Fired when a container's client area changes size
    pub fn on_resize(&self) -> &EventHandler<Size> {
        &self.inner.on_resize
    }

    pub fn ui(&self) -> &Ui {
        &self.inner.ui
    }

    /// Create a non-owning handle
    ///
    /// Callbacks stored on a widget's own channels should capture a
    /// `WeakWidget`; a strong handle would keep the widget alive forever.
    pub fn downgrade(&self) -> WeakWidget {
        WeakWidget {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Whether both handles refer to the same widget
    pub fn ptr_eq(&self, other: &Widget) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl AsEventOwner for Widget {
    fn event_owner(&self) -> &EventOwner {
        &self.inner.owner
    }
}

impl fmt::Debug for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Widget")
            .field("kind", &self.inner.kind)
            .field("handle", &self.inner.handle)
            .field("child_id", &self.inner.child_id)
            .field("state", &self.inner.state.get())
            .field("children", &self.inner.children.borrow().len())
            .finish()
    }
}

/// Non-owning widget handle
#[derive(Clone)]
pub struct WeakWidget {
    inner: Weak<WidgetInner>,
}

impl WeakWidget {
    pub fn upgrade(&self) -> Option<Widget> {
        self.inner.upgrade().map(|inner| Widget { inner })
    }
}

impl fmt::Debug for WeakWidget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakWidget")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HeadlessHost;

    fn setup() -> (Rc<HeadlessHost>, Ui) {
        let host = Rc::new(HeadlessHost::new());
        let ui = Ui::new(host.clone());
        (host, ui)
    }

    #[test]
    fn test_child_ids_start_at_one() {
        let (_host, ui) = setup();
        let window = ui.create(WidgetKind::Window { main: false }, WidgetConfig::default()).unwrap();
        let a = window.create_child(WidgetKind::Label, WidgetConfig::new("a")).unwrap();
        let b = window.create_child(WidgetKind::Label, WidgetConfig::new("b")).unwrap();

        assert_eq!(window.child_id(), None);
        assert_eq!(a.child_id(), Some(ChildId::from_raw(1)));
        assert_eq!(b.child_id(), Some(ChildId::from_raw(2)));
        assert!(a.parent().unwrap().ptr_eq(&window));
        assert!(window.find_child(ChildId::from_raw(2)).unwrap().ptr_eq(&b));
    }

    #[test]
    fn test_child_ids_never_reused() {
        let (_host, ui) = setup();
        let panel = ui.create(WidgetKind::Panel, WidgetConfig::default()).unwrap();

        let mut seen = Vec::new();
        for _ in 0..4 {
            let child = panel.create_child(WidgetKind::Button, WidgetConfig::default()).unwrap();
            seen.push(child.child_id().unwrap());
            child.destroy();
        }
        let next = panel.create_child(WidgetKind::Button, WidgetConfig::default()).unwrap();

        assert_eq!(panel.child_count(), 1);
        assert!(!seen.contains(&next.child_id().unwrap()));
    }

    #[test]
    fn test_failed_creation_consumes_id() {
        let (host, ui) = setup();
        let panel = ui.create(WidgetKind::Panel, WidgetConfig::default()).unwrap();

        host.fail_next_creations(1);
        let err = panel.create_child(WidgetKind::Edit, WidgetConfig::default()).unwrap_err();
        assert!(matches!(err, WidgetError::WindowCreation(_)));
        assert_eq!(panel.child_count(), 0);

        let edit = panel.create_child(WidgetKind::Edit, WidgetConfig::default()).unwrap();
        assert_eq!(edit.child_id(), Some(ChildId::from_raw(2)));
    }

    #[test]
    fn test_cannot_create_under_destroyed_parent() {
        let (host, ui) = setup();
        let panel = ui.create(WidgetKind::Panel, WidgetConfig::default()).unwrap();
        panel.destroy();

        let err = panel.create_child(WidgetKind::Label, WidgetConfig::default()).unwrap_err();
        assert_eq!(err, WidgetError::ParentDestroyed);
        assert_eq!(host.live_count(), 0);
    }

    #[test]
    fn test_destroy_detaches_from_parent() {
        let (host, ui) = setup();
        let window = ui.create(WidgetKind::Window { main: false }, WidgetConfig::default()).unwrap();
        let button = window.create_child(WidgetKind::Button, WidgetConfig::default()).unwrap();

        button.destroy();
        assert_eq!(button.state(), WidgetState::Destroyed);
        assert_eq!(window.child_count(), 0);
        assert!(!host.is_live(button.handle()));
        assert!(host.is_live(window.handle()));

        button.destroy();
        assert_eq!(host.destroyed(), vec![button.handle()]);
    }

    #[test]
    fn test_containers_are_registered() {
        let (_host, ui) = setup();
        let window = ui.create(WidgetKind::Window { main: false }, WidgetConfig::default()).unwrap();
        let group = window.create_child(WidgetKind::GroupBox, WidgetConfig::default()).unwrap();
        let label = window.create_child(WidgetKind::Label, WidgetConfig::default()).unwrap();

        assert!(ui.registry().contains(window.handle()));
        assert!(ui.registry().contains(group.handle()));
        assert!(!ui.registry().contains(label.handle()));

        window.destroy();
        assert!(ui.registry().is_empty());
    }

    #[test]
    fn test_dropping_last_handle_tears_down() {
        let (host, ui) = setup();
        let window = ui.create(WidgetKind::Window { main: false }, WidgetConfig::default()).unwrap();
        let child = window.create_child(WidgetKind::Panel, WidgetConfig::default()).unwrap();
        let grandchild = child.create_child(WidgetKind::Memo, WidgetConfig::default()).unwrap();
        let grandchild_handle = grandchild.handle();
        drop(child);
        drop(grandchild);

        drop(window);
        assert_eq!(host.live_count(), 0);
        assert!(ui.registry().is_empty());
        assert_eq!(host.destroyed().first(), Some(&grandchild_handle));
    }

    #[test]
    fn test_button_command_fires_click() {
        let (_host, ui) = setup();
        let window = ui.create(WidgetKind::Window { main: false }, WidgetConfig::default()).unwrap();
        let button = window.create_child(WidgetKind::Button, WidgetConfig::default()).unwrap();
        let clicks = Rc::new(Cell::new(0));
        let clicks_clone = clicks.clone();
        button.on_click().add_event(move |_| clicks_clone.set(clicks_clone.get() + 1));

        let command = NativeMessage::Command {
            child: button.child_id().unwrap(),
        };
        assert!(ui.dispatch(window.handle(), &command));
        assert_eq!(clicks.get(), 1);

        let unknown = NativeMessage::Command {
            child: ChildId::from_raw(99),
        };
        assert!(!ui.dispatch(window.handle(), &unknown));
        assert_eq!(clicks.get(), 1);
    }

    #[test]
    fn test_main_window_close_requests_quit() {
        let (host, ui) = setup();
        let main = ui.create(WidgetKind::Window { main: true }, WidgetConfig::default()).unwrap();
        let secondary = ui.create(WidgetKind::Window { main: false }, WidgetConfig::default()).unwrap();

        assert!(!ui.dispatch(secondary.handle(), &NativeMessage::Close));
        assert_eq!(host.quit_code(), None);

        assert!(ui.dispatch(main.handle(), &NativeMessage::Close));
        assert_eq!(host.quit_code(), Some(0));
    }

    #[test]
    fn test_resize_payload() {
        let (_host, ui) = setup();
        let window = ui.create(WidgetKind::Window { main: false }, WidgetConfig::default()).unwrap();
        let seen = Rc::new(Cell::new(Size::default()));
        let seen_clone = seen.clone();
        window.on_resize().add_event(move |size| seen_clone.set(*size));

        ui.dispatch(window.handle(), &NativeMessage::Resize(Size::new(320, 240)));
        assert_eq!(seen.get(), Size::new(320, 240));
    }

    #[test]
    fn test_non_container_ignores_close() {
        let (_host, ui) = setup();
        let label = ui.create(WidgetKind::Label, WidgetConfig::default()).unwrap();
        assert!(!label.handle_message(&NativeMessage::Close));
        assert!(!ui.dispatch(label.handle(), &NativeMessage::Close));
    }
}
