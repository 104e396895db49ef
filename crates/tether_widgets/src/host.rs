//! Native host abstraction
//!
//! The host owns the real windowing resources. Widgets only ask it to create
//! and destroy native windows and to request application quit; everything
//! else about native controls lives behind this trait.

use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;

use crate::config::{Point, Size};
use crate::error::{Result, WidgetError};
use crate::kind::{WidgetKind, WindowStyle};
use crate::ChildId;

/// Opaque native window handle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeHandle(u64);

impl NativeHandle {
    /// Create from a raw host value
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Convert to the raw host value
    pub fn to_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Everything the host needs to create one native window
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateParams {
    pub kind: WidgetKind,
    pub class_name: &'static str,
    pub title: String,
    pub position: Point,
    pub size: Size,
    pub style: WindowStyle,
    /// Route the control's messages through the widget layer as well
    pub subclass: bool,
    pub parent: Option<NativeHandle>,
    pub child_id: Option<ChildId>,
}

/// Native windowing host
///
/// Implemented by platform backends and by [`HeadlessHost`].
pub trait Host {
    /// Create a native window
    ///
    /// Failure is reported as [`WidgetError::WindowCreation`] and is never
    /// retried by the widget layer.
    fn create_window(&self, params: &CreateParams) -> Result<NativeHandle>;

    /// Release a native window
    fn destroy_window(&self, handle: NativeHandle);

    /// Ask the message loop to stop with the given exit code
    fn post_quit(&self, exit_code: i32);

    /// Get the host name
    fn name(&self) -> &'static str;
}

#[derive(Default)]
struct HeadlessState {
    last_handle: u64,
    live: IndexMap<NativeHandle, CreateParams>,
    destroyed: Vec<NativeHandle>,
    failures_pending: usize,
    quit_code: Option<i32>,
}

/// In-memory host that records every call
///
/// Used by tests and the demo runner. Handles start at 1 and are never
/// reused; destroyed handles are remembered in destruction order.
#[derive(Default)]
pub struct HeadlessHost {
    state: RefCell<HeadlessState>,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` creation attempts fail
    pub fn fail_next_creations(&self, count: usize) {
        self.state.borrow_mut().failures_pending = count;
    }

    /// Number of native windows currently alive
    pub fn live_count(&self) -> usize {
        self.state.borrow().live.len()
    }

    /// Whether `handle` refers to a live native window
    pub fn is_live(&self, handle: NativeHandle) -> bool {
        self.state.borrow().live.contains_key(&handle)
    }

    /// Parameters a live window was created with
    pub fn params(&self, handle: NativeHandle) -> Option<CreateParams> {
        self.state.borrow().live.get(&handle).cloned()
    }

    /// Destroyed handles, oldest first
    pub fn destroyed(&self) -> Vec<NativeHandle> {
        self.state.borrow().destroyed.clone()
    }

    /// Exit code of the last quit request, if any
    pub fn quit_code(&self) -> Option<i32> {
        self.state.borrow().quit_code
    }
}

impl Host for HeadlessHost {
    fn create_window(&self, params: &CreateParams) -> Result<NativeHandle> {
        let mut state = self.state.borrow_mut();
        if state.failures_pending > 0 {
            state.failures_pending -= 1;
            return Err(WidgetError::WindowCreation(format!(
                "headless host refused class {}",
                params.class_name
            )));
        }

        state.last_handle += 1;
        let handle = NativeHandle::from_raw(state.last_handle);
        state.live.insert(handle, params.clone());
        Ok(handle)
    }

    fn destroy_window(&self, handle: NativeHandle) {
        let mut state = self.state.borrow_mut();
        if state.live.shift_remove(&handle).is_none() {
            tracing::warn!(handle = %handle, "destroying unknown native window");
            return;
        }
        state.destroyed.push(handle);
    }

    fn post_quit(&self, exit_code: i32) {
        self.state.borrow_mut().quit_code = Some(exit_code);
    }

    fn name(&self) -> &'static str {
        "headless"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WidgetConfig;

    fn params() -> CreateParams {
        WidgetKind::Panel.creation_params(&WidgetConfig::default(), None)
    }

    #[test]
    fn test_create_and_destroy() {
        let host = HeadlessHost::new();
        let a = host.create_window(&params()).unwrap();
        let b = host.create_window(&params()).unwrap();
        assert_ne!(a, b);
        assert_eq!(host.live_count(), 2);

        host.destroy_window(a);
        assert!(!host.is_live(a));
        assert!(host.is_live(b));
        assert_eq!(host.destroyed(), vec![a]);
    }

    #[test]
    fn test_simulated_failure() {
        let host = HeadlessHost::new();
        host.fail_next_creations(1);

        let err = host.create_window(&params()).unwrap_err();
        assert!(matches!(err, WidgetError::WindowCreation(_)));
        assert!(err.to_string().starts_with("could not create window"));

        assert!(host.create_window(&params()).is_ok());
    }

    #[test]
    fn test_double_destroy_is_recorded_once() {
        let host = HeadlessHost::new();
        let handle = host.create_window(&params()).unwrap();
        host.destroy_window(handle);
        host.destroy_window(handle);
        assert_eq!(host.destroyed(), vec![handle]);
    }

    #[test]
    fn test_quit() {
        let host = HeadlessHost::new();
        assert_eq!(host.quit_code(), None);
        host.post_quit(0);
        assert_eq!(host.quit_code(), Some(0));
        assert_eq!(host.name(), "headless");
    }
}
