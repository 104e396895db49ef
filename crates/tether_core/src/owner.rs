//! Destruction hooks for objects with a bounded lifetime
//!
//! An [`EventOwner`] is embedded in anything whose destruction must notify
//! dependents: widgets, controllers, or plain test fixtures. External parties
//! install zero-argument hooks with [`EventOwner::add_destroy_hook`]; all of
//! them run exactly once when the owner begins tearing down.
//!
//! # Teardown sweep
//!
//! ```text
//! begin_destroy()
//!     ↓ destroying = true (never reset)
//!     ↓ hook table drained into a snapshot
//!     ↓ every hook in the snapshot runs once, in registration order
//! owner's own resources released
//! ```
//!
//! Because the table is drained before any hook runs, a hook that removes
//! another hook of the same owner finds nothing to remove, and every hook in
//! the snapshot still runs.
//!
//! # Example
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use tether_core::owner::EventOwner;
//!
//! let fired = Rc::new(Cell::new(0));
//! let owner = EventOwner::new();
//!
//! let fired_clone = fired.clone();
//! owner.add_destroy_hook(move || fired_clone.set(fired_clone.get() + 1));
//!
//! drop(owner);
//! assert_eq!(fired.get(), 1);
//! ```

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// Handle identifying a destruction hook or an event subscription
///
/// Handles are minted from a monotonically increasing counter owned by the
/// issuing registry or channel. They are only meaningful to their issuer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(u64);

impl EventId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Convert to raw u64 for logging or storage
    pub fn to_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A destruction hook (runs at most once)
pub type DestroyHook = Box<dyn FnOnce()>;

/// Shared hook table behind an [`EventOwner`]
///
/// Event channels keep a `Weak` reference to this so they can detach their
/// hooks without extending the owner's lifetime.
pub(crate) struct OwnerState {
    hooks: RefCell<FxHashMap<EventId, DestroyHook>>,
    last_hook: Cell<u64>,
    destroying: Cell<bool>,
}

impl OwnerState {
    fn new() -> Self {
        Self {
            hooks: RefCell::new(FxHashMap::default()),
            last_hook: Cell::new(0),
            destroying: Cell::new(false),
        }
    }

    pub(crate) fn add_hook(&self, hook: DestroyHook) -> EventId {
        let id = EventId::new(self.last_hook.get());
        self.last_hook.set(self.last_hook.get() + 1);

        if self.destroying.get() {
            // The sweep already took its snapshot; this hook can never run.
            tracing::debug!(hook = %id, "destroy hook added during teardown, dropping it");
            drop(hook);
            return id;
        }

        self.hooks.borrow_mut().insert(id, hook);
        tracing::trace!(hook = %id, "destroy hook added");
        id
    }

    pub(crate) fn remove_hook(&self, id: EventId) {
        if self.destroying.get() {
            return;
        }
        let removed = self.hooks.borrow_mut().remove(&id);
        if removed.is_some() {
            tracing::trace!(hook = %id, "destroy hook removed");
        }
    }

    pub(crate) fn is_destroying(&self) -> bool {
        self.destroying.get()
    }

    fn hook_count(&self) -> usize {
        self.hooks.borrow().len()
    }

    fn begin_destroy(&self) {
        if self.destroying.replace(true) {
            return;
        }

        let mut hooks: SmallVec<[(EventId, DestroyHook); 8]> =
            self.hooks.borrow_mut().drain().collect();
        hooks.sort_unstable_by_key(|(id, _)| *id);

        tracing::trace!(count = hooks.len(), "running destroy hooks");
        for (_, hook) in hooks {
            hook();
        }
    }
}

/// Registry of destruction hooks for one owning object
///
/// The owner fires its hooks either when [`begin_destroy`](Self::begin_destroy)
/// is called by the embedding object's teardown logic, or when the owner is
/// dropped, whichever comes first.
pub struct EventOwner {
    state: Rc<OwnerState>,
}

impl EventOwner {
    /// Create an owner with an empty hook table
    pub fn new() -> Self {
        Self {
            state: Rc::new(OwnerState::new()),
        }
    }

    /// Register a hook to run once at the start of this owner's destruction
    ///
    /// Returns a handle valid for this owner only. Adding a hook while the
    /// owner is already tearing down drops the hook without running it.
    pub fn add_destroy_hook<F>(&self, hook: F) -> EventId
    where
        F: FnOnce() + 'static,
    {
        self.state.add_hook(Box::new(hook))
    }

    /// Remove a previously added hook
    ///
    /// Unknown handles are ignored, as is any removal once teardown has
    /// started. Safe to call from inside another hook.
    pub fn remove_destroy_hook(&self, id: EventId) {
        self.state.remove_hook(id);
    }

    /// Start destruction: set the destroying flag and run every hook once
    ///
    /// Idempotent; only the first call runs hooks.
    pub fn begin_destroy(&self) {
        self.state.begin_destroy();
    }

    /// Whether teardown has started
    pub fn is_destroying(&self) -> bool {
        self.state.is_destroying()
    }

    /// Number of hooks still waiting to run
    pub fn hook_count(&self) -> usize {
        self.state.hook_count()
    }

    pub(crate) fn downgrade(&self) -> Weak<OwnerState> {
        Rc::downgrade(&self.state)
    }
}

impl Default for EventOwner {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for EventOwner {
    fn drop(&mut self) {
        self.state.begin_destroy();
    }
}

impl fmt::Debug for EventOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventOwner")
            .field("hooks", &self.state.hook_count())
            .field("destroying", &self.state.is_destroying())
            .finish()
    }
}

/// Anything that embeds an [`EventOwner`]
///
/// Event channels accept any `AsEventOwner` when tying a subscription to an
/// owner's lifetime.
pub trait AsEventOwner {
    fn event_owner(&self) -> &EventOwner;
}

impl AsEventOwner for EventOwner {
    fn event_owner(&self) -> &EventOwner {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter() -> (Rc<Cell<u32>>, impl FnOnce() + 'static) {
        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();
        (count, move || count_clone.set(count_clone.get() + 1))
    }

    #[test]
    fn test_hooks_fire_once_on_drop() {
        let owner = EventOwner::new();
        let (a, hook_a) = counter();
        let (b, hook_b) = counter();
        owner.add_destroy_hook(hook_a);
        owner.add_destroy_hook(hook_b);
        assert_eq!(owner.hook_count(), 2);

        drop(owner);
        assert_eq!(a.get(), 1);
        assert_eq!(b.get(), 1);
    }

    #[test]
    fn test_begin_destroy_is_idempotent() {
        let owner = EventOwner::new();
        let (count, hook) = counter();
        owner.add_destroy_hook(hook);

        owner.begin_destroy();
        owner.begin_destroy();
        assert!(owner.is_destroying());
        assert_eq!(owner.hook_count(), 0);

        drop(owner);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_removed_hook_never_fires() {
        let owner = EventOwner::new();
        let (count, hook) = counter();
        let id = owner.add_destroy_hook(hook);

        owner.remove_destroy_hook(id);
        owner.remove_destroy_hook(id);
        assert_eq!(owner.hook_count(), 0);

        owner.begin_destroy();
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_handles_are_monotonic() {
        let owner = EventOwner::new();
        let first = owner.add_destroy_hook(|| {});
        owner.remove_destroy_hook(first);
        let second = owner.add_destroy_hook(|| {});

        assert_eq!(first.to_raw(), 0);
        assert!(second > first);
    }

    #[test]
    fn test_hook_removing_sibling_still_runs_both() {
        let owner = Rc::new(EventOwner::new());
        let (b_count, hook_b) = counter();

        let later = Rc::new(Cell::new(None::<EventId>));
        let owner_weak = Rc::downgrade(&owner);
        let later_clone = later.clone();
        let (a_count, bump_a) = counter();
        owner.add_destroy_hook(move || {
            bump_a();
            if let (Some(owner), Some(id)) = (owner_weak.upgrade(), later_clone.get()) {
                owner.remove_destroy_hook(id);
            }
        });
        later.set(Some(owner.add_destroy_hook(hook_b)));

        owner.begin_destroy();
        assert_eq!(a_count.get(), 1);
        assert_eq!(b_count.get(), 1);
    }

    #[test]
    fn test_hook_added_during_teardown_is_dropped() {
        let owner = Rc::new(EventOwner::new());
        let (late_count, late_hook) = counter();

        let owner_weak = Rc::downgrade(&owner);
        let late_hook = RefCell::new(Some(late_hook));
        owner.add_destroy_hook(move || {
            if let (Some(owner), Some(hook)) = (owner_weak.upgrade(), late_hook.take()) {
                owner.add_destroy_hook(hook);
            }
        });

        owner.begin_destroy();
        assert_eq!(owner.hook_count(), 0);
        assert_eq!(late_count.get(), 0);
    }

    #[test]
    fn test_hooks_run_in_registration_order() {
        let owner = EventOwner::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for n in 0..5 {
            let order = order.clone();
            owner.add_destroy_hook(move || order.borrow_mut().push(n));
        }

        owner.begin_destroy();
        assert_eq!(*order.borrow(), vec![0, 1, 2, 3, 4]);
    }
}
