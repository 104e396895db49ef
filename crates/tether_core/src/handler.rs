//! Ownership-safe event channels
//!
//! An [`EventHandler<A>`] is a broadcast point for callbacks taking `&A`.
//! Each subscription may be tied to an [`EventOwner`]; the channel and the
//! owner then hold only handles into each other's tables:
//!
//! ```text
//! EventHandler ──(Weak owner, hook id)──▶ EventOwner
//!      ▲                                      │
//!      └──────(Weak channel, event id)────────┘  destroy hook
//! ```
//!
//! Whichever side goes first cleans up the other:
//!
//! - the owner begins destruction → its hook removes the subscription from
//!   the channel, skipping the owner-side removal since the owner is draining
//! - the channel is dropped (or cleared) → each live, non-destroying owner
//!   loses the hook that referenced the channel
//!
//! # Example
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use tether_core::{EventHandler, EventOwner};
//!
//! let on_click: EventHandler<()> = EventHandler::new();
//! let clicks = Rc::new(Cell::new(0));
//!
//! let owner = EventOwner::new();
//! let clicks_clone = clicks.clone();
//! on_click.add_owned_event(move |_| clicks_clone.set(clicks_clone.get() + 1), &owner);
//!
//! on_click.activate(&());
//! drop(owner);
//! on_click.activate(&());
//!
//! assert_eq!(clicks.get(), 1);
//! assert!(on_click.is_empty());
//! ```

use indexmap::IndexMap;
use smallvec::SmallVec;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::owner::{AsEventOwner, EventId, OwnerState};

/// Callback stored in a channel
///
/// Uses Rc since the UI is single-threaded and broadcasts snapshot callbacks
/// before invoking them.
pub type EventCallback<A> = Rc<dyn Fn(&A)>;

/// Link from a subscription to the owner whose lifetime bounds it
struct OwnerLink {
    owner: Weak<OwnerState>,
    hook: EventId,
}

impl OwnerLink {
    /// Remove the owner-side hook unless the owner is gone or draining
    fn detach(&self) {
        if let Some(owner) = self.owner.upgrade() {
            if !owner.is_destroying() {
                owner.remove_hook(self.hook);
            }
        }
    }
}

struct Subscription<A: ?Sized + 'static> {
    owner: Option<OwnerLink>,
    callback: EventCallback<A>,
}

struct ChannelState<A: ?Sized + 'static> {
    events: RefCell<IndexMap<EventId, Subscription<A>>>,
    last_event: Cell<u64>,
}

impl<A: ?Sized + 'static> ChannelState<A> {
    fn next_id(&self) -> EventId {
        let raw = self.last_event.get() + 1;
        self.last_event.set(raw);
        EventId::new(raw)
    }

    fn remove(&self, id: EventId) -> bool {
        let removed = self.events.borrow_mut().shift_remove(&id);
        match removed {
            Some(subscription) => {
                if let Some(link) = &subscription.owner {
                    link.detach();
                }
                tracing::trace!(event = %id, "subscription removed");
                true
            }
            None => {
                tracing::trace!(event = %id, "unknown subscription, nothing to remove");
                false
            }
        }
    }

    fn detach_all(&self) {
        let drained: Vec<Subscription<A>> = self
            .events
            .borrow_mut()
            .drain(..)
            .map(|(_, subscription)| subscription)
            .collect();

        for link in drained.iter().filter_map(|s| s.owner.as_ref()) {
            link.detach();
        }
        if !drained.is_empty() {
            tracing::trace!(count = drained.len(), "channel cleared");
        }
    }
}

impl<A: ?Sized + 'static> Drop for ChannelState<A> {
    fn drop(&mut self) {
        self.detach_all();
    }
}

/// A typed event channel
///
/// Not `Clone`: the channel is destroyed when its handle is dropped. Use
/// [`downgrade`](Self::downgrade) to let callbacks refer back to the channel
/// without keeping it alive.
pub struct EventHandler<A: ?Sized + 'static = ()> {
    state: Rc<ChannelState<A>>,
}

impl<A: ?Sized + 'static> EventHandler<A> {
    /// Create an empty channel
    pub fn new() -> Self {
        Self {
            state: Rc::new(ChannelState {
                events: RefCell::new(IndexMap::new()),
                last_event: Cell::new(0),
            }),
        }
    }

    /// Subscribe a callback with no owner
    ///
    /// The subscription lives until removed or until the channel is dropped.
    pub fn add_event<F>(&self, callback: F) -> EventId
    where
        F: Fn(&A) + 'static,
    {
        let id = self.state.next_id();
        self.state.events.borrow_mut().insert(
            id,
            Subscription {
                owner: None,
                callback: Rc::new(callback),
            },
        );
        tracing::trace!(event = %id, "subscription added");
        id
    }

    /// Subscribe a callback whose lifetime is bounded by `owner`
    ///
    /// When the owner begins destruction the subscription is removed from
    /// this channel. If the owner is already tearing down, the callback is
    /// discarded straight away and the returned handle refers to nothing.
    pub fn add_owned_event<F, O>(&self, callback: F, owner: &O) -> EventId
    where
        F: Fn(&A) + 'static,
        O: AsEventOwner + ?Sized,
    {
        let owner = owner.event_owner();
        let id = self.state.next_id();

        if owner.is_destroying() {
            tracing::debug!(event = %id, "owner is tearing down, subscription discarded");
            return id;
        }

        let channel = Rc::downgrade(&self.state);
        let hook = owner.add_destroy_hook(move || {
            if let Some(channel) = channel.upgrade() {
                channel.remove(id);
            }
        });

        self.state.events.borrow_mut().insert(
            id,
            Subscription {
                owner: Some(OwnerLink {
                    owner: owner.downgrade(),
                    hook,
                }),
                callback: Rc::new(callback),
            },
        );
        tracing::trace!(event = %id, hook = %hook, "owned subscription added");
        id
    }

    /// Remove a subscription
    ///
    /// Also removes the matching destroy hook from the subscription's owner
    /// unless that owner is mid-teardown. Returns `false` for unknown handles,
    /// which are otherwise ignored.
    pub fn remove_event(&self, id: EventId) -> bool {
        self.state.remove(id)
    }

    /// Invoke every subscribed callback in subscription order
    ///
    /// Works on a snapshot: callbacks added during the broadcast wait for the
    /// next one, and callbacks removed before being reached are skipped.
    pub fn activate(&self, args: &A) {
        let snapshot: SmallVec<[(EventId, EventCallback<A>); 4]> = self
            .state
            .events
            .borrow()
            .iter()
            .map(|(id, subscription)| (*id, Rc::clone(&subscription.callback)))
            .collect();

        for (id, callback) in snapshot {
            if !self.state.events.borrow().contains_key(&id) {
                continue;
            }
            callback(args);
        }
    }

    /// Drop every subscription, detaching their hooks from live owners
    pub fn clear(&self) {
        self.state.detach_all();
    }

    /// Whether `id` refers to a live subscription
    pub fn contains(&self, id: EventId) -> bool {
        self.state.events.borrow().contains_key(&id)
    }

    /// Number of live subscriptions
    pub fn len(&self) -> usize {
        self.state.events.borrow().len()
    }

    /// Check if there are no subscriptions
    pub fn is_empty(&self) -> bool {
        self.state.events.borrow().is_empty()
    }

    /// Create a non-owning reference to this channel
    pub fn downgrade(&self) -> WeakEventHandler<A> {
        WeakEventHandler {
            state: Rc::downgrade(&self.state),
        }
    }
}

impl<A: ?Sized + 'static> Default for EventHandler<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ?Sized + 'static> fmt::Debug for EventHandler<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandler")
            .field("subscriptions", &self.len())
            .finish()
    }
}

/// Non-owning reference to an [`EventHandler`]
pub struct WeakEventHandler<A: ?Sized + 'static = ()> {
    state: Weak<ChannelState<A>>,
}

impl<A: ?Sized + 'static> WeakEventHandler<A> {
    /// Remove a subscription if the channel is still alive
    pub fn remove_event(&self, id: EventId) -> bool {
        match self.state.upgrade() {
            Some(state) => state.remove(id),
            None => false,
        }
    }

    /// Whether the channel has been dropped
    pub fn is_dropped(&self) -> bool {
        self.state.strong_count() == 0
    }
}

impl<A: ?Sized + 'static> Clone for WeakEventHandler<A> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}
