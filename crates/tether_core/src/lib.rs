//! Tether Core
//!
//! This crate provides the ownership-safe event primitives the Tether widget
//! layer is built on:
//!
//! - **Owner Registry**: destruction hooks that run exactly once when an
//!   object begins tearing down ([`EventOwner`])
//! - **Event Channels**: typed broadcast points whose subscriptions can be
//!   tied to an owner's lifetime ([`EventHandler`])
//!
//! Everything is single-threaded (`Rc`/`RefCell`); callbacks may freely add
//! or remove subscriptions and destroy owners while a broadcast is running.
//!
//! # Example
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use tether_core::{EventHandler, EventOwner};
//!
//! let on_resize: EventHandler<(u32, u32)> = EventHandler::new();
//! let sizes = Rc::new(RefCell::new(Vec::new()));
//!
//! {
//!     let view = EventOwner::new();
//!     let sizes = sizes.clone();
//!     on_resize.add_owned_event(move |&size| sizes.borrow_mut().push(size), &view);
//!     on_resize.activate(&(800, 600));
//! } // view dropped: its subscription goes with it
//!
//! on_resize.activate(&(1024, 768));
//! assert_eq!(*sizes.borrow(), vec![(800, 600)]);
//! ```

pub mod handler;
pub mod owner;

pub use handler::{EventCallback, EventHandler, WeakEventHandler};
pub use owner::{AsEventOwner, DestroyHook, EventId, EventOwner};
