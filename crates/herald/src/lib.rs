//! # Herald
//!
//! In-process, synchronous event dispatch with no up-front schema.
//!
//! ## Overview
//!
//! Events are declared with [`events!`] as zero-sized marker types carrying an
//! argument tuple. Any code can listen to any event on an [`Emitter`], and
//! listeners run inline, in registration order, when the event is emitted.
//!
//! ## Features
//!
//! * **Relaxed arity**: a listener takes any prefix of the event's arguments;
//!   the prefix is picked at compile time.
//! * **Scoped connections**: a [`ConnectionHandle`] disconnects on drop and
//!   stays safe to use after its emitter is gone.
//! * **Reentrancy**: listeners may register, remove and emit through an
//!   [`EmitterRef`]; each emission works on a snapshot of the registry.
//! * **Failure isolation**: panicking or failing listeners are reported to an
//!   error sink and never stop the others.
//! * **Collaborators**: signal/slot objects ([`object`]) and a typed
//!   publisher/subscriber ([`pubsub`]).
//!
//! # Example
//!
//! ```rust
//! use herald::{ConnectionHandle, Emitter};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! herald::events! {
//!     pub struct Moved(i32, i32);
//! }
//!
//! let emitter = Emitter::new();
//! let log = Rc::new(RefCell::new(Vec::new()));
//!
//! let both = Rc::clone(&log);
//! let _full: ConnectionHandle =
//!     emitter.on(Moved, move |x: &i32, y: &i32| both.borrow_mut().push((*x, *y))).into();
//!
//! let first = Rc::clone(&log);
//! let _partial: ConnectionHandle =
//!     emitter.on(Moved, move |x: &i32| first.borrow_mut().push((*x, 0))).into();
//!
//! emitter.emit(Moved, (1, 2));
//! assert_eq!(*log.borrow(), vec![(1, 2), (1, 0)]);
//! ```

mod config;
mod connection;
mod emitter;
mod error;
mod event;
mod invoke;
mod listener;
pub mod object;
pub mod pubsub;

pub use config::EmitterConfig;
pub use connection::{ConnectionHandle, ConnectionState};
pub use emitter::{Emitter, EmitterRef, Registration};
pub use error::{HeraldError, HeraldErrorExt};
pub use event::{Event, EventId};
pub use invoke::{BoxError, Handler, Outcome, Slot, apply_relaxed};
pub use listener::ListenerId;
