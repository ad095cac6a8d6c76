//! Signal/slot composition on top of [`Emitter`].
//!
//! An [`Object`] is embedded in a user type and plays two roles: it emits
//! that type's signals, and it owns the connections for which the type is
//! the receiving context. Dropping the object tears down both sides.
//!
//! ```rust
//! use herald::object::{AsObject, Object, connect_slot};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! herald::events! {
//!     pub struct Clicked();
//! }
//!
//! #[derive(Default)]
//! struct Button { object: Object }
//!
//! #[derive(Default)]
//! struct Dialog { object: Object, opened: Cell<u32> }
//!
//! impl AsObject for Button {
//!     fn object(&self) -> &Object { &self.object }
//! }
//! impl AsObject for Dialog {
//!     fn object(&self) -> &Object { &self.object }
//! }
//!
//! let button = Button::default();
//! let dialog = Rc::new(Dialog::default());
//! connect_slot(&button, Clicked, &dialog, |d: &Dialog| d.opened.set(d.opened.get() + 1));
//!
//! button.object.emit(Clicked, ());
//! assert_eq!(dialog.opened.get(), 1);
//!
//! drop(dialog);
//! button.object.emit(Clicked, ());
//! assert!(button.object.emitter().is_empty());
//! ```

use crate::config::EmitterConfig;
use crate::connection::ConnectionHandle;
use crate::emitter::{Emitter, Registration};
use crate::error::HeraldError;
use crate::event::Event;
use crate::invoke::{BoxError, Handler, Outcome, Slot};
use crate::listener::ListenerId;
use std::cell::RefCell;
use std::convert::Infallible;
use std::fmt;
use std::marker::PhantomData;
use std::rc::{Rc, Weak};

/// Emitter plus the connections owned as a receiving context.
#[derive(Default)]
pub struct Object {
    events: Emitter,
    connections: RefCell<Vec<ConnectionHandle>>,
}

/// Types embedding an [`Object`].
pub trait AsObject {
    /// The embedded object.
    fn object(&self) -> &Object;
}

impl AsObject for Object {
    fn object(&self) -> &Self {
        self
    }
}

impl Object {
    /// Builds an object with a default emitter and no connections.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an object whose emitter uses `config`.
    ///
    /// # Errors
    /// Returns [`HeraldError::InvalidConfiguration`] for invalid options.
    pub fn with_config(config: EmitterConfig) -> Result<Self, HeraldError> {
        Ok(Self { events: Emitter::with_config(config)?, connections: RefCell::default() })
    }

    /// The emitter carrying this object's signals.
    #[must_use]
    pub const fn emitter(&self) -> &Emitter {
        &self.events
    }

    /// Emits one of this object's signals.
    pub fn emit<E: Event>(&self, event: E, args: E::Args) {
        self.events.emit(event, args);
    }

    /// Takes ownership of a connection: it is disconnected when this object
    /// is dropped.
    pub fn adopt(&self, handle: ConnectionHandle) {
        self.prune();
        self.connections.borrow_mut().push(handle);
    }

    /// Number of owned handles whose emitter is still alive.
    ///
    /// A handle whose listener already fired as a once-listener, or was
    /// removed by id, still counts until its emitter is dropped.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.prune();
        self.connections.borrow().len()
    }

    /// Drops handles whose emitter is gone.
    fn prune(&self) {
        let stale: Vec<ConnectionHandle> = {
            let mut connections = self.connections.borrow_mut();
            let (live, stale) =
                std::mem::take(&mut *connections).into_iter().partition(ConnectionHandle::is_valid);
            *connections = live;
            stale
        };
        drop(stale);
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("events", &self.events)
            .field("connections", &self.connections.borrow().len())
            .finish()
    }
}

/// Connects `callback` to a signal of `source`.
///
/// The connection lasts as long as `source`, unless the returned
/// registration is turned into a handle.
pub fn connect<S, E, H, M>(source: &S, event: E, callback: H) -> Registration
where
    S: AsObject + ?Sized,
    E: Event,
    H: Handler<E::Args, M> + 'static,
    M: 'static,
{
    source.object().emitter().on(event, callback)
}

/// Connects `callback` to a signal of `source` on behalf of `context`.
///
/// The handle is stored in `context`, so the connection breaks when either
/// object is dropped.
pub fn connect_with<S, C, E, H, M>(source: &S, event: E, context: &C, callback: H) -> ListenerId
where
    S: AsObject + ?Sized,
    C: AsObject + ?Sized,
    E: Event,
    H: Handler<E::Args, M> + 'static,
    M: 'static,
{
    let registration = source.object().emitter().on(event, callback);
    let id = registration.id();
    context.object().adopt(registration.into_handle());
    id
}

/// Connects a signal of `source` to a method-like slot on `dest`.
///
/// `slot` receives `&D` followed by a prefix of the signal's arguments. Only a
/// weak reference to `dest` is kept; the handle lives in `dest`'s object.
pub fn connect_slot<S, D, E, F, M>(source: &S, event: E, dest: &Rc<D>, slot: F) -> ListenerId
where
    S: AsObject + ?Sized,
    D: AsObject + 'static,
    E: Event,
    F: Slot<D, E::Args, M> + 'static,
    M: 'static,
{
    let bound = BoundSlot { target: Rc::downgrade(dest), slot, _marker: PhantomData };
    connect_with::<S, D, E, _, Bound<M>>(source, event, &**dest, bound)
}

/// A slot paired with a weak receiver.
struct BoundSlot<D, F, M> {
    target: Weak<D>,
    slot: F,
    _marker: PhantomData<fn() -> M>,
}

/// Marker selecting the [`Handler`] impl of [`BoundSlot`]. Uninhabited.
enum Bound<M> {
    _Never(Infallible, PhantomData<fn() -> M>),
}

impl<D, F, M, Args> Handler<Args, Bound<M>> for BoundSlot<D, F, M>
where
    F: Slot<D, Args, M>,
{
    type Output = Result<(), BoxError>;
    const ARITY: usize = F::ARITY;

    fn call(&self, args: &Args) -> Self::Output {
        // A receiver dropped mid-emission has nothing left to notify.
        self.target.upgrade().map_or(Ok(()), |target| self.slot.call(&target, args).into_result())
    }
}
