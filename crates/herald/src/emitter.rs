use crate::config::EmitterConfig;
use crate::connection::ConnectionHandle;
use crate::error::HeraldError;
use crate::event::{Event, EventId};
use crate::invoke::Handler;
use crate::listener::{Invoke, ListenerId, ListenerRecord};
use std::any::Any;
use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::num::NonZeroU64;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};
use tracing::{debug, trace, warn};

type ErrorSink = dyn Fn(&HeraldError);

/// Emits events to listeners registered against them.
///
/// No schema is declared up front: any [`Event`] can be listened to and
/// emitted. Listeners run synchronously inside [`Emitter::emit`], in
/// registration order.
///
/// ```rust
/// use herald::{ConnectionHandle, Emitter};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// herald::events! {
///     pub struct ValueChanged(i32);
/// }
///
/// let emitter = Emitter::new();
/// let last = Rc::new(Cell::new(0));
///
/// let seen = Rc::clone(&last);
/// let mut handle: ConnectionHandle = emitter.on(ValueChanged, move |v: &i32| seen.set(*v)).into();
///
/// emitter.emit(ValueChanged, (3,));
/// assert_eq!(last.get(), 3);
///
/// handle.disconnect();
/// emitter.emit(ValueChanged, (4,));
/// assert_eq!(last.get(), 3);
/// ```
///
/// The emitter is the sole strong owner of its state. Dropping it destroys
/// every listener and invalidates every [`ConnectionHandle`] and
/// [`EmitterRef`] derived from it.
pub struct Emitter {
    shared: Rc<Shared>,
}

/// State shared between an emitter and the weak references it hands out.
///
/// Only [`Emitter`] holds a strong `Rc`; the `Weak`s held by handles are the
/// lifetime token. `alive` turns false the moment the emitter is dropped,
/// even while a transient upgrade is still on the stack.
pub(crate) struct Shared {
    alive: Cell<bool>,
    registry: RefCell<Registry>,
    config: EmitterConfig,
    sink: RefCell<Option<Rc<ErrorSink>>>,
}

/// Listener records, sorted by id.
///
/// Ids come from a strictly increasing counter and records are only ever
/// appended, so insertion order is id order. Lookups by id rely on this for
/// binary search; inserting anywhere but the tail would break them.
#[derive(Debug, Default)]
struct Registry {
    records: Vec<ListenerRecord>,
    last_id: u64,
}

/// A listener scheduled by one emission.
struct Pending {
    id: ListenerId,
    once: bool,
    invoker: Rc<dyn Invoke>,
}

impl Registry {
    fn next_id(&mut self) -> ListenerId {
        self.last_id += 1;
        let raw = NonZeroU64::new(self.last_id).unwrap_or(NonZeroU64::MIN);
        ListenerId::new(raw)
    }

    fn push(&mut self, record: ListenerRecord) {
        debug_assert!(self.records.last().is_none_or(|last| last.id < record.id));
        self.records.push(record);
    }

    fn position(&self, id: ListenerId) -> Option<usize> {
        self.records.binary_search_by_key(&id, |record| record.id).ok()
    }

    fn contains(&self, id: ListenerId) -> bool {
        self.position(id).is_some()
    }

    fn take(&mut self, id: ListenerId) -> Option<ListenerRecord> {
        self.position(id).map(|index| self.records.remove(index))
    }

    /// Listeners eligible for one emission, fixed at its start.
    fn pending(&self, event: &EventId) -> Vec<Pending> {
        self.records
            .iter()
            .filter(|record| record.matches(event))
            .map(|record| Pending {
                id: record.id,
                once: record.once,
                invoker: Rc::clone(&record.invoker),
            })
            .collect()
    }

    fn count(&self, event: &EventId) -> usize {
        self.records.iter().filter(|record| record.matches(event)).count()
    }

    fn take_all(&mut self, event: &EventId) -> Vec<ListenerRecord> {
        let (removed, kept): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.records).into_iter().partition(|record| record.matches(event));
        self.records = kept;
        removed
    }
}

impl Shared {
    fn new(config: EmitterConfig) -> Self {
        Self {
            alive: Cell::new(true),
            registry: RefCell::new(Registry::default()),
            config,
            sink: RefCell::new(None),
        }
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.alive.get()
    }

    pub(crate) fn label(&self) -> &str {
        &self.config.label
    }

    fn register<E, H, M>(self: &Rc<Self>, once: bool, handler: H) -> Registration
    where
        E: Event,
        H: Handler<E::Args, M> + 'static,
        M: 'static,
    {
        let id = {
            let mut registry = self.registry.borrow_mut();
            let id = registry.next_id();
            registry.push(ListenerRecord::new::<E, H, M>(id, once, handler));
            id
        };
        trace!(emitter = %self.label(), event = E::name(), listener = %id, once, "Listener registered");
        Registration { emitter: Rc::downgrade(self), id }
    }

    pub(crate) fn remove(&self, id: ListenerId) -> bool {
        // Bind the record so its callback is dropped after the borrow ends.
        let removed = self.registry.borrow_mut().take(id);
        let found = removed.is_some();
        drop(removed);
        trace!(emitter = %self.label(), listener = %id, found, "Listener removal");
        found
    }

    fn remove_all(&self, event: &EventId) -> usize {
        let removed = self.registry.borrow_mut().take_all(event);
        trace!(emitter = %self.label(), event = event.name(), removed = removed.len(), "Listeners cleared");
        removed.len()
    }

    fn emit<E: Event>(&self, args: &E::Args) {
        if !self.is_alive() {
            return;
        }

        let event = EventId::of::<E>();
        let pending = self.registry.borrow().pending(&event);
        trace!(emitter = %self.label(), event = event.name(), matched = pending.len(), "Emitting event");

        for listener in pending {
            if listener.once {
                // Once-listeners leave the registry before running so a
                // reentrant emission cannot fire them a second time.
                let record = self.registry.borrow_mut().take(listener.id);
                if record.is_none() {
                    continue;
                }
                trace!(emitter = %self.label(), event = event.name(), listener = %listener.id, "Once-listener consumed");
            } else if !self.registry.borrow().contains(listener.id) {
                continue;
            }

            self.dispatch(&event, &listener, args);
        }
    }

    fn dispatch(&self, event: &EventId, listener: &Pending, args: &dyn Any) {
        let outcome = if self.config.catch_panics {
            match panic::catch_unwind(AssertUnwindSafe(|| listener.invoker.invoke(args))) {
                Ok(outcome) => outcome,
                Err(payload) => {
                    self.report(HeraldError::ListenerPanicked {
                        event: event.name(),
                        listener: listener.id,
                        message: panic_message(payload.as_ref()),
                        context: None,
                    });
                    return;
                },
            }
        } else {
            listener.invoker.invoke(args)
        };

        if let Some(Err(source)) = outcome {
            self.report(HeraldError::ListenerFailed {
                event: event.name(),
                listener: listener.id,
                source,
                context: None,
            });
        }
    }

    fn report(&self, error: HeraldError) {
        if self.config.log_failures {
            warn!(emitter = %self.label(), error = %error, "Listener failed during emission");
        }
        let sink = self.sink.borrow().clone();
        let Some(sink) = sink else {
            return;
        };
        if !self.config.catch_panics {
            sink(&error);
            return;
        }
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| sink(&error))) {
            warn!(
                emitter = %self.label(),
                error = %error,
                panic = %panic_message(payload.as_ref()),
                "Error sink panicked"
            );
        }
    }

    fn retire(&self) {
        self.alive.set(false);
        let records = std::mem::take(&mut self.registry.borrow_mut().records);
        let sink = self.sink.borrow_mut().take();
        if !records.is_empty() {
            debug!(emitter = %self.label(), listeners = records.len(), "Emitter dropped with live listeners");
        }
        drop(records);
        drop(sink);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> Cow<'static, str> {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        Cow::Borrowed(message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        Cow::Owned(message.clone())
    } else {
        Cow::Borrowed("non-string panic payload")
    }
}

impl Emitter {
    /// Creates an emitter with default options.
    #[must_use]
    pub fn new() -> Self {
        Self { shared: Rc::new(Shared::new(EmitterConfig::default())) }
    }

    /// Creates an emitter with the given options.
    ///
    /// # Errors
    /// Returns [`HeraldError::InvalidConfiguration`] if `config` fails
    /// [`EmitterConfig::validate`].
    pub fn with_config(config: EmitterConfig) -> Result<Self, HeraldError> {
        config.validate()?;
        Ok(Self { shared: Rc::new(Shared::new(config)) })
    }

    /// Adds a listener for `event`, after every listener already registered.
    ///
    /// `callback` may take any prefix of the event's arguments, by reference.
    /// The returned [`Registration`] can become a [`ConnectionHandle`];
    /// dropping it leaves the listener attached.
    pub fn on<E, H, M>(&self, _event: E, callback: H) -> Registration
    where
        E: Event,
        H: Handler<E::Args, M> + 'static,
        M: 'static,
    {
        self.shared.register::<E, H, M>(false, callback)
    }

    /// Like [`Emitter::on`], but the listener is removed when it first fires.
    pub fn once<E, H, M>(&self, _event: E, callback: H) -> Registration
    where
        E: Event,
        H: Handler<E::Args, M> + 'static,
        M: 'static,
    {
        self.shared.register::<E, H, M>(true, callback)
    }

    /// Fires `event`, invoking every matching listener in registration order.
    ///
    /// The listeners eligible for this call are fixed when it starts:
    /// listeners added by a callback wait for the next emission, and
    /// listeners removed by a callback are skipped. A failing listener is
    /// reported to the error sink and does not stop the others.
    pub fn emit<E: Event>(&self, _event: E, args: E::Args) {
        self.shared.emit::<E>(&args);
    }

    /// Removes the listener registered under `id`.
    ///
    /// Returns whether a listener was removed.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.shared.remove(id)
    }

    /// Removes every listener of `event`, returning how many there were.
    pub fn remove_all_listeners<E: Event>(&self, _event: E) -> usize {
        self.shared.remove_all(&EventId::of::<E>())
    }

    /// Number of registered listeners, across all events.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.shared.registry.borrow().records.len()
    }

    /// Number of listeners registered for `event`.
    #[must_use]
    pub fn listener_count_for<E: Event>(&self, _event: E) -> usize {
        self.shared.registry.borrow().count(&EventId::of::<E>())
    }

    /// Whether `event` has at least one listener.
    #[must_use]
    pub fn has_listeners<E: Event>(&self, event: E) -> bool {
        self.listener_count_for(event) > 0
    }

    /// Whether no listener is registered at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listener_count() == 0
    }

    /// Installs a hook receiving every listener failure, replacing any
    /// previous one.
    pub fn set_error_sink(&self, sink: impl Fn(&HeraldError) + 'static) {
        *self.shared.sink.borrow_mut() = Some(Rc::new(sink));
    }

    /// Removes the error sink.
    pub fn clear_error_sink(&self) {
        self.shared.sink.borrow_mut().take();
    }

    /// Label from the emitter's options.
    #[must_use]
    pub fn label(&self) -> &str {
        self.shared.label()
    }

    /// The emitter's options.
    #[must_use]
    pub fn config(&self) -> &EmitterConfig {
        &self.shared.config
    }

    /// A non-owning reference for use inside listeners.
    #[must_use]
    pub fn downgrade(&self) -> EmitterRef {
        EmitterRef { shared: Rc::downgrade(&self.shared) }
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Emitter {
    fn drop(&mut self) {
        self.shared.retire();
    }
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("label", &self.label())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// A weak reference to an [`Emitter`].
///
/// Listeners are `'static`, so a callback that needs to register, remove or
/// emit on its own emitter captures one of these. Every operation is a no-op
/// once the emitter is gone.
#[derive(Clone)]
pub struct EmitterRef {
    shared: Weak<Shared>,
}

impl EmitterRef {
    pub(crate) const fn from_weak(shared: Weak<Shared>) -> Self {
        Self { shared }
    }

    fn live(&self) -> Option<Rc<Shared>> {
        self.shared.upgrade().filter(|shared| shared.is_alive())
    }

    /// Whether the emitter still exists.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.live().is_some()
    }

    /// [`Emitter::on`]; `None` if the emitter is gone.
    pub fn on<E, H, M>(&self, _event: E, callback: H) -> Option<Registration>
    where
        E: Event,
        H: Handler<E::Args, M> + 'static,
        M: 'static,
    {
        self.live().map(|shared| shared.register::<E, H, M>(false, callback))
    }

    /// [`Emitter::once`]; `None` if the emitter is gone.
    pub fn once<E, H, M>(&self, _event: E, callback: H) -> Option<Registration>
    where
        E: Event,
        H: Handler<E::Args, M> + 'static,
        M: 'static,
    {
        self.live().map(|shared| shared.register::<E, H, M>(true, callback))
    }

    /// [`Emitter::emit`]; returns `false` if the emitter is gone.
    pub fn emit<E: Event>(&self, _event: E, args: E::Args) -> bool {
        let Some(shared) = self.live() else {
            return false;
        };
        shared.emit::<E>(&args);
        true
    }

    /// [`Emitter::remove_listener`]; `false` if the emitter is gone.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.live().is_some_and(|shared| shared.remove(id))
    }

    /// [`Emitter::listener_count`]; zero if the emitter is gone.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.live().map_or(0, |shared| shared.registry.borrow().records.len())
    }
}

impl fmt::Debug for EmitterRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmitterRef").field("alive", &self.is_alive()).finish()
    }
}

/// What a registration returns: enough to build one [`ConnectionHandle`].
#[derive(Debug)]
pub struct Registration {
    emitter: Weak<Shared>,
    id: ListenerId,
}

impl Registration {
    /// Id of the new listener.
    #[must_use]
    pub const fn id(&self) -> ListenerId {
        self.id
    }

    /// Hands the registration to a handle that disconnects it on drop.
    #[must_use]
    pub fn into_handle(self) -> ConnectionHandle {
        ConnectionHandle::bind(self.emitter, self.id)
    }
}

impl From<Registration> for ConnectionHandle {
    fn from(registration: Registration) -> Self {
        registration.into_handle()
    }
}
