use crate::event::{Event, EventId};
use crate::invoke::{BoxError, Handler, Outcome};
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::num::NonZeroU64;
use std::rc::Rc;

/// Identifier of one registration on one emitter.
///
/// Ids start at 1, grow strictly, and are never reused by the same emitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(NonZeroU64);

impl ListenerId {
    pub(crate) const fn new(raw: NonZeroU64) -> Self {
        Self(raw)
    }

    /// The raw id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Type-erased invocation capability of a listener.
pub(crate) trait Invoke {
    /// Runs the callback with an argument bundle.
    ///
    /// Returns `None` when the bundle is not the tuple this listener was
    /// registered for; the caller treats that as "no match".
    fn invoke(&self, args: &dyn Any) -> Option<Result<(), BoxError>>;
}

/// A [`Handler`] bound to the argument tuple of its event.
struct Relaxed<H, Args, M> {
    handler: H,
    _signature: PhantomData<fn(&Args) -> M>,
}

impl<H, Args, M> Invoke for Relaxed<H, Args, M>
where
    H: Handler<Args, M>,
    Args: 'static,
{
    fn invoke(&self, args: &dyn Any) -> Option<Result<(), BoxError>> {
        let args = args.downcast_ref::<Args>()?;
        Some(self.handler.call(args).into_result())
    }
}

/// One entry of an emitter's registry.
pub(crate) struct ListenerRecord {
    pub(crate) id: ListenerId,
    pub(crate) event: EventId,
    pub(crate) once: bool,
    pub(crate) invoker: Rc<dyn Invoke>,
}

impl ListenerRecord {
    pub(crate) fn new<E, H, M>(id: ListenerId, once: bool, handler: H) -> Self
    where
        E: Event,
        H: Handler<E::Args, M> + 'static,
        M: 'static,
    {
        let invoker: Rc<dyn Invoke> =
            Rc::new(Relaxed::<H, E::Args, M> { handler, _signature: PhantomData });
        Self { id, event: EventId::of::<E>(), once, invoker }
    }

    pub(crate) fn matches(&self, event: &EventId) -> bool {
        self.event == *event
    }
}

impl fmt::Debug for ListenerRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRecord")
            .field("id", &self.id)
            .field("event", &self.event)
            .field("once", &self.once)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    crate::events! {
        struct Pair(i32, i32);
        struct Other(i32, i32);
    }

    fn id(raw: u64) -> ListenerId {
        ListenerId::new(NonZeroU64::new(raw).unwrap())
    }

    #[test]
    fn records_match_only_their_own_event() {
        let record = ListenerRecord::new::<Pair, _, _>(id(1), false, |_: &i32| {});
        assert!(record.matches(&EventId::of::<Pair>()));
        assert!(!record.matches(&EventId::of::<Other>()));
    }

    #[test]
    fn foreign_bundles_are_reported_as_no_match() {
        let record = ListenerRecord::new::<Pair, _, _>(id(1), false, |_: &i32, _: &i32| {});
        assert!(record.invoker.invoke(&("not", "a pair")).is_none());
    }

    #[test]
    fn invoke_forwards_the_prefix() {
        let sum = Rc::new(Cell::new(0));
        let seen = Rc::clone(&sum);
        let record =
            ListenerRecord::new::<Pair, _, _>(id(7), true, move |a: &i32| seen.set(seen.get() + a));

        let outcome = record.invoker.invoke(&(5, 100));
        assert!(matches!(outcome, Some(Ok(()))));
        assert_eq!(sum.get(), 5);
        assert!(record.once);
    }

    #[test]
    fn listener_ids_display_with_a_hash() {
        assert_eq!(id(42).to_string(), "#42");
        assert_eq!(id(42).get(), 42);
    }
}
