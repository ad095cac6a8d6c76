use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A declared event.
///
/// Each event is its own zero-sized marker type, so its identity is the
/// marker's [`TypeId`]: stable, comparable, and unique per declaration even
/// when two events share a parameter list. `Args` is the tuple of values the
/// event carries. Declare events with [`events!`](crate::events).
pub trait Event: Copy + 'static {
    /// The argument bundle emitted with this event.
    type Args: 'static;

    /// Name used in traces and errors.
    #[must_use]
    fn name() -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Runtime identity of an [`Event`], as stored by listener records.
#[derive(Clone, Copy)]
pub struct EventId {
    type_id: TypeId,
    name: &'static str,
}

impl EventId {
    /// Identity of the event type `E`.
    #[must_use]
    pub fn of<E: Event>() -> Self {
        Self { type_id: TypeId::of::<E>(), name: E::name() }
    }

    /// Name of the event, for diagnostics only.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for EventId {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for EventId {}

impl Hash for EventId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EventId").field(&self.name).finish()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Declares one or more events.
///
/// Each line declares a zero-sized marker type and its argument list:
///
/// ```rust
/// herald::events! {
///     /// The person's name changed.
///     pub struct NameChanged(String);
///     pub struct Moved(i32, i32);
///     pub struct Clicked();
/// }
///
/// let emitter = herald::Emitter::new();
/// emitter.on(Moved, |x: &i32| println!("moved to column {x}"));
/// emitter.emit(Moved, (3, 4));
/// ```
#[macro_export]
macro_rules! events {
    ($($(#[$meta:meta])* $vis:vis struct $name:ident ( $($arg:ty),* $(,)? );)+) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
            $vis struct $name;

            impl $crate::Event for $name {
                type Args = ($($arg,)*);

                fn name() -> &'static str {
                    stringify!($name)
                }
            }
        )+
    };
}
