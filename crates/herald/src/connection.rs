use crate::emitter::{EmitterRef, Shared};
use crate::listener::ListenerId;
use std::fmt;
use std::rc::Weak;
use tracing::debug;

/// What a [`ConnectionHandle`] currently refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Never associated with a registration.
    Unbound,
    /// Refers to a listener on a live emitter.
    Bound,
    /// Disconnected explicitly, or its emitter is gone.
    Disconnected,
}

#[derive(Default)]
enum Link {
    #[default]
    Unbound,
    Bound {
        emitter: Weak<Shared>,
        id: ListenerId,
    },
    Disconnected,
}

/// Scoped ownership of one listener registration.
///
/// Dropping the handle removes the listener from its emitter. The handle
/// moves but does not clone; `std::mem::take` leaves an unbound handle behind.
/// Outliving the emitter is fine: disconnecting then does nothing.
///
/// ```rust
/// use herald::{ConnectionHandle, ConnectionState, Emitter};
///
/// herald::events! {
///     pub struct Saved();
/// }
///
/// let emitter = Emitter::new();
/// {
///     let handle: ConnectionHandle = emitter.on(Saved, || {}).into();
///     assert_eq!(handle.state(), ConnectionState::Bound);
///     assert_eq!(emitter.listener_count(), 1);
/// }
/// assert_eq!(emitter.listener_count(), 0);
/// ```
#[derive(Default)]
pub struct ConnectionHandle {
    link: Link,
}

impl ConnectionHandle {
    pub(crate) const fn bind(emitter: Weak<Shared>, id: ListenerId) -> Self {
        Self { link: Link::Bound { emitter, id } }
    }

    /// Whether the handle refers to a listener on an emitter that still
    /// exists.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.state() == ConnectionState::Bound
    }

    /// Where the handle stands: never bound, bound to a live listener, or
    /// disconnected.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        match &self.link {
            Link::Unbound => ConnectionState::Unbound,
            Link::Bound { emitter, .. } if live(emitter) => ConnectionState::Bound,
            Link::Bound { .. } | Link::Disconnected => ConnectionState::Disconnected,
        }
    }

    /// The emitter the listener is registered on, if it still exists.
    #[must_use]
    pub fn emitter(&self) -> Option<EmitterRef> {
        match &self.link {
            Link::Bound { emitter, .. } if live(emitter) => {
                Some(EmitterRef::from_weak(emitter.clone()))
            },
            _ => None,
        }
    }

    /// Id of the listener this handle refers to.
    ///
    /// Kept after the emitter is gone, cleared by [`ConnectionHandle::disconnect`].
    #[must_use]
    pub const fn connection_id(&self) -> Option<ListenerId> {
        match &self.link {
            Link::Bound { id, .. } => Some(*id),
            Link::Unbound | Link::Disconnected => None,
        }
    }

    /// Removes the listener, if its emitter still exists.
    ///
    /// Idempotent. Afterwards the handle is invalid and refers to nothing.
    pub fn disconnect(&mut self) {
        // Unbound handles stay unbound.
        if matches!(self.link, Link::Unbound) {
            return;
        }
        let Link::Bound { emitter, id } = std::mem::replace(&mut self.link, Link::Disconnected)
        else {
            return;
        };

        match emitter.upgrade().filter(|shared| shared.is_alive()) {
            Some(shared) => {
                if !shared.remove(id) {
                    debug!(emitter = %shared.label(), listener = %id, "Listener was already removed");
                }
            },
            None => debug!(listener = %id, "Emitter already dropped, nothing to disconnect"),
        }
    }

    /// Gives up ownership without removing the listener.
    ///
    /// The listener then lives as long as its emitter. Returns its id so it
    /// can still be removed with [`Emitter::remove_listener`](crate::Emitter::remove_listener).
    pub fn release(&mut self) -> Option<ListenerId> {
        match std::mem::replace(&mut self.link, Link::Disconnected) {
            Link::Bound { id, .. } => Some(id),
            Link::Unbound => {
                self.link = Link::Unbound;
                None
            },
            Link::Disconnected => None,
        }
    }
}

fn live(emitter: &Weak<Shared>) -> bool {
    emitter.upgrade().is_some_and(|shared| shared.is_alive())
}

impl Drop for ConnectionHandle {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("state", &self.state())
            .field("id", &self.connection_id())
            .finish()
    }
}
