use crate::invoke::BoxError;
use crate::listener::ListenerId;
use std::borrow::Cow;

/// Errors surfaced by emitters.
///
/// Listener failures never propagate out of `emit`; they are handed to the
/// emitter's error sink and logged.
#[herald_derive::herald_error]
pub enum HeraldError {
    /// A listener panicked while handling an event.
    #[error("Listener {listener} panicked on {event}{}: {message}", format_context(.context))]
    ListenerPanicked {
        event: &'static str,
        listener: ListenerId,
        message: Cow<'static, str>,
        context: Option<Cow<'static, str>>,
    },

    /// A fallible listener returned an error.
    #[error("Listener {listener} failed on {event}{}: {source}", format_context(.context))]
    ListenerFailed {
        event: &'static str,
        listener: ListenerId,
        source: BoxError,
        context: Option<Cow<'static, str>>,
    },

    /// Emitter options failed validation.
    #[error("Invalid emitter configuration{}: {message}", format_context(.context))]
    InvalidConfiguration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl HeraldError {
    /// The listener involved, for listener failures.
    #[must_use]
    pub const fn listener(&self) -> Option<ListenerId> {
        match self {
            Self::ListenerPanicked { listener, .. } | Self::ListenerFailed { listener, .. } => {
                Some(*listener)
            },
            Self::InvalidConfiguration { .. } => None,
        }
    }
}
