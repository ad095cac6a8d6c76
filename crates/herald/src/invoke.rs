//! Relaxed invocation: calling a callback with the longest prefix of the
//! emitted arguments it accepts.
//!
//! An event carries its arguments as a tuple `(A0, A1, …)`. A callback taking
//! `k` leading arguments by reference implements [`Handler`] for that tuple
//! for every `k` up to the tuple's length; the `Marker` parameter names the
//! prefix so the compiler can pick the one the callback fits. A callback that
//! fits no prefix is rejected where it is registered, at compile time.
//!
//! ```rust
//! use herald::apply_relaxed;
//! use std::cell::Cell;
//!
//! let status = Cell::new(0);
//! apply_relaxed(&|code: &i32| status.set(*code), &(404, "Not found"));
//! assert_eq!(status.get(), 404);
//! ```
//!
//! Closure parameters must be annotated (`|code: &i32|`): the prefix is chosen
//! from the closure's signature, so it cannot be inferred backwards.

/// Error type a fallible listener may return.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Return types accepted from listener callbacks.
pub trait Outcome {
    /// Normalizes the callback's result.
    ///
    /// # Errors
    /// Returns the listener's own error, boxed.
    fn into_result(self) -> Result<(), BoxError>;
}

impl Outcome for () {
    #[inline]
    fn into_result(self) -> Result<(), BoxError> {
        Ok(())
    }
}

impl<E> Outcome for Result<(), E>
where
    E: Into<BoxError>,
{
    #[inline]
    fn into_result(self) -> Result<(), BoxError> {
        self.map_err(Into::into)
    }
}

/// A callback that can be invoked with a prefix of `Args`.
///
/// Implemented for every `Fn(&A0, …, &Ak-1) -> R` where `(A0, …, Ak-1)` is a
/// prefix of `Args` and `R` is an [`Outcome`]. `Marker` is `fn(A0, …, Ak-1) -> R`.
pub trait Handler<Args, Marker> {
    /// What the callback returns.
    type Output: Outcome;

    /// How many leading arguments the callback receives.
    const ARITY: usize;

    /// Calls the callback, dropping the arguments past [`Handler::ARITY`].
    fn call(&self, args: &Args) -> Self::Output;
}

/// A method-like callback invoked on a receiver with a prefix of `Args`.
///
/// Implemented for every `Fn(&T, &A0, …, &Ak-1) -> R`, mirroring [`Handler`].
/// Used to connect signals to slots on another object.
pub trait Slot<T: ?Sized, Args, Marker> {
    /// What the slot returns.
    type Output: Outcome;

    /// How many leading arguments the slot receives.
    const ARITY: usize;

    /// Calls the slot on `target`.
    fn call(&self, target: &T, args: &Args) -> Self::Output;
}

/// Invokes `handler` with as many leading elements of `args` as it accepts.
///
/// Extra trailing arguments are ignored.
pub fn apply_relaxed<Args, Marker, H>(handler: &H, args: &Args) -> H::Output
where
    H: Handler<Args, Marker>,
{
    handler.call(args)
}

macro_rules! relaxed {
    ($arity:literal; [$($take:ident $var:ident),*]; [$($skip:ident),*]) => {
        impl<F, R, $($take,)* $($skip,)*> Handler<($($take,)* $($skip,)*), fn($($take),*) -> R> for F
        where
            F: Fn($(&$take),*) -> R,
            R: Outcome,
        {
            type Output = R;
            const ARITY: usize = $arity;

            #[inline]
            fn call(&self, args: &($($take,)* $($skip,)*)) -> R {
                let ($($var,)* ..) = args;
                (self)($($var),*)
            }
        }

        impl<F, R, T, $($take,)* $($skip,)*> Slot<T, ($($take,)* $($skip,)*), fn($($take),*) -> R> for F
        where
            T: ?Sized,
            F: Fn(&T, $(&$take),*) -> R,
            R: Outcome,
        {
            type Output = R;
            const ARITY: usize = $arity;

            #[inline]
            fn call(&self, target: &T, args: &($($take,)* $($skip,)*)) -> R {
                let ($($var,)* ..) = args;
                (self)(target, $($var),*)
            }
        }
    };
}

// Every prefix length `k` of every tuple arity `n` up to 8.
relaxed!(0; []; []);
relaxed!(0; []; [A0]);
relaxed!(1; [A0 a0]; []);
relaxed!(0; []; [A0, A1]);
relaxed!(1; [A0 a0]; [A1]);
relaxed!(2; [A0 a0, A1 a1]; []);
relaxed!(0; []; [A0, A1, A2]);
relaxed!(1; [A0 a0]; [A1, A2]);
relaxed!(2; [A0 a0, A1 a1]; [A2]);
relaxed!(3; [A0 a0, A1 a1, A2 a2]; []);
relaxed!(0; []; [A0, A1, A2, A3]);
relaxed!(1; [A0 a0]; [A1, A2, A3]);
relaxed!(2; [A0 a0, A1 a1]; [A2, A3]);
relaxed!(3; [A0 a0, A1 a1, A2 a2]; [A3]);
relaxed!(4; [A0 a0, A1 a1, A2 a2, A3 a3]; []);
relaxed!(0; []; [A0, A1, A2, A3, A4]);
relaxed!(1; [A0 a0]; [A1, A2, A3, A4]);
relaxed!(2; [A0 a0, A1 a1]; [A2, A3, A4]);
relaxed!(3; [A0 a0, A1 a1, A2 a2]; [A3, A4]);
relaxed!(4; [A0 a0, A1 a1, A2 a2, A3 a3]; [A4]);
relaxed!(5; [A0 a0, A1 a1, A2 a2, A3 a3, A4 a4]; []);
relaxed!(0; []; [A0, A1, A2, A3, A4, A5]);
relaxed!(1; [A0 a0]; [A1, A2, A3, A4, A5]);
relaxed!(2; [A0 a0, A1 a1]; [A2, A3, A4, A5]);
relaxed!(3; [A0 a0, A1 a1, A2 a2]; [A3, A4, A5]);
relaxed!(4; [A0 a0, A1 a1, A2 a2, A3 a3]; [A4, A5]);
relaxed!(5; [A0 a0, A1 a1, A2 a2, A3 a3, A4 a4]; [A5]);
relaxed!(6; [A0 a0, A1 a1, A2 a2, A3 a3, A4 a4, A5 a5]; []);
relaxed!(0; []; [A0, A1, A2, A3, A4, A5, A6]);
relaxed!(1; [A0 a0]; [A1, A2, A3, A4, A5, A6]);
relaxed!(2; [A0 a0, A1 a1]; [A2, A3, A4, A5, A6]);
relaxed!(3; [A0 a0, A1 a1, A2 a2]; [A3, A4, A5, A6]);
relaxed!(4; [A0 a0, A1 a1, A2 a2, A3 a3]; [A4, A5, A6]);
relaxed!(5; [A0 a0, A1 a1, A2 a2, A3 a3, A4 a4]; [A5, A6]);
relaxed!(6; [A0 a0, A1 a1, A2 a2, A3 a3, A4 a4, A5 a5]; [A6]);
relaxed!(7; [A0 a0, A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6]; []);
relaxed!(0; []; [A0, A1, A2, A3, A4, A5, A6, A7]);
relaxed!(1; [A0 a0]; [A1, A2, A3, A4, A5, A6, A7]);
relaxed!(2; [A0 a0, A1 a1]; [A2, A3, A4, A5, A6, A7]);
relaxed!(3; [A0 a0, A1 a1, A2 a2]; [A3, A4, A5, A6, A7]);
relaxed!(4; [A0 a0, A1 a1, A2 a2, A3 a3]; [A4, A5, A6, A7]);
relaxed!(5; [A0 a0, A1 a1, A2 a2, A3 a3, A4 a4]; [A5, A6, A7]);
relaxed!(6; [A0 a0, A1 a1, A2 a2, A3 a3, A4 a4, A5 a5]; [A6, A7]);
relaxed!(7; [A0 a0, A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6]; [A7]);
relaxed!(8; [A0 a0, A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7]; []);
