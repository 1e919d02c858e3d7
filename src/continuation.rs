//! Single-shot callbacks that cannot be silently lost.
//!
//! A [`Continuation`] is consumed by [`Continuation::run`]. If it is dropped
//! instead (an external service forgot it, a task was cancelled) it fires the
//! fail-closed value of its input type, so a caller never waits forever on a
//! callback that nobody holds any more.

use std::fmt;

/// Value delivered when a continuation is dropped without being run.
pub trait FailClosed {
    /// The outcome equivalent to a denial.
    fn fail_closed() -> Self;
}

impl FailClosed for bool {
    fn fail_closed() -> Self {
        false
    }
}

/// A callback that fires exactly once.
///
/// # Examples
///
/// ```
/// use std::sync::mpsc;
/// use permission_broker::Continuation;
///
/// let (tx, rx) = mpsc::channel();
/// let allowed = Continuation::new(move |value: bool| tx.send(value).unwrap());
///
/// // Nobody answered: dropping delivers the denial.
/// drop(allowed);
/// assert_eq!(rx.recv().unwrap(), false);
/// ```
pub struct Continuation<T: FailClosed + Send + 'static> {
    callback: Option<Box<dyn FnOnce(T) + Send>>,
}

impl<T: FailClosed + Send + 'static> Continuation<T> {
    /// Wraps `callback`.
    pub fn new(callback: impl FnOnce(T) + Send + 'static) -> Self {
        Self {
            callback: Some(Box::new(callback)),
        }
    }

    /// Delivers `value`, consuming the continuation.
    pub fn run(mut self, value: T) {
        if let Some(callback) = self.callback.take() {
            callback(value);
        }
    }

    /// Adapts this continuation to accept a `U`, converted through `f`.
    ///
    /// Dropping the returned continuation delivers `f(U::fail_closed())`, so
    /// the guarantee carries through any number of adaptations.
    pub fn map<U, F>(self, f: F) -> Continuation<U>
    where
        U: FailClosed + Send + 'static,
        F: FnOnce(U) -> T + Send + 'static,
    {
        Continuation::new(move |value: U| self.run(f(value)))
    }
}

impl<T: FailClosed + Send + 'static> Drop for Continuation<T> {
    fn drop(&mut self) {
        if let Some(callback) = self.callback.take() {
            callback(T::fail_closed());
        }
    }
}

impl<T: FailClosed + Send + 'static> fmt::Debug for Continuation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Continuation")
            .field("pending", &self.callback.is_some())
            .finish()
    }
}
