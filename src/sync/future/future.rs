// Copyright 2016 The futures-then Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, Thread};

use crate::error::Error;
use crate::options::Options;
use super::cores::{self, Core};
use super::resolve::Resolution;
use super::{FutureId, Outcome};

/// Success callback of `Future::then`
pub type OnSuccess<T, U, E> = Box<dyn FnOnce(T) -> Outcome<U, E> + Send>;

/// Failure callback of `Future::then`
pub type OnFailure<U, E> = Box<dyn FnOnce(E) -> Outcome<U, E> + Send>;

/// A value or an error which becomes available later.
///
/// `Future` is a cheap handle: clones refer to the same outcome slot and share
/// its identity. The outcome is set exactly once, either directly with
/// `set_result`/`set_exception`, through a `Promise`, or, for futures returned
/// by `then`, by resolving the callbacks.
pub struct Future<T, E>(Arc<Core<T, E>>)
    where T: 'static,
          E: 'static;

impl<T, E> Future<T, E>
    where T: Clone + Send + 'static,
          E: Clone + Send + 'static
{
    /// Create a pending future
    pub fn new() -> Future<T, E> {
        Future::with_options(Options::new())
    }

    pub fn with_options(opts: Options) -> Future<T, E> {
        Future(Core::new(opts, false))
    }

    pub fn with_value(result: Result<T, E>) -> Future<T, E> {
        Future(Core::with_value(Options::new(), result))
    }

    pub fn resolved(val: T) -> Future<T, E> {
        Self::with_value(Ok(val))
    }

    pub fn rejected(err: E) -> Future<T, E> {
        Self::with_value(Err(err))
    }

    pub(crate) fn with_core(core: Arc<Core<T, E>>) -> Future<T, E> {
        Future(core)
    }

    #[inline]
    pub(crate) fn core(&self) -> &Arc<Core<T, E>> {
        &self.0
    }

    #[inline]
    pub fn id(&self) -> FutureId {
        self.0.id()
    }

    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.0.name()
    }

    /// Whether the outcome is known
    pub fn done(&self) -> bool {
        self.0.is_done()
    }

    /// The outcome, if it is already known
    pub fn try_result(&self) -> Option<Result<T, E>> {
        self.0.peek()
    }

    /// Block the current thread until the outcome is known
    pub fn wait(&self) -> Result<T, E> {
        if let Some(result) = self.0.peek() {
            return result;
        }

        if let Some((_, result)) = self.0.listen_with(thread::current(), |t: Thread, _| t.unpark()) {
            return result;
        }

        loop {
            if let Some(result) = self.0.peek() {
                return result;
            }

            // Waiting from inside a listener: the settle may be queued on this very thread
            if !cores::run_queued_delivery() {
                thread::park();
            }
        }
    }

    /// Block until done, then return the value or the stored error
    pub fn result(&self) -> Result<T, E> {
        self.wait()
    }

    /// Block until done, then return the stored error, if any
    pub fn exception(&self) -> Option<E> {
        self.wait().err()
    }

    /// Fulfill the future.
    ///
    /// # Panics
    ///
    /// If the future is already done, or was returned by `then`.
    pub fn set_result(&self, val: T) {
        self.set(Ok(val))
    }

    /// Reject the future.
    ///
    /// # Panics
    ///
    /// If the future is already done, or was returned by `then`.
    pub fn set_exception(&self, err: E) {
        self.set(Err(err))
    }

    fn set(&self, val: Result<T, E>) {
        if self.0.is_derived() {
            panic!("{:?} is derived, its outcome is set by resolving its callbacks", self);
        }

        if self.0.settle(val).is_err() {
            panic!("{:?} is already done", self);
        }
    }

    /// Call `f` with the outcome once it is known.
    ///
    /// If it already is, `f` runs right away on the calling thread.
    pub fn add_done_callback<F>(&self, f: F)
        where F: FnOnce(Result<T, E>) + Send + 'static
    {
        self.0.listen(Box::new(f))
    }

    /// Derive a new future from the outcome of this one.
    ///
    /// On success `on_success` is called with the value, on failure
    /// `on_failure` with the error; a missing callback passes the outcome
    /// through unchanged. Whatever `Outcome` the callback returns, including
    /// further futures, is flattened into the returned future. A panicking
    /// callback rejects it with `Error::CallbackPanicked`, and a chain of
    /// futures which loops back on itself with `Error::CircularChain`.
    ///
    /// Returns immediately; the callbacks run on the thread that settles this
    /// future.
    pub fn then<U>(&self,
                   on_success: Option<OnSuccess<T, U, E>>,
                   on_failure: Option<OnFailure<U, E>>)
                   -> Future<U, E>
        where T: Into<U>,
              U: Clone + Send + 'static,
              E: From<Error>
    {
        self.chain(move |result| {
            match result {
                Ok(val) => {
                    match on_success {
                        Some(f) => f(val),
                        None => Outcome::Value(val.into()),
                    }
                }
                Err(err) => {
                    match on_failure {
                        Some(f) => f(err),
                        None => Outcome::Error(err),
                    }
                }
            }
        })
    }

    /// Derive a new future by mapping the value, errors pass through
    pub fn success<U, F, R>(&self, f: F) -> Future<U, E>
        where U: Clone + Send + 'static,
              F: FnOnce(T) -> R + Send + 'static,
              R: Into<Outcome<U, E>>,
              E: From<Error>
    {
        self.chain(move |result| {
            match result {
                Ok(val) => f(val).into(),
                Err(err) => Outcome::Error(err),
            }
        })
    }

    /// Derive a new future by handling the error, values pass through
    pub fn fail<F, R>(&self, f: F) -> Future<T, E>
        where F: FnOnce(E) -> R + Send + 'static,
              R: Into<Outcome<T, E>>,
              E: From<Error>
    {
        self.chain(move |result| {
            match result {
                Ok(val) => Outcome::Value(val),
                Err(err) => f(err).into(),
            }
        })
    }

    fn chain<U, F>(&self, dispatch: F) -> Future<U, E>
        where U: Clone + Send + 'static,
              F: FnOnce(Result<T, E>) -> Outcome<U, E> + Send + 'static,
              E: From<Error>
    {
        let derived = Future(Core::new(Options::new(), true));
        let resolution = Resolution::new(derived.clone());

        trace!("{:?} chained to {:?}", derived, self);

        self.0.listen(Box::new(move |result| {
            let candidate = match panic::catch_unwind(AssertUnwindSafe(move || dispatch(result))) {
                Ok(candidate) => candidate,
                Err(payload) => Outcome::Error(E::from(Error::from_panic(payload))),
            };

            resolution.run(candidate);
        }));

        derived
    }
}

impl<T, E> Clone for Future<T, E>
    where T: 'static,
          E: 'static
{
    fn clone(&self) -> Future<T, E> {
        Future(self.0.clone())
    }
}

impl<T, E> Default for Future<T, E>
    where T: Clone + Send + 'static,
          E: Clone + Send + 'static
{
    fn default() -> Future<T, E> {
        Future::new()
    }
}

impl<T, E> fmt::Debug for Future<T, E>
    where T: 'static,
          E: 'static
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum TestError {
        Sad(String),
        Chain(Error),
    }

    impl From<Error> for TestError {
        fn from(err: Error) -> TestError {
            TestError::Chain(err)
        }
    }

    #[test]
    fn test_future_resolved_and_rejected() {
        let f = Future::<u32, TestError>::resolved(3);
        assert!(f.done());
        assert_eq!(f.result(), Ok(3));
        assert_eq!(f.exception(), None);

        let f = Future::<u32, TestError>::rejected(TestError::Sad("no".to_owned()));
        assert_eq!(f.exception(), Some(TestError::Sad("no".to_owned())));
        assert_eq!(f.try_result(), Some(Err(TestError::Sad("no".to_owned()))));
    }

    #[test]
    fn test_future_clone_shares_identity() {
        let f = Future::<u32, TestError>::new();
        let g = f.clone();

        assert_eq!(f.id(), g.id());
        assert!(!g.done());

        f.set_result(9);
        assert_eq!(g.try_result(), Some(Ok(9)));
    }

    #[test]
    fn test_future_named_debug() {
        let mut opts = Options::new();
        opts.name("lookup".to_owned());

        let f = Future::<u32, TestError>::with_options(opts);
        assert_eq!(f.name(), Some("lookup"));
        assert_eq!(format!("{:?}", f), format!("Future({} \"lookup\")", f.id()));
    }

    #[test]
    #[should_panic(expected = "is already done")]
    fn test_future_set_twice() {
        let f = Future::<u32, TestError>::new();
        f.set_result(1);
        f.set_exception(TestError::Sad("again".to_owned()));
    }

    #[test]
    #[should_panic(expected = "is derived")]
    fn test_future_set_derived() {
        let f = Future::<u32, TestError>::new();
        let g: Future<u32, TestError> = f.then(None, None);
        g.set_result(1);
    }

    #[test]
    fn test_future_add_done_callback() {
        let f = Future::<u32, TestError>::new();
        let calls = Arc::new(AtomicUsize::new(0));

        {
            let calls = calls.clone();
            f.add_done_callback(move |r| {
                assert_eq!(r, Ok(4));
                calls.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        f.set_result(4);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        {
            let calls = calls.clone();
            f.add_done_callback(move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_future_wait_inside_callback() {
        let a = Future::<u32, TestError>::new();
        let b = Future::<u32, TestError>::new();
        let c: Future<u32, TestError> = b.success(|v| Ok(v + 1));
        let seen = Arc::new(AtomicUsize::new(0));

        {
            let seen = seen.clone();
            a.add_done_callback(move |r| {
                b.set_result(r.unwrap_or(0));
                seen.store(c.result().unwrap_or(0) as usize, Ordering::SeqCst);
            });
        }

        a.set_result(4);
        assert_eq!(seen.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_future_then_on_done_base() {
        let f = Future::<u32, TestError>::resolved(2);
        let g: Future<u32, TestError> = f.success(|v| Ok(v * 10));

        assert!(g.done());
        assert_eq!(g.result(), Ok(20));
    }

    #[test]
    fn test_future_then_widens_value() {
        let f = Future::<u32, TestError>::new();
        let g: Future<u64, TestError> = f.then(None, None);

        f.set_result(7);
        assert_eq!(g.result(), Ok(7u64));
    }
}
