// Copyright 2016 The futures-then Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::any::Any;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::options::Options;
use crate::sync::spinlock::Spinlock;

/// Identity of a future, unique for the lifetime of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FutureId(pub(crate) usize);

impl FutureId {
    fn next() -> FutureId {
        static NEXT_ID: AtomicUsize = AtomicUsize::new(1);
        FutureId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for FutureId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub type Listener<T, E> = Box<dyn FnOnce(Result<T, E>) + Send>;

type Delivery = Box<dyn FnOnce()>;

thread_local! {
    // Listener calls queued by settles nested inside a listener call.
    // `Some` while this thread is draining the queue.
    static DELIVERIES: RefCell<Option<VecDeque<Delivery>>> = RefCell::new(None);

    // States of cores released while this thread drops another core's state.
    // `Some` while this thread is draining the list.
    static RELEASED: RefCell<Option<Vec<Box<dyn Any>>>> = RefCell::new(None);
}

/// Call `delivery` now, or, if this thread is already calling listeners,
/// queue it behind them. Settling a long chain therefore runs in a loop
/// instead of one stack frame per link.
fn deliver(delivery: Delivery) {
    let delivery = DELIVERIES.with(move |queue| {
        match *queue.borrow_mut() {
            Some(ref mut queue) => {
                queue.push_back(delivery);
                None
            }
            None => Some(delivery),
        }
    });

    if let Some(delivery) = delivery {
        let _draining = Draining::start();

        delivery();
        while run_queued_delivery() {}
    }
}

/// Call the oldest listener queued on this thread, if any
pub fn run_queued_delivery() -> bool {
    let next = DELIVERIES.with(|queue| queue.borrow_mut().as_mut().and_then(|q| q.pop_front()));

    match next {
        Some(delivery) => {
            delivery();
            true
        }
        None => false,
    }
}

struct Draining;

impl Draining {
    fn start() -> Draining {
        DELIVERIES.with(|queue| *queue.borrow_mut() = Some(VecDeque::new()));
        Draining
    }
}

impl Drop for Draining {
    fn drop(&mut self) {
        // Only non-empty if a delivery unwound; those listeners are dropped uncalled
        let left = DELIVERIES.with(|queue| queue.borrow_mut().take());
        drop(left);
    }
}

struct Releasing;

impl Releasing {
    fn start() -> Releasing {
        RELEASED.with(|released| *released.borrow_mut() = Some(Vec::new()));
        Releasing
    }
}

impl Drop for Releasing {
    fn drop(&mut self) {
        let left = RELEASED.with(|released| released.borrow_mut().take());
        drop(left);
    }
}

fn fire<T, E>(id: FutureId, listener: Listener<T, E>, val: Result<T, E>) {
    if let Err(err) = panic::catch_unwind(AssertUnwindSafe(move || listener(val))) {
        let msg = crate::Error::from_panic(err);
        error!("Future({}) completion listener panicked: {}", id, msg);
    }
}

enum State<T, E> {
    Pending(Vec<Listener<T, E>>),
    Done(Result<T, E>),
}

/// The shared data behind `Future` and `Promise` handles
///
/// A `Core` is settled at most once. Listeners registered before that are
/// called in registration order by the settling thread; listeners registered
/// afterwards are called immediately by the registering thread.
pub struct Core<T, E>
    where T: 'static,
          E: 'static
{
    id: FutureId,
    name: Option<String>,
    derived: bool,
    state: Spinlock<State<T, E>>,
}

impl<T, E> Core<T, E>
    where T: 'static,
          E: 'static
{
    #[inline]
    pub fn id(&self) -> FutureId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_ref().map(|s| &s[..])
    }

    #[inline]
    pub fn is_derived(&self) -> bool {
        self.derived
    }
}

impl<T, E> Core<T, E>
    where T: Clone + Send + 'static,
          E: Clone + Send + 'static
{
    pub fn new(opts: Options, derived: bool) -> Arc<Core<T, E>> {
        Arc::new(Core {
            id: FutureId::next(),
            name: opts.name,
            derived: derived,
            state: Spinlock::new(State::Pending(Vec::new())),
        })
    }

    pub fn with_value(opts: Options, result: Result<T, E>) -> Arc<Core<T, E>> {
        Arc::new(Core {
            id: FutureId::next(),
            name: opts.name,
            derived: false,
            state: Spinlock::new(State::Done(result)),
        })
    }

    pub fn is_done(&self) -> bool {
        match *self.state.lock() {
            State::Done(..) => true,
            State::Pending(..) => false,
        }
    }

    pub fn peek(&self) -> Option<Result<T, E>> {
        match *self.state.lock() {
            State::Done(ref result) => Some(result.clone()),
            State::Pending(..) => None,
        }
    }

    /// Store the outcome and notify every listener.
    ///
    /// Hands the value back if the core was already settled. When called from
    /// inside a listener, the listeners of this core are queued and run after
    /// the current one returns.
    pub fn settle(&self, val: Result<T, E>) -> Result<(), Result<T, E>> {
        let listeners = {
            let mut state = self.state.lock();

            let listeners = match *state {
                State::Done(..) => return Err(val),
                State::Pending(ref mut listeners) => mem::replace(listeners, Vec::new()),
            };

            *state = State::Done(val.clone());
            listeners
        };

        trace!("{:?} {}, notifying {} listeners",
               self,
               if val.is_ok() { "fulfilled" } else { "rejected" },
               listeners.len());

        if listeners.is_empty() {
            return Ok(());
        }

        let id = self.id;
        deliver(Box::new(move || {
            for listener in listeners {
                fire(id, listener, val.clone());
            }
        }));

        Ok(())
    }

    /// Register a listener, calling it right away if the outcome is already known
    pub fn listen(&self, listener: Listener<T, E>) {
        if let Some((listener, val)) = self.listen_with(listener, |listener, val| listener(val)) {
            fire(self.id, listener, val);
        }
    }

    /// Either park `state` as a listener, to be passed to `resume` on settle,
    /// or, if the outcome is already known, hand `state` back with it.
    ///
    /// Nothing is invoked on the calling thread, which lets a caller loop over
    /// a chain of settled cores without growing the stack.
    pub fn listen_with<S>(&self, state: S, resume: fn(S, Result<T, E>)) -> Option<(S, Result<T, E>)>
        where S: Send + 'static
    {
        let mut guard = self.state.lock();

        match *guard {
            State::Done(ref result) => Some((state, result.clone())),
            State::Pending(ref mut listeners) => {
                listeners.push(Box::new(move |val| resume(state, val)));
                None
            }
        }
    }
}

impl<T, E> Drop for Core<T, E>
    where T: 'static,
          E: 'static
{
    // A state may own the last handle to another core, e.g. an outcome nesting
    // a future. Cores released while another state is being dropped are parked
    // and dropped in a loop by the outermost drop.
    fn drop(&mut self) {
        let state = mem::replace(self.state.get_mut(), State::Pending(Vec::new()));

        let state = RELEASED.try_with(move |released| {
            match *released.borrow_mut() {
                Some(ref mut released) => {
                    released.push(Box::new(state) as Box<dyn Any>);
                    None
                }
                None => Some(state),
            }
        });

        if let Ok(Some(state)) = state {
            let _releasing = Releasing::start();

            drop(state);
            loop {
                let next = RELEASED.with(|released| released.borrow_mut().as_mut().and_then(|r| r.pop()));
                match next {
                    Some(state) => drop(state),
                    None => break,
                }
            }
        }
    }
}

impl<T, E> fmt::Debug for Core<T, E>
    where T: 'static,
          E: 'static
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.name {
            Some(ref name) => write!(f, "Future({} {:?})", self.id, name),
            None => write!(f, "Future({})", self.id),
        }
    }
}
