// Copyright 2016 The futures-then Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::fmt;
use std::sync::Arc;

use super::cores::Core;
use super::Future;

/// The write side of a `Future`, consumed by settling it
pub struct Promise<T, E>(Arc<Core<T, E>>)
    where T: 'static,
          E: 'static;

impl<T, E> Promise<T, E>
    where T: Clone + Send + 'static,
          E: Clone + Send + 'static
{
    pub(crate) fn with_core(core: Arc<Core<T, E>>) -> Promise<T, E> {
        Promise(core)
    }

    /// Another handle to the future this promise settles
    pub fn future(&self) -> Future<T, E> {
        Future::with_core(self.0.clone())
    }

    /// # Panics
    ///
    /// If the future was already set through one of its handles.
    pub fn resolve(self, val: T) {
        self.settle(Ok(val))
    }

    /// # Panics
    ///
    /// If the future was already set through one of its handles.
    pub fn reject(self, err: E) {
        self.settle(Err(err))
    }

    fn settle(self, val: Result<T, E>) {
        if self.0.settle(val).is_err() {
            panic!("{:?} is already done", self.0);
        }
    }
}

impl<T, E> fmt::Debug for Promise<T, E>
    where T: 'static,
          E: 'static
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Promise({})", self.0.id())
    }
}
