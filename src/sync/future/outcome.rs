// Copyright 2016 The futures-then Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use super::Future;

/// What a chaining callback produced.
///
/// Returning an `Error` is the same as failing: the derived future is
/// rejected with it. `Future` and `Nested` are waited for and replaced by
/// their own outcome until a plain value or error remains.
#[derive(Debug, Clone)]
pub enum Outcome<T, E>
    where T: 'static,
          E: 'static
{
    /// Fulfill the derived future
    Value(T),
    /// Reject the derived future
    Error(E),
    /// Adopt the outcome of another future
    Future(Future<T, E>),
    /// Adopt the outcome of a future which itself settles to an `Outcome`,
    /// e.g. a future resolving to yet another future
    Nested(Future<Outcome<T, E>, E>),
}

impl<T, E> Outcome<T, E>
    where T: 'static,
          E: 'static
{
    pub fn is_future(&self) -> bool {
        match *self {
            Outcome::Future(..) | Outcome::Nested(..) => true,
            Outcome::Value(..) | Outcome::Error(..) => false,
        }
    }
}

impl<T, E> From<Result<T, E>> for Outcome<T, E>
    where T: 'static,
          E: 'static
{
    fn from(result: Result<T, E>) -> Outcome<T, E> {
        match result {
            Ok(val) => Outcome::Value(val),
            Err(err) => Outcome::Error(err),
        }
    }
}

impl<T, E> From<Future<T, E>> for Outcome<T, E>
    where T: 'static,
          E: 'static
{
    fn from(fut: Future<T, E>) -> Outcome<T, E> {
        Outcome::Future(fut)
    }
}
