// Copyright 2016 The futures-then Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// Type parameters follow one pattern across this module:
//
// T => the Ok(T) of the stored Result<T, E>
// E => the Err(E) of the stored Result<T, E>
// U => the Ok(U) of a future derived with `.then()` and friends
//
// A `Core` is the shared outcome slot behind `Future` and `Promise` handles.
// Chaining registers a listener on the base core which runs the callbacks and
// hands their `Outcome` to a `Resolution` (see `resolve`), which settles the
// derived core once every nested future has settled.

mod cores;
mod future;
mod outcome;
mod promise;
mod resolve;

pub use self::cores::FutureId;
pub use self::future::*;
pub use self::outcome::*;
pub use self::promise::*;

use crate::options::Options;
use self::cores::Core;

/// Create a pending future together with the promise that settles it
pub fn make<T, E>() -> (Promise<T, E>, Future<T, E>)
    where T: Clone + Send + 'static,
          E: Clone + Send + 'static
{
    make_with_options(Options::new())
}

pub(crate) fn make_with_options<T, E>(opts: Options) -> (Promise<T, E>, Future<T, E>)
    where T: Clone + Send + 'static,
          E: Clone + Send + 'static
{
    let core = Core::new(opts, false);
    (Promise::with_core(core.clone()), Future::with_core(core))
}
