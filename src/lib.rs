// The MIT License (MIT)

// Copyright (c) 2016 The futures-then Developers

//  Permission is hereby granted, free of charge, to any person obtaining a
//  copy of this software and associated documentation files (the "Software"),
//  to deal in the Software without restriction, including without limitation
//  the rights to use, copy, modify, merge, publish, distribute, sublicense,
//  and/or sell copies of the Software, and to permit persons to whom the
//  Software is furnished to do so, subject to the following conditions:
//
//  The above copyright notice and this permission notice shall be included in
//  all copies or substantial portions of the Software.
//
//  THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS
//  OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
//  FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
//  AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
//  LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
//  FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
//  DEALINGS IN THE SOFTWARE.

//! Thread-safe futures with promise style `then()` chaining
//!
//! ```
//! use futures_then::{Error, Future, Outcome};
//!
//! let base = Future::<String, Error>::new();
//! let derived: Future<String, Error> =
//!     base.then(Some(Box::new(|v: String| Outcome::Value(v + " manipulated"))), None);
//!
//! base.set_result("done".to_owned());
//! assert_eq!(derived.result(), Ok("done manipulated".to_owned()));
//! ```
//!
//! Callbacks may hand back another future, which is waited for without
//! blocking any thread, and a chain of futures which loops back on itself
//! rejects the derived future with `Error::CircularChain`.

#[macro_use]
extern crate log;
extern crate linked_hash_map;

pub use crate::error::{CircularChain, Error};
pub use crate::options::Options;
pub use crate::sync::future::{make, Future, FutureId, OnFailure, OnSuccess, Outcome, Promise};

pub mod error;
pub mod options;
pub mod sync;

/// Future configuration. Provides control over the properties of new futures.
pub struct Builder {
    opts: Options,
}

impl Builder {
    /// Generates the base configuration, from which configuration methods can be chained.
    pub fn new() -> Builder {
        Builder { opts: Options::new() }
    }

    /// Names the future-to-be. The name is used for identification only, in
    /// `Debug` output and log lines.
    #[inline]
    pub fn name(mut self, name: String) -> Builder {
        self.opts.name = Some(name);
        self
    }

    /// Create a pending future
    pub fn future<T, E>(self) -> Future<T, E>
        where T: Clone + Send + 'static,
              E: Clone + Send + 'static
    {
        Future::with_options(self.opts)
    }

    /// Create a pending future together with the promise that settles it
    pub fn promise<T, E>(self) -> (Promise<T, E>, Future<T, E>)
        where T: Clone + Send + 'static,
              E: Clone + Send + 'static
    {
        sync::future::make_with_options(self.opts)
    }
}

impl Default for Builder {
    fn default() -> Builder {
        Builder::new()
    }
}
