// Copyright 2016 The futures-then Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Errors synthesized while resolving a chained future

use std::any::Any;
use std::error;
use std::fmt;

use crate::sync::future::FutureId;

/// Failures produced by the chaining machinery itself.
///
/// Error types used with `then` must be constructible from this type, so that
/// the resolver can reject a derived future with them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A future reappeared in its own resolution chain
    CircularChain(CircularChain),
    /// A success or failure callback panicked, carrying the panic message
    CallbackPanicked(String),
}

impl Error {
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Error {
        let msg = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_owned()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "Box<Any>".to_owned()
        };

        Error::CallbackPanicked(msg)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::CircularChain(ref chain) => fmt::Display::fmt(chain, f),
            Error::CallbackPanicked(ref msg) => write!(f, "callback panicked: {}", msg),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::CircularChain(ref chain) => Some(chain),
            Error::CallbackPanicked(..) => None,
        }
    }
}

impl From<CircularChain> for Error {
    fn from(chain: CircularChain) -> Error {
        Error::CircularChain(chain)
    }
}

/// The path of futures a resolution walked before meeting one of them again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircularChain {
    path: Vec<FutureId>,
    repeated: FutureId,
}

impl CircularChain {
    pub(crate) fn new(path: Vec<FutureId>, repeated: FutureId) -> CircularChain {
        CircularChain {
            path: path,
            repeated: repeated,
        }
    }

    /// Futures visited in order, starting with the derived future being resolved
    pub fn path(&self) -> &[FutureId] {
        &self.path
    }

    /// The future that was met a second time
    pub fn repeated(&self) -> FutureId {
        self.repeated
    }
}

impl fmt::Display for CircularChain {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Circular Futures chain detected: ")?;
        for id in &self.path {
            write!(f, "{} -> ", id)?;
        }
        write!(f, "{}", self.repeated)
    }
}

impl error::Error for CircularChain {}
