// Copyright 2016 The futures-then Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Flattening of future-valued outcomes into a derived future.
//!
//! A `Resolution` owns the derived future and the chain of futures visited so
//! far. It is driven by a plain loop: futures which are already settled are
//! read in place, and the first pending one gets the whole `Resolution` moved
//! into its listener list, to be resumed by whichever thread settles it.

use linked_hash_map::LinkedHashMap;

use crate::error::{CircularChain, Error};
use super::{Future, FutureId, Outcome};

/// Futures visited by one resolution, in visiting order
struct ResolutionChain {
    visited: LinkedHashMap<FutureId, ()>,
}

impl ResolutionChain {
    /// A chain which already contains `id`
    fn starting_at(id: FutureId) -> ResolutionChain {
        let mut visited = LinkedHashMap::new();
        visited.insert(id, ());
        ResolutionChain { visited: visited }
    }

    fn visit(&mut self, id: FutureId) -> Result<(), CircularChain> {
        if self.visited.contains_key(&id) {
            let path = self.visited.keys().cloned().collect();
            return Err(CircularChain::new(path, id));
        }

        self.visited.insert(id, ());
        Ok(())
    }

    fn len(&self) -> usize {
        self.visited.len()
    }
}

pub struct Resolution<T, E>
    where T: 'static,
          E: 'static
{
    target: Future<T, E>,
    chain: ResolutionChain,
}

impl<T, E> Resolution<T, E>
    where T: Clone + Send + 'static,
          E: Clone + Send + From<Error> + 'static
{
    pub fn new(target: Future<T, E>) -> Resolution<T, E> {
        // A derived future can never settle by waiting for itself
        let chain = ResolutionChain::starting_at(target.id());

        Resolution {
            target: target,
            chain: chain,
        }
    }

    pub fn run(mut self, mut candidate: Outcome<T, E>) {
        loop {
            candidate = match candidate {
                Outcome::Value(val) => return self.finish(Ok(val)),
                Outcome::Error(err) => return self.finish(Err(err)),
                Outcome::Future(inner) => {
                    if let Err(cycle) = self.chain.visit(inner.id()) {
                        return self.circular(cycle);
                    }

                    match inner.core().listen_with(self, Self::resume) {
                        Some((this, result)) => {
                            self = this;
                            Outcome::from(result)
                        }
                        None => {
                            trace!("resolution parked on pending {:?}", inner);
                            return;
                        }
                    }
                }
                Outcome::Nested(inner) => {
                    if let Err(cycle) = self.chain.visit(inner.id()) {
                        return self.circular(cycle);
                    }

                    match inner.core().listen_with(self, Self::resume_nested) {
                        Some((this, result)) => {
                            self = this;
                            result.unwrap_or_else(Outcome::Error)
                        }
                        None => {
                            trace!("resolution parked on pending {:?}", inner);
                            return;
                        }
                    }
                }
            };
        }
    }

    fn resume(self, result: Result<T, E>) {
        self.run(Outcome::from(result))
    }

    fn resume_nested(self, result: Result<Outcome<T, E>, E>) {
        self.run(result.unwrap_or_else(Outcome::Error))
    }

    fn circular(self, cycle: CircularChain) {
        debug!("{:?}: {}", self.target, cycle);
        self.finish(Err(E::from(Error::CircularChain(cycle))))
    }

    fn finish(self, result: Result<T, E>) {
        debug!("{:?} resolved through {} futures", self.target, self.chain.len() - 1);

        if self.target.core().settle(result).is_err() {
            // Derived futures refuse external settling, so only a second resolution could get here
            error!("{:?} was resolved twice, dropping the later outcome", self.target);
        }
    }
}
