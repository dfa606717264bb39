// Copyright 2016 The futures-then Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Future options

use std::default::Default;

/// Future options
#[derive(Debug, Clone)]
pub struct Options {
    /// Used for identification only, in `Debug` output and log lines
    pub name: Option<String>,
}

impl Options {
    pub fn new() -> Options {
        Options { name: None }
    }

    pub fn name(&mut self, name: String) -> &mut Options {
        self.name = Some(name);
        self
    }
}

impl Default for Options {
    fn default() -> Options {
        Options::new()
    }
}
