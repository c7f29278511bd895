// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Parameters that are ready to be used.
//!
//! The code here "mirrors" the code within the `cli` module; `cli` is
//! unparsed, user-facing code, whereas parameters have been parsed and
//! validated.

mod plot;

pub(crate) use plot::{parse_command, MedianMad, PlotError, PlotOutput, PlotParams};
