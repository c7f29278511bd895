// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with laying out panels.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("Already on the first page; there's nothing to go back to")]
    NoHistory,

    #[error("Plotting has been quit; no further navigation is possible")]
    Quit,

    #[error("Nothing to plot: no {dimension} available after selection")]
    EmptyDimension { dimension: &'static str },

    #[error("Got {time_lists} lists of valid times for {spws} spws")]
    TimesPerSpwMismatch { spws: usize, time_lists: usize },

    #[error("Time index {index} is out of range; there are only {num_times} unique times")]
    BadTimeIndex { index: usize, num_times: usize },

    #[error("A {rows}x{cols} panel grid is not supported; use one of 1x1, 2x2, 3x2 or 4x2")]
    UnsupportedGrid { rows: usize, cols: usize },

    #[error("Could not parse '{got}' as a panel grid; expected e.g. '2x2' or '22'")]
    BadSubplot { got: String },

    #[error("Could not parse '{got}' as an overlay; expected one of 'none', 'antenna', 'time' or 'antenna,time'")]
    BadOverlay { got: String },

    #[error("Could not parse '{got}' as a y axis; expected one of 'amp', 'phase' or 'both'")]
    BadYAxis { got: String },
}
