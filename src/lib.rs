// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Inspection of antenna-based calibration solutions.
//!
//! Selections of antennas, spws, fields, polarisations and times are resolved
//! against a calibration table, solution times are matched with a tolerance,
//! polynomial (BPOLY) solutions are evaluated, outlier channels are found
//! with robust statistics, and panels are laid out onto pages that can be
//! navigated back and forth. Rendering is left to whatever consumes the
//! [`panel::PanelDescriptor`]s.

pub mod constants;
pub mod layout;
pub mod math;
pub mod panel;
pub mod selection;
pub mod solutions;
pub mod timestamps;

mod cli;
mod params;
mod unit_parsing;

// Re-exports.
pub use cli::{Calview, CalviewError};
pub use layout::{Command, LayoutError, PageLayoutEngine, PanelOutcome, PanelSource};
pub use panel::{PanelBuilder, PanelDescriptor, PlotOptions};
pub use selection::{Selection, SelectionError, SelectionResolver, SelectionSpec};
pub use solutions::{CalTable, SolutionKind, SolutionRow, SolutionsReadError};
