// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with plotting arguments.

use thiserror::Error;

use crate::{
    layout::LayoutError, selection::Dimension, selection::SelectionError,
    solutions::SolutionsReadError, unit_parsing::UnitParseError,
};

#[derive(Error, Debug)]
pub(crate) enum PlotArgsError {
    #[error("No calibration table was supplied")]
    NoCalTable,

    #[error("The {what} range must be two finite numbers with the first smaller than the second; got {got:?}")]
    BadRange { what: &'static str, got: Vec<f64> },

    #[error("Error when parsing the time tolerance: {0}")]
    BadTolerance(UnitParseError),

    #[error("Could not parse '{0}' as an x axis; expected 'chan' or 'freq'")]
    BadXAxis(String),

    #[error("The MAD sigma must be a positive number; got {0}")]
    BadMadSigma(f64),

    #[error("The calibration table has no {dimension} to plot")]
    NothingSelected { dimension: Dimension },

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Solutions(#[from] SolutionsReadError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
