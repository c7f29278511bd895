// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all calview-related errors. This should be the *only* error
//! enum that is publicly visible.

use thiserror::Error;

use super::plot::PlotArgsError;
use crate::{
    layout::LayoutError, params::PlotError, selection::SelectionError,
    solutions::SolutionsReadError, unit_parsing::UnitParseError,
};

/// The *only* publicly visible error from calview. Each error message points
/// at where more help can be found, unless it's "generic".
#[derive(Error, Debug)]
pub enum CalviewError {
    /// An error related to the arguments of `plot`.
    #[error("{0}\n\nSee for more info: calview plot --help")]
    Plot(String),

    /// A selection string couldn't be resolved.
    #[error("{0}\n\nSelections are comma-separated ids, names, name globs, a~b ranges or '*'; prefix any of these with '!' to exclude it")]
    Selection(String),

    /// A calibration table couldn't be read.
    #[error("{0}\n\nSee for more info: calview inspect --help")]
    Solutions(String),

    /// Paging through panels failed.
    #[error("{0}")]
    Layout(String),

    /// An error related to argument files.
    #[error("{0}\n\nArgument files are toml or json files holding the same arguments as the command line")]
    ArgFile(String),

    /// A generic error that can't be clarified further with documentation, e.g.
    /// IO errors.
    #[error("{0}")]
    Generic(String),
}

// When changing the error propagation below, ensure `Self::from(e)` uses the
// correct `e`!

impl From<PlotArgsError> for CalviewError {
    fn from(e: PlotArgsError) -> Self {
        match e {
            PlotArgsError::NoCalTable
            | PlotArgsError::BadRange { .. }
            | PlotArgsError::BadTolerance(_)
            | PlotArgsError::BadXAxis(_)
            | PlotArgsError::BadMadSigma(_)
            | PlotArgsError::NothingSelected { .. } => Self::Plot(e.to_string()),
            PlotArgsError::Selection(e) => Self::from(e),
            PlotArgsError::Solutions(e) => Self::from(e),
            PlotArgsError::Layout(e) => Self::from(e),
            PlotArgsError::IO(e) => Self::from(e),
        }
    }
}

impl From<PlotError> for CalviewError {
    fn from(e: PlotError) -> Self {
        match e {
            PlotError::Layout(e) => Self::from(e),
            PlotError::Json(e) => Self::from(e),
            PlotError::IO(e) => Self::from(e),
        }
    }
}

impl From<SelectionError> for CalviewError {
    fn from(e: SelectionError) -> Self {
        Self::Selection(e.to_string())
    }
}

impl From<SolutionsReadError> for CalviewError {
    fn from(e: SolutionsReadError) -> Self {
        Self::Solutions(e.to_string())
    }
}

impl From<LayoutError> for CalviewError {
    fn from(e: LayoutError) -> Self {
        let s = e.to_string();
        match e {
            LayoutError::UnsupportedGrid { .. }
            | LayoutError::BadSubplot { .. }
            | LayoutError::BadOverlay { .. }
            | LayoutError::BadYAxis { .. } => Self::Plot(s),
            LayoutError::NoHistory
            | LayoutError::Quit
            | LayoutError::EmptyDimension { .. }
            | LayoutError::TimesPerSpwMismatch { .. }
            | LayoutError::BadTimeIndex { .. } => Self::Layout(s),
        }
    }
}

impl From<UnitParseError> for CalviewError {
    fn from(e: UnitParseError) -> Self {
        Self::Generic(e.to_string())
    }
}

// Library errors.

impl From<std::io::Error> for CalviewError {
    fn from(e: std::io::Error) -> Self {
        Self::Generic(e.to_string())
    }
}

impl From<serde_json::Error> for CalviewError {
    fn from(e: serde_json::Error) -> Self {
        Self::Generic(e.to_string())
    }
}

impl From<toml::ser::Error> for CalviewError {
    fn from(e: toml::ser::Error) -> Self {
        Self::Generic(e.to_string())
    }
}
