// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with reading calibration tables.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SolutionsReadError {
    #[error("Tried to read a calibration table with an unsupported extension '{ext}'! Supported formats: {}", *super::CAL_TABLE_EXTENSIONS)]
    UnsupportedExt { ext: String },

    #[error("In row {row}, expected {thing} to have {expected} elements, but it had {actual} instead!")]
    BadShape {
        row: usize,
        /// What was it that wasn't sensible? Gains, flags, etc.
        thing: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Row {row} has neither per-channel gains nor polynomial coefficients")]
    NoSolution { row: usize },

    #[error("Row {row} has both per-channel gains and polynomial coefficients")]
    AmbiguousSolution { row: usize },

    #[error("Row {row} refers to {thing} {id}, but only {available} are described by the table")]
    BadId {
        row: usize,
        thing: &'static str,
        id: usize,
        available: usize,
    },

    #[error("Row {row} has a polynomial mode '{got}' that isn't one of 'A&P', 'A' or 'P'")]
    BadPolyMode { row: usize, got: String },

    #[error("Couldn't decode json structure from {file}:\n{err}")]
    Json {
        file: String,
        err: serde_json::Error,
    },

    #[error("Couldn't decode toml structure from {file}:\n{err}")]
    Toml { file: String, err: toml::de::Error },

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
