// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Antenna-based calibration solutions.
//!
//! A solution is either a per-channel complex gain (a "B" solution) or a set
//! of Chebyshev-polynomial coefficients over frequency (a "BPOLY" solution).
//! The two are unified behind [`SolutionKind`], so code that consumes
//! solutions dispatches once per row.

mod error;
pub mod poly;
pub(crate) mod read;

pub use error::SolutionsReadError;
pub use poly::{PolyError, PolyMode, PolySolution, PolynomialCurve};

use std::{path::Path, str::FromStr};

use itertools::Itertools;
use log::debug;
use ndarray::prelude::*;
use num_complex::Complex64;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::selection::NameTable;

lazy_static::lazy_static! {
    pub(crate) static ref CAL_TABLE_EXTENSIONS: String = CalTableType::iter().join(", ");
}

/// The supported formats of calibration-table dumps.
#[derive(Debug, Display, EnumIter, EnumString)]
pub(crate) enum CalTableType {
    #[strum(serialize = "json")]
    Json,

    #[strum(serialize = "toml")]
    Toml,
}

/// One calibration-solution entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SolutionRow {
    pub antenna: usize,
    pub spw: usize,
    pub field: usize,

    /// The centroid time of the solution interval \[MJD seconds\].
    pub time: f64,

    /// \[seconds\]
    pub interval: f64,

    pub kind: SolutionKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SolutionKind {
    /// Explicit complex gains. Both arrays have dimensions (pol, chan).
    PerChannel {
        gains: Array2<Complex64>,
        flags: Array2<bool>,
    },

    /// Chebyshev-polynomial coefficients.
    Polynomial(PolySolution),
}

impl SolutionKind {
    pub fn is_polynomial(&self) -> bool {
        matches!(self, SolutionKind::Polynomial(_))
    }
}

/// A calibration table: the solution rows and the metadata needed to make
/// sense of them.
#[derive(Debug, Clone, Default)]
pub struct CalTable {
    pub name: String,

    /// The names of all antennas; an antenna's ID is its index.
    pub antenna_names: Vec<String>,

    /// The names of all fields; a field's ID is its index.
    pub field_names: Vec<String>,

    /// The names of the polarisations in the solutions (e.g. "X", "Y").
    pub pol_names: Vec<String>,

    /// The channel frequencies of each spw \[GHz\].
    pub spw_freqs_ghz: Vec<Vec<f64>>,

    pub rows: Vec<SolutionRow>,
}

impl CalTable {
    /// Read a calibration table from a dump. The format of the file is
    /// determined by the file's extension (e.g. ".json").
    pub fn read_from_ext<P: AsRef<Path>>(file: P) -> Result<CalTable, SolutionsReadError> {
        Self::read_from_ext_inner(file.as_ref())
    }

    fn read_from_ext_inner(file: &Path) -> Result<CalTable, SolutionsReadError> {
        let ext = file
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());
        let table_type = match ext.as_deref().and_then(|e| CalTableType::from_str(e).ok()) {
            Some(t) => t,
            None => {
                return Err(SolutionsReadError::UnsupportedExt {
                    ext: ext.unwrap_or_default(),
                })
            }
        };
        debug!("Reading {} as a {table_type} calibration table", file.display());
        read::read(file, table_type)
    }

    pub fn num_antennas(&self) -> usize {
        self.antenna_names.len()
    }

    pub fn num_spws(&self) -> usize {
        self.spw_freqs_ghz.len()
    }

    pub fn num_pols(&self) -> usize {
        self.pol_names.len()
    }

    /// Do all rows have polynomial solutions?
    pub fn is_polynomial(&self) -> bool {
        !self.rows.is_empty() && self.rows.iter().all(|r| r.kind.is_polynomial())
    }

    pub fn antenna_name(&self, antenna: usize) -> String {
        self.antenna_names
            .get(antenna)
            .cloned()
            .unwrap_or_else(|| antenna.to_string())
    }

    pub fn field_name(&self, field: usize) -> String {
        self.field_names
            .get(field)
            .cloned()
            .unwrap_or_else(|| field.to_string())
    }

    pub fn pol_name(&self, pol: usize) -> String {
        self.pol_names
            .get(pol)
            .cloned()
            .unwrap_or_else(|| pol.to_string())
    }

    /// The antenna IDs that actually have solutions, sorted.
    pub fn antennas_with_solutions(&self) -> Vec<usize> {
        self.rows.iter().map(|r| r.antenna).sorted().dedup().collect()
    }

    pub fn spws_with_solutions(&self) -> Vec<usize> {
        self.rows.iter().map(|r| r.spw).sorted().dedup().collect()
    }

    pub fn fields_with_solutions(&self) -> Vec<usize> {
        self.rows.iter().map(|r| r.field).sorted().dedup().collect()
    }

    pub fn antenna_name_table(&self) -> NameTable {
        NameTable::from_names(self.antenna_names.iter().cloned())
    }

    pub fn field_name_table(&self) -> NameTable {
        NameTable::from_names(self.field_names.iter().cloned())
    }

    pub fn pol_name_table(&self) -> NameTable {
        NameTable::from_names(self.pol_names.iter().cloned())
    }

    /// Get the rows of an antenna and spw, restricted to the given fields.
    pub fn rows_for<'a>(
        &'a self,
        antenna: usize,
        spw: usize,
        fields: &'a [usize],
    ) -> impl Iterator<Item = &'a SolutionRow> + 'a {
        self.rows
            .iter()
            .filter(move |r| r.antenna == antenna && r.spw == spw && fields.contains(&r.field))
    }
}
