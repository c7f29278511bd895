// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to read dumps of calibration tables. A dump is a json or toml view of
//! a table's rows and metadata; native calibration-table formats are handled
//! elsewhere.
//!
//! Per-channel gains are stored as `[pol][chan][re, im]`, and optional flags
//! as `[pol][chan]`. Polynomial rows carry a `poly` table instead.

use std::{fs::File, io::Read, path::Path, str::FromStr};

use log::{debug, trace};
use ndarray::prelude::*;
use num_complex::Complex64;
use serde::Deserialize;

use super::{CalTable, CalTableType, PolyMode, PolySolution, SolutionKind, SolutionRow};
use super::SolutionsReadError;

#[derive(Debug, Deserialize)]
struct TableDump {
    #[serde(default)]
    name: String,

    #[serde(default)]
    antenna_names: Vec<String>,

    #[serde(default)]
    field_names: Vec<String>,

    #[serde(default)]
    pol_names: Vec<String>,

    spw_freqs_ghz: Vec<Vec<f64>>,

    #[serde(default)]
    rows: Vec<RowDump>,
}

#[derive(Debug, Deserialize)]
struct RowDump {
    antenna: usize,
    spw: usize,
    #[serde(default)]
    field: usize,
    time: f64,
    #[serde(default)]
    interval: f64,
    gains: Option<Vec<Vec<[f64; 2]>>>,
    flags: Option<Vec<Vec<bool>>>,
    poly: Option<PolyDump>,
}

#[derive(Debug, Deserialize)]
struct PolyDump {
    #[serde(default = "default_poly_mode")]
    amp_mode: String,
    #[serde(default = "default_poly_mode")]
    phase_mode: String,
    #[serde(default)]
    coeff_amp: Vec<f64>,
    #[serde(default)]
    coeff_phase: Vec<f64>,
    valid_domain_ghz: [f64; 2],
    n_poly_amp: usize,
    n_poly_phase: usize,
}

fn default_poly_mode() -> String {
    "A&P".to_string()
}

pub(super) fn read(file: &Path, table_type: CalTableType) -> Result<CalTable, SolutionsReadError> {
    let mut contents = String::new();
    File::open(file)?.read_to_string(&mut contents)?;
    parse(&contents, table_type, &file.display().to_string())
}

pub(super) fn parse(
    contents: &str,
    table_type: CalTableType,
    file: &str,
) -> Result<CalTable, SolutionsReadError> {
    let dump: TableDump = match table_type {
        CalTableType::Json => {
            serde_json::from_str(contents).map_err(|err| SolutionsReadError::Json {
                file: file.to_string(),
                err,
            })?
        }
        CalTableType::Toml => toml::from_str(contents).map_err(|err| SolutionsReadError::Toml {
            file: file.to_string(),
            err,
        })?,
    };
    trace!("Decoded {} rows from {file}", dump.rows.len());
    convert(dump)
}

fn convert(dump: TableDump) -> Result<CalTable, SolutionsReadError> {
    let TableDump {
        name,
        mut antenna_names,
        mut field_names,
        mut pol_names,
        spw_freqs_ghz,
        rows,
    } = dump;

    // Fill in any missing names with the IDs themselves.
    if antenna_names.is_empty() {
        if let Some(max) = rows.iter().map(|r| r.antenna).max() {
            antenna_names = (0..=max).map(|i| i.to_string()).collect();
        }
    }
    if field_names.is_empty() {
        if let Some(max) = rows.iter().map(|r| r.field).max() {
            field_names = (0..=max).map(|i| i.to_string()).collect();
        }
    }
    if pol_names.is_empty() {
        let num_pols = rows
            .iter()
            .map(|r| match (&r.gains, &r.poly) {
                (Some(g), _) => g.len(),
                (None, Some(p)) if p.n_poly_amp > 0 => p.coeff_amp.len() / p.n_poly_amp,
                (None, Some(p)) if p.n_poly_phase > 0 => p.coeff_phase.len() / p.n_poly_phase,
                _ => 0,
            })
            .max()
            .unwrap_or(0);
        pol_names = (0..num_pols).map(|i| i.to_string()).collect();
    }

    let mut out_rows = Vec::with_capacity(rows.len());
    for (i_row, row) in rows.into_iter().enumerate() {
        let bad_id = |thing, id, available| SolutionsReadError::BadId {
            row: i_row,
            thing,
            id,
            available,
        };
        if row.antenna >= antenna_names.len() {
            return Err(bad_id("antenna", row.antenna, antenna_names.len()));
        }
        if row.field >= field_names.len() {
            return Err(bad_id("field", row.field, field_names.len()));
        }
        let num_chans = match spw_freqs_ghz.get(row.spw) {
            Some(f) => f.len(),
            None => return Err(bad_id("spw", row.spw, spw_freqs_ghz.len())),
        };

        let kind = match (row.gains, row.poly) {
            (Some(gains), None) => {
                per_channel(i_row, gains, row.flags, num_chans, pol_names.len())?
            }
            (None, Some(poly)) => SolutionKind::Polynomial(polynomial(i_row, poly)?),
            (None, None) => return Err(SolutionsReadError::NoSolution { row: i_row }),
            (Some(_), Some(_)) => return Err(SolutionsReadError::AmbiguousSolution { row: i_row }),
        };

        out_rows.push(SolutionRow {
            antenna: row.antenna,
            spw: row.spw,
            field: row.field,
            time: row.time,
            interval: row.interval,
            kind,
        });
    }

    debug!(
        "Calibration table '{name}': {} rows, {} antennas, {} spws, {} fields, {} pols",
        out_rows.len(),
        antenna_names.len(),
        spw_freqs_ghz.len(),
        field_names.len(),
        pol_names.len()
    );

    Ok(CalTable {
        name,
        antenna_names,
        field_names,
        pol_names,
        spw_freqs_ghz,
        rows: out_rows,
    })
}

fn per_channel(
    row: usize,
    gains: Vec<Vec<[f64; 2]>>,
    flags: Option<Vec<Vec<bool>>>,
    num_chans: usize,
    num_pols: usize,
) -> Result<SolutionKind, SolutionsReadError> {
    let bad_shape = |thing, expected, actual| SolutionsReadError::BadShape {
        row,
        thing,
        expected,
        actual,
    };

    if gains.len() != num_pols {
        return Err(bad_shape("gains (polarisations)", num_pols, gains.len()));
    }
    let mut gain_array = Array2::from_elem((num_pols, num_chans), Complex64::default());
    for (mut out, pol) in gain_array.outer_iter_mut().zip(gains.iter()) {
        if pol.len() != num_chans {
            return Err(bad_shape("gains (channels)", num_chans, pol.len()));
        }
        out.iter_mut()
            .zip(pol.iter())
            .for_each(|(o, [re, im])| *o = Complex64::new(*re, *im));
    }

    let mut flag_array = Array2::from_elem((num_pols, num_chans), false);
    if let Some(flags) = flags {
        if flags.len() != num_pols {
            return Err(bad_shape("flags (polarisations)", num_pols, flags.len()));
        }
        for (mut out, pol) in flag_array.outer_iter_mut().zip(flags.iter()) {
            if pol.len() != num_chans {
                return Err(bad_shape("flags (channels)", num_chans, pol.len()));
            }
            out.iter_mut().zip(pol.iter()).for_each(|(o, f)| *o = *f);
        }
    }

    Ok(SolutionKind::PerChannel {
        gains: gain_array,
        flags: flag_array,
    })
}

fn polynomial(row: usize, poly: PolyDump) -> Result<PolySolution, SolutionsReadError> {
    let mode = |s: String| {
        PolyMode::from_str(&s).map_err(|_| SolutionsReadError::BadPolyMode { row, got: s })
    };
    let amp_mode = mode(poly.amp_mode)?;
    let phase_mode = mode(poly.phase_mode)?;

    for (thing, coeffs, n) in [
        ("amplitude coefficients", &poly.coeff_amp, poly.n_poly_amp),
        ("phase coefficients", &poly.coeff_phase, poly.n_poly_phase),
    ] {
        if coeffs.len() < n || (n > 0 && coeffs.len() % n != 0) {
            // Round up to the next whole number of polarisations.
            let expected = n * ((coeffs.len() + n.max(1) - 1) / n.max(1)).max(1);
            return Err(SolutionsReadError::BadShape {
                row,
                thing,
                expected,
                actual: coeffs.len(),
            });
        }
    }

    Ok(PolySolution {
        amp_mode,
        phase_mode,
        coeff_amp: poly.coeff_amp,
        coeff_phase: poly.coeff_phase,
        valid_domain_ghz: (poly.valid_domain_ghz[0], poly.valid_domain_ghz[1]),
        n_poly_amp: poly.n_poly_amp,
        n_poly_phase: poly.n_poly_phase,
    })
}
