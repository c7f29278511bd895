// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Print what's in a calibration table.


use std::{borrow::Cow, path::PathBuf};

use clap::Parser;
use itertools::Itertools;
use log::debug;

use super::common::InfoPrinter;
use crate::{
    constants::DEFAULT_TIME_TOLERANCE_S,
    solutions::CalTable,
    timestamps::{format_mjd_seconds, UniqueTimeSet},
    unit_parsing::parse_seconds,
    CalviewError,
};

#[derive(Parser, Debug, Default)]
pub(super) struct InspectArgs {
    /// The calibration table to inspect.
    #[clap(short, long)]
    caltable: PathBuf,

    /// Solution times closer together than this are considered the same. Also
    /// supports a unit (e.g. 30s, 500ms). Default: 30s.
    #[clap(long)]
    time_tolerance: Option<String>,
}

/// A title and its blocks of lines.
type Section = (Cow<'static, str>, Vec<Vec<Cow<'static, str>>>);

impl InspectArgs {
    pub(super) fn run(self, dry_run: bool) -> Result<(), CalviewError> {
        let time_tolerance = match self.time_tolerance.as_deref() {
            Some(s) => parse_seconds(s)?,
            None => DEFAULT_TIME_TOLERANCE_S,
        };
        let table = CalTable::read_from_ext(&self.caltable)?;
        if dry_run {
            debug!("Read {}; not printing anything for a dry run", self.caltable.display());
            return Ok(());
        }

        let times = UniqueTimeSet::from_rows(&table.rows, time_tolerance);
        for (title, blocks) in summarise(&table, &times) {
            let mut printer = InfoPrinter::new(title);
            for block in blocks {
                printer.push_block(block);
            }
            printer.display();
        }
        Ok(())
    }
}

fn summarise(table: &CalTable, times: &UniqueTimeSet) -> Vec<Section> {
    let kind = if table.is_polynomial() {
        "polynomial (BPOLY)"
    } else {
        "per-channel"
    };
    let overview: Section = (
        format!("Calibration table '{}'", table.name).into(),
        vec![vec![
            format!("{} {kind} solutions", table.rows.len()).into(),
            format!(
                "Polarisations: {}",
                (0..table.num_pols()).map(|p| table.pol_name(p)).join(", ")
            )
            .into(),
        ]],
    );

    let antennas: Section = (
        "Antennas".into(),
        vec![table
            .antennas_with_solutions()
            .into_iter()
            .map(|a| {
                let n = table.rows.iter().filter(|r| r.antenna == a).count();
                Cow::from(format!("{a}: {} ({n} solutions)", table.antenna_name(a)))
            })
            .collect()],
    );

    let spws: Section = (
        "Spectral windows".into(),
        vec![table
            .spws_with_solutions()
            .into_iter()
            .map(|s| {
                let freqs = table.spw_freqs_ghz.get(s).map(|f| f.as_slice()).unwrap_or(&[]);
                Cow::from(match (freqs.first(), freqs.last()) {
                    (Some(lo), Some(hi)) => format!(
                        "{s}: {} channels, {lo:.6} - {hi:.6} GHz",
                        freqs.len()
                    ),
                    _ => format!("{s}: no channel frequencies"),
                })
            })
            .collect()],
    );

    let fields: Section = (
        "Fields".into(),
        vec![table
            .fields_with_solutions()
            .into_iter()
            .map(|f| Cow::from(format!("{f}: {}", table.field_name(f))))
            .collect()],
    );

    let unique_times: Section = (
        format!(
            "Unique times (tolerance {}s); timerange selections index these",
            times.threshold()
        )
        .into(),
        vec![times
            .all_times()
            .iter()
            .enumerate()
            .map(|(i, &t)| Cow::from(format!("{i}: {}", format_mjd_seconds(t))))
            .collect()],
    );

    let per_spw_field: Section = (
        "Times per spw and field".into(),
        times
            .iter()
            .map(|(&(spw, field), spw_times)| {
                std::iter::once(Cow::from(format!(
                    "spw {spw}, field {}",
                    table.field_name(field)
                )))
                .chain(
                    spw_times
                        .iter()
                        .map(|&t| Cow::from(format!("  {}", format_mjd_seconds(t)))),
                )
                .collect()
            })
            .collect(),
    );

    vec![overview, antennas, spws, fields, unique_times, per_spw_field]
}
