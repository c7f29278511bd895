// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tolerance-based ("sloppy") timestamp matching.
//!
//! Timestamps written by independent subsystems rarely agree bit-for-bit, so
//! two times are considered equal when they differ by less than a threshold.
//! Note that this is *not* an equivalence relation; chains of times that are
//! each within the threshold of their neighbours are reduced greedily, in
//! order, and the results depend on the order of the input.


use hifitime::Epoch;
use indexmap::IndexMap;
use log::trace;

use crate::solutions::SolutionRow;

/// Find which of the `candidates` is within `threshold` of `value` (strictly
/// less than). If more than one candidate matches, the index of the *last*
/// match is returned.
pub fn sloppy_match(value: f64, candidates: &[f64], threshold: f64) -> Option<usize> {
    let mut matched = None;
    for (i, &candidate) in candidates.iter().enumerate() {
        if (value - candidate).abs() < threshold {
            matched = Some(i);
        }
    }
    matched
}

/// Reduce `values` to those that are not within `threshold` of any
/// previously-kept value. The first value is always kept, and the relative
/// order of the kept values is preserved.
pub fn sloppy_unique(values: &[f64], threshold: f64) -> Vec<f64> {
    let mut kept: Vec<f64> = Vec::with_capacity(values.len());
    for &value in values {
        if kept.is_empty() || sloppy_match(value, &kept, threshold).is_none() {
            kept.push(value);
        }
    }
    kept
}

/// Is `time` one of the selected unique times? `selected` holds indices into
/// `unique_times`; out-of-range indices are ignored.
pub fn time_is_selected(
    time: f64,
    unique_times: &[f64],
    selected: &[usize],
    threshold: f64,
) -> bool {
    let selected_times = selected
        .iter()
        .filter_map(|&i| unique_times.get(i).copied())
        .collect::<Vec<_>>();
    sloppy_match(time, &selected_times, threshold).is_some()
}

/// The representative timestamps of a calibration table, per (spw, field) as
/// well as across the whole table.
#[derive(Debug, Clone, Default)]
pub struct UniqueTimeSet {
    per_spw_field: IndexMap<(usize, usize), Vec<f64>>,
    all: Vec<f64>,
    threshold: f64,
}

impl UniqueTimeSet {
    /// Reduce the times of all supplied rows. The keys are ordered by first
    /// appearance; the times are sorted before being reduced, so every list
    /// of times is chronological.
    pub fn from_rows<'a, I>(rows: I, threshold: f64) -> UniqueTimeSet
    where
        I: IntoIterator<Item = &'a SolutionRow>,
    {
        let mut raw: IndexMap<(usize, usize), Vec<f64>> = IndexMap::new();
        let mut all_raw = vec![];
        for row in rows {
            raw.entry((row.spw, row.field)).or_default().push(row.time);
            all_raw.push(row.time);
        }

        let per_spw_field = raw
            .into_iter()
            .map(|(key, mut times)| {
                times.sort_by(f64::total_cmp);
                (key, sloppy_unique(&times, threshold))
            })
            .collect::<IndexMap<_, _>>();
        all_raw.sort_by(f64::total_cmp);
        let all = sloppy_unique(&all_raw, threshold);
        trace!(
            "{} unique times across {} (spw, field) pairs",
            all.len(),
            per_spw_field.len()
        );

        UniqueTimeSet {
            per_spw_field,
            all,
            threshold,
        }
    }

    /// The unique times of the whole table.
    pub fn all_times(&self) -> &[f64] {
        &self.all
    }

    pub fn get(&self, spw: usize, field: usize) -> Option<&[f64]> {
        self.per_spw_field.get(&(spw, field)).map(|v| v.as_slice())
    }

    /// The unique times of a spw over the supplied fields, in the order of
    /// [`UniqueTimeSet::all_times`].
    pub fn for_spw(&self, spw: usize, fields: &[usize]) -> Vec<f64> {
        let mut times = vec![];
        for field in fields {
            if let Some(t) = self.per_spw_field.get(&(spw, *field)) {
                times.extend_from_slice(t);
            }
        }
        self.all
            .iter()
            .copied()
            .filter(|&t| sloppy_match(t, &times, self.threshold).is_some())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&(usize, usize), &Vec<f64>)> {
        self.per_spw_field.iter()
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

/// Format a time in MJD seconds (the convention of calibration tables) as a
/// UTC string.
pub fn format_mjd_seconds(mjd_seconds: f64) -> String {
    let epoch = Epoch::from_mjd_utc(mjd_seconds / 86400.0);
    let (y, m, d, h, min, s, _) = epoch.to_gregorian_utc();
    format!("{y:04}/{m:02}/{d:02}/{h:02}:{min:02}:{s:02}")
}
