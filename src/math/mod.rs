// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Robust statistics over per-channel curves.
//!
//! NaN values (e.g. flagged channels) never take part in a median, and can
//! never be reported as outliers.

#[cfg(test)]
mod tests;

use indexmap::IndexMap;
use log::warn;
use serde::Serialize;

use crate::constants::MAD_NORMALISATION;

/// The median of the non-NaN values of `a`. NaN if there are none.
pub fn median(a: &[f64]) -> f64 {
    let mut sorted: Vec<f64> = a.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return f64::NAN;
    }
    sorted.sort_unstable_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// The median absolute deviation of `a`, normalised so that it estimates the
/// standard deviation of Gaussian data.
pub fn mad(a: &[f64]) -> f64 {
    let m = median(a);
    let deviations: Vec<f64> = a.iter().map(|v| (v - m).abs()).collect();
    median(&deviations) / MAD_NORMALISATION
}

/// The derivative of `y` with respect to `x`, scaled by the first channel
/// spacing, and the midpoints of `x`. Both outputs are one element shorter
/// than the inputs. If there aren't at least two `x`s, the inputs are given
/// back unchanged.
pub fn channel_difference(y: &[f64], x: &[f64]) -> (Vec<f64>, Vec<f64>) {
    if x.len() <= 1 || y.len() <= 1 {
        return (y.to_vec(), x.to_vec());
    }

    let spacing = x[1] - x[0];
    let (dy, x_mid) = y
        .windows(2)
        .zip(x.windows(2))
        .map(|(y, x)| ((y[1] - y[0]) / (x[1] - x[0]) * spacing, (x[0] + x[1]) / 2.0))
        .unzip();
    (dy, x_mid)
}

/// The result of searching a curve for MAD outliers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierReport {
    /// The (normalised) MAD of the channels that weren't excluded as edges.
    pub mad: f64,

    /// Channels whose absolute value exceeds `mad_sigma * mad`.
    pub exceeding_channels: Vec<usize>,

    /// `|a[worst_channel]| / mad`. NaN if there's no worst channel.
    pub worst_value: f64,

    /// The channel with the largest absolute value. On ties, the first one.
    pub worst_channel: Option<usize>,

    /// The number of channels excluded from each end of the curve. This may
    /// be smaller than the requested number.
    pub edge: usize,
}

/// Find the channels of `a` that are more than `mad_sigma` MADs from 0,
/// ignoring `edge` channels at each end.
///
/// If `edge` would leave no channels, it is clamped and a warning is logged.
pub fn mad_info(a: &[f64], mad_sigma: f64, edge: usize) -> OutlierReport {
    let n = a.len();
    if n == 0 {
        return OutlierReport {
            mad: f64::NAN,
            exceeding_channels: vec![],
            worst_value: f64::NAN,
            worst_channel: None,
            edge: 0,
        };
    }

    let mut used_edge = edge;
    if edge >= n / 2 {
        used_edge = if n % 2 == 0 { n / 2 - 1 } else { n / 2 };
        if used_edge != edge {
            warn!("Edge of {edge} channels is too big for {n} channels; using {used_edge} instead");
        }
    }

    let interior = &a[used_edge..n - used_edge];
    let mad_value = mad(interior);

    let mut exceeding_channels = vec![];
    let mut worst: Option<(usize, f64)> = None;
    for (i, v) in interior.iter().enumerate() {
        let chan = i + used_edge;
        let abs = v.abs();
        if abs > mad_sigma * mad_value {
            exceeding_channels.push(chan);
        }
        match worst {
            Some((_, w)) if abs <= w => (),
            _ if abs.is_nan() => (),
            _ => worst = Some((chan, abs)),
        }
    }

    OutlierReport {
        mad: mad_value,
        exceeding_channels,
        worst_value: worst.map(|(_, w)| w / mad_value).unwrap_or(f64::NAN),
        worst_channel: worst.map(|(c, _)| c),
        edge: used_edge,
    }
}

/// Identifies a single curve's [`OutlierReport`]. The time is an index into
/// the unique times of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MadKey {
    pub antenna: usize,
    pub spw: usize,
    pub time: usize,
    pub pol: usize,
}

/// Outlier reports of many curves.
#[derive(Debug, Clone, Default)]
pub struct MadStats {
    reports: IndexMap<MadKey, OutlierReport>,
}

impl MadStats {
    pub fn new() -> MadStats {
        MadStats::default()
    }

    /// Add a report, replacing any that already exists for the same key.
    pub fn insert(&mut self, key: MadKey, report: OutlierReport) {
        self.reports.insert(key, report);
    }

    pub fn get(&self, key: &MadKey) -> Option<&OutlierReport> {
        self.reports.get(key)
    }

    /// Iterate over the reports in the order they were inserted.
    pub fn iter(&self) -> impl Iterator<Item = (&MadKey, &OutlierReport)> {
        self.reports.iter()
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}

/// For every (spw, time, pol), the median of the MADs of all antennas.
/// Reports with a NaN MAD are ignored. The keys come out in the order they
/// were first seen.
pub fn median_across_antennas(stats: &MadStats) -> IndexMap<(usize, usize, usize), f64> {
    let mut groups: IndexMap<(usize, usize, usize), Vec<f64>> = IndexMap::new();
    for (key, report) in stats.iter() {
        groups
            .entry((key.spw, key.time, key.pol))
            .or_default()
            .push(report.mad);
    }
    groups
        .into_iter()
        .map(|(k, mads)| (k, median(&mads)))
        .collect()
}
