// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Turning calibration solutions into panel descriptors.
//!
//! A [`PanelDescriptor`] is everything a renderer needs to draw a panel; no
//! drawing happens in this crate.

mod atmosphere;

pub use atmosphere::{rescale_to_panel, AtmosphereModel, AtmosphereRequest, AtmosphereResponse};

use itertools::Itertools;
use log::{debug, trace, warn};
use serde::Serialize;
use strum_macros::{Display, EnumString};

use crate::{
    constants::{DEFAULT_ATM_TOP_MARGIN, DEFAULT_BPOLY_AMP_MEAN},
    layout::{AmpPhase, PanelKey, PanelOutcome, PanelSource},
    math::{channel_difference, mad_info, MadKey, MadStats, OutlierReport},
    selection::Selection,
    solutions::{poly::recenter, CalTable, SolutionKind, SolutionRow},
    timestamps::{format_mjd_seconds, sloppy_match},
};

/// Colours of successive series in a panel.
pub const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// The colour of atmospheric curves.
pub const ATMOSPHERE_COLOUR: &str = "#ff00ff";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum XAxis {
    #[strum(serialize = "chan")]
    Channel,

    #[strum(serialize = "freq")]
    Frequency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    Solid,
    Dotted,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub label: String,
    pub color: &'static str,
    pub style: LineStyle,
    pub y_values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesOutliers {
    pub label: String,
    pub report: OutlierReport,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelDescriptor {
    pub title: String,
    pub x_values: Vec<f64>,
    pub series: Vec<Series>,
    pub x_limits: (f64, f64),
    pub y_limits: (f64, f64),
    pub annotations: Vec<String>,
    pub outliers: Vec<SeriesOutliers>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MadOptions {
    pub sigma: f64,
    pub edge: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtmosphereOptions {
    pub pwv_mm: f64,
    pub top_margin: f64,
}

impl AtmosphereOptions {
    pub fn with_pwv(pwv_mm: f64) -> AtmosphereOptions {
        AtmosphereOptions {
            pwv_mm,
            top_margin: DEFAULT_ATM_TOP_MARGIN,
        }
    }
}

/// How panels should be made.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotOptions {
    pub x_axis: XAxis,

    /// Polarisation indices.
    pub pols: Selection,

    pub fields: Selection,

    /// Draw flagged channels rather than hiding them.
    pub show_flagged: bool,

    pub channel_diff: bool,

    /// If set, look for MAD outliers in every series.
    pub mad: Option<MadOptions>,

    pub amp_range: Option<(f64, f64)>,
    pub phase_range: Option<(f64, f64)>,

    /// \[seconds\]
    pub time_tolerance: f64,

    pub atmosphere: Option<AtmosphereOptions>,
}

/// Makes [`PanelDescriptor`]s out of a calibration table. Outlier reports of
/// amplitude panels are kept in [`PanelBuilder::mad_stats`].
pub struct PanelBuilder<'a> {
    table: &'a CalTable,

    /// BPOLY amplitudes are centred on the mean of this table's amplitudes.
    reference: Option<&'a CalTable>,

    options: &'a PlotOptions,

    atmosphere_model: Option<&'a dyn AtmosphereModel>,

    mad_stats: MadStats,
}

/// The y values of a single series before any post-processing.
struct RawSeries {
    antenna: usize,
    time_index: usize,
    pol: usize,
    label: String,
    y: Vec<f64>,
}

impl<'a> PanelBuilder<'a> {
    pub fn new(table: &'a CalTable, options: &'a PlotOptions) -> PanelBuilder<'a> {
        PanelBuilder {
            table,
            reference: None,
            options,
            atmosphere_model: None,
            mad_stats: MadStats::new(),
        }
    }

    pub fn with_reference(self, reference: &'a CalTable) -> PanelBuilder<'a> {
        PanelBuilder {
            reference: Some(reference),
            ..self
        }
    }

    pub fn with_atmosphere(self, model: &'a dyn AtmosphereModel) -> PanelBuilder<'a> {
        PanelBuilder {
            atmosphere_model: Some(model),
            ..self
        }
    }

    pub fn mad_stats(&self) -> &MadStats {
        &self.mad_stats
    }

    pub fn into_mad_stats(self) -> MadStats {
        self.mad_stats
    }

    /// The solution row of an antenna and spw at a time. If several rows
    /// match, the last one is used.
    fn find_row(
        &self,
        table: &'a CalTable,
        antenna: usize,
        spw: usize,
        time: f64,
    ) -> Option<&'a SolutionRow> {
        let rows: Vec<&SolutionRow> = table
            .rows_for(antenna, spw, self.options.fields.as_slice())
            .collect();
        let times: Vec<f64> = rows.iter().map(|r| r.time).collect();
        sloppy_match(time, &times, self.options.time_tolerance).map(|i| rows[i])
    }

    /// The mean (finite) per-channel amplitude of the reference table for a
    /// pol.
    fn reference_mean(&self, antenna: usize, spw: usize, time: f64, pol: usize) -> f64 {
        let mean = self
            .reference
            .and_then(|r| self.find_row(r, antenna, spw, time))
            .and_then(|row| match &row.kind {
                SolutionKind::PerChannel { gains, .. } if pol < gains.nrows() => {
                    let (sum, count) = gains
                        .row(pol)
                        .iter()
                        .map(|g| g.norm())
                        .filter(|a| a.is_finite())
                        .fold((0.0, 0usize), |(s, c), a| (s + a, c + 1));
                    (count > 0).then(|| sum / count as f64)
                }
                _ => None,
            });
        mean.unwrap_or(DEFAULT_BPOLY_AMP_MEAN)
    }

    /// Get the curves of a single row. `None` means the row's polynomial
    /// couldn't be evaluated.
    fn row_curves(
        &self,
        row: &SolutionRow,
        amp_phase: AmpPhase,
        unique_time: f64,
    ) -> Option<Vec<(usize, Vec<f64>)>> {
        let pols = self.options.pols.iter().copied();
        match &row.kind {
            SolutionKind::PerChannel { gains, flags } => Some(
                pols.filter(|&p| p < gains.nrows())
                    .map(|p| {
                        let y = gains
                            .row(p)
                            .iter()
                            .zip(flags.row(p).iter())
                            .map(|(g, &flagged)| {
                                if flagged && !self.options.show_flagged {
                                    f64::NAN
                                } else {
                                    match amp_phase {
                                        AmpPhase::Amp => g.norm(),
                                        AmpPhase::Phase => g.arg().to_degrees(),
                                    }
                                }
                            })
                            .collect();
                        (p, y)
                    })
                    .collect(),
            ),

            SolutionKind::Polynomial(poly) => {
                let freqs = &self.table.spw_freqs_ghz[row.spw];
                let curve = match poly.curve(freqs, self.table.num_pols()) {
                    Ok(c) => c,
                    Err(e) => {
                        warn!(
                            "Antenna {} spw {}: {e}; not plotting it",
                            self.table.antenna_name(row.antenna),
                            row.spw
                        );
                        return None;
                    }
                };
                Some(
                    pols.filter(|&p| p < curve.amplitude.len())
                        .map(|p| match amp_phase {
                            AmpPhase::Amp => {
                                let mut y = curve.amplitude[p].clone();
                                let target =
                                    self.reference_mean(row.antenna, row.spw, unique_time, p);
                                recenter(&mut y, target);
                                (p, y)
                            }
                            AmpPhase::Phase => (p, curve.phase_deg[p].clone()),
                        })
                        .collect(),
                )
            }
        }
    }

    fn title(&self, key: &PanelKey) -> String {
        let antennas = match key.antennas.as_slice() {
            [a] => format!("Antenna {}", self.table.antenna_name(*a)),
            many => format!("{} antennas", many.len()),
        };
        let time = match key.times.as_slice() {
            [t] => format_mjd_seconds(*t),
            many => format!("{} times", many.len()),
        };
        let quantity = match key.amp_phase {
            AmpPhase::Amp => "amplitude",
            AmpPhase::Phase => "phase",
        };
        format!("{antennas}  spw {}  {time}  {quantity}", key.spw)
    }

    fn y_limits(&self, amp_phase: AmpPhase, series: &[Series]) -> (f64, f64) {
        let user = match amp_phase {
            AmpPhase::Amp => self.options.amp_range,
            AmpPhase::Phase => self.options.phase_range,
        };
        if let Some(range) = user {
            return range;
        }
        let (lo, hi) = finite_limits(series.iter().flat_map(|s| s.y_values.iter()));
        if lo == hi {
            (lo - 0.5, hi + 0.5)
        } else {
            (lo, hi)
        }
    }

    /// Build the panel for a key, or `None` if there's nothing to show.
    pub fn build(&mut self, key: &PanelKey) -> Option<PanelDescriptor> {
        let table = self.table;
        let freqs = match table.spw_freqs_ghz.get(key.spw) {
            Some(f) => f,
            None => {
                debug!("No frequencies for spw {}", key.spw);
                return None;
            }
        };
        let x: Vec<f64> = match self.options.x_axis {
            XAxis::Channel => (0..freqs.len()).map(|c| c as f64).collect(),
            XAxis::Frequency => freqs.clone(),
        };

        let mut raw = vec![];
        for &antenna in &key.antennas {
            for (&time_index, &time) in key.time_indices.iter().zip(key.times.iter()) {
                let row = match self.find_row(table, antenna, key.spw, time) {
                    Some(r) => r,
                    None => continue,
                };
                let curves = self.row_curves(row, key.amp_phase, time)?;
                for (pol, y) in curves {
                    let mut label = format!(
                        "{} {}",
                        table.antenna_name(antenna),
                        table.pol_name(pol)
                    );
                    if key.times.len() > 1 {
                        label.push(' ');
                        label.push_str(&format_mjd_seconds(time));
                    }
                    raw.push(RawSeries {
                        antenna,
                        time_index,
                        pol,
                        label,
                        y,
                    });
                }
            }
        }

        if raw.iter().all(|r| r.y.iter().all(|v| v.is_nan())) {
            trace!("Nothing to plot for {key:?}");
            return None;
        }

        let mut x_values = x.clone();
        let mut series = Vec::with_capacity(raw.len());
        let mut outliers = vec![];
        let mut annotations = vec![];
        for (i, r) in raw.into_iter().enumerate() {
            let y = if self.options.channel_diff {
                let (dy, x_mid) = channel_difference(&r.y, &x);
                x_values = x_mid;
                dy
            } else {
                r.y
            };

            if let Some(MadOptions { sigma, edge }) = self.options.mad {
                let report = mad_info(&y, sigma, edge);
                if !report.exceeding_channels.is_empty() {
                    annotations.push(format!(
                        "{}: {} channels beyond {sigma} MAD ({})",
                        r.label,
                        report.exceeding_channels.len(),
                        report.exceeding_channels.iter().join(",")
                    ));
                }
                if key.amp_phase == AmpPhase::Amp {
                    self.mad_stats.insert(
                        MadKey {
                            antenna: r.antenna,
                            spw: key.spw,
                            time: r.time_index,
                            pol: r.pol,
                        },
                        report.clone(),
                    );
                }
                outliers.push(SeriesOutliers {
                    label: r.label.clone(),
                    report,
                });
            }

            series.push(Series {
                label: r.label,
                color: PALETTE[i % PALETTE.len()],
                style: LineStyle::Solid,
                y_values: y,
            });
        }

        let x_limits = finite_limits(x_values.iter());
        let y_limits = self.y_limits(key.amp_phase, &series);

        if let (Some(model), Some(atm)) = (self.atmosphere_model, self.options.atmosphere) {
            let request = AtmosphereRequest {
                channels: (0..freqs.len()).collect(),
                frequencies_ghz: freqs.clone(),
                antenna: key.antennas[0],
                time: key.times[0],
                field: self.options.fields.iter().next().copied().unwrap_or(0),
                pwv_mm: atm.pwv_mm,
            };
            match model.evaluate(&request) {
                Some(response) if response.transmission.len() == freqs.len() => {
                    let transmission = if self.options.channel_diff {
                        response
                            .transmission
                            .windows(2)
                            .map(|w| (w[0] + w[1]) / 2.0)
                            .collect()
                    } else {
                        response.transmission
                    };
                    series.push(Series {
                        label: format!("atmosphere (pwv {} mm)", atm.pwv_mm),
                        color: ATMOSPHERE_COLOUR,
                        style: LineStyle::Dotted,
                        y_values: rescale_to_panel(&transmission, y_limits, atm.top_margin),
                    });
                }
                Some(response) => warn!(
                    "The atmosphere model gave {} values for {} channels; ignoring it",
                    response.transmission.len(),
                    freqs.len()
                ),
                None => debug!("No atmosphere curve for {key:?}"),
            }
        }

        Some(PanelDescriptor {
            title: self.title(key),
            x_values,
            series,
            x_limits,
            y_limits,
            annotations,
            outliers,
        })
    }
}

impl PanelSource for PanelBuilder<'_> {
    type Panel = PanelDescriptor;

    fn panel(&mut self, key: &PanelKey) -> PanelOutcome<PanelDescriptor> {
        match self.build(key) {
            Some(p) => PanelOutcome::Panel(p),
            None => PanelOutcome::Skip,
        }
    }
}

/// The smallest and largest finite values. (0, 1) if there are none.
fn finite_limits<'a, I: Iterator<Item = &'a f64>>(values: I) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if lo > hi {
        (0.0, 1.0)
    } else {
        (lo, hi)
    }
}
