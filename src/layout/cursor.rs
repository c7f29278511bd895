// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The space of panels that can be plotted, and positions within it.

use std::str::FromStr;

use serde::Serialize;
use strum_macros::Display;

use super::LayoutError;
use crate::{
    selection::Selection,
    timestamps::{sloppy_match, time_is_selected, UniqueTimeSet},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AmpPhase {
    #[strum(serialize = "amp")]
    Amp,

    #[strum(serialize = "phase")]
    Phase,
}

/// Which quantities get their own panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum YAxis {
    #[strum(serialize = "amp")]
    Amp,

    #[strum(serialize = "phase")]
    Phase,

    #[strum(serialize = "both")]
    Both,
}

impl YAxis {
    pub fn components(self) -> Vec<AmpPhase> {
        match self {
            YAxis::Amp => vec![AmpPhase::Amp],
            YAxis::Phase => vec![AmpPhase::Phase],
            YAxis::Both => vec![AmpPhase::Amp, AmpPhase::Phase],
        }
    }
}

impl FromStr for YAxis {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<YAxis, LayoutError> {
        match s.trim().to_lowercase().as_str() {
            "amp" | "amplitude" => Ok(YAxis::Amp),
            "phase" => Ok(YAxis::Phase),
            "both" | "amp,phase" => Ok(YAxis::Both),
            _ => Err(LayoutError::BadYAxis { got: s.to_string() }),
        }
    }
}

/// Which dimensions are drawn as multiple series in a single panel rather
/// than across panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum OverlayMode {
    #[strum(serialize = "none")]
    None,

    #[strum(serialize = "antenna")]
    Antenna,

    #[strum(serialize = "time")]
    Time,

    #[strum(serialize = "antenna,time")]
    AntennaTime,
}

impl OverlayMode {
    pub fn overlays_antennas(self) -> bool {
        matches!(self, OverlayMode::Antenna | OverlayMode::AntennaTime)
    }

    pub fn overlays_times(self) -> bool {
        matches!(self, OverlayMode::Time | OverlayMode::AntennaTime)
    }
}

impl FromStr for OverlayMode {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<OverlayMode, LayoutError> {
        let mut antenna = false;
        let mut time = false;
        for token in s.split(',').map(|t| t.trim().to_lowercase()) {
            match token.as_str() {
                "antenna" => antenna = true,
                "time" => time = true,
                "none" | "" => (),
                _ => return Err(LayoutError::BadOverlay { got: s.to_string() }),
            }
        }
        Ok(match (antenna, time) {
            (false, false) => OverlayMode::None,
            (true, false) => OverlayMode::Antenna,
            (false, true) => OverlayMode::Time,
            (true, true) => OverlayMode::AntennaTime,
        })
    }
}

/// The shape of the grid of panels on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubplotGrid {
    rows: usize,
    cols: usize,
}

impl SubplotGrid {
    const SUPPORTED: [(usize, usize); 4] = [(1, 1), (2, 2), (3, 2), (4, 2)];

    pub fn new(rows: usize, cols: usize) -> Result<SubplotGrid, LayoutError> {
        if Self::SUPPORTED.contains(&(rows, cols)) {
            Ok(SubplotGrid { rows, cols })
        } else {
            Err(LayoutError::UnsupportedGrid { rows, cols })
        }
    }

    pub fn rows(self) -> usize {
        self.rows
    }

    pub fn cols(self) -> usize {
        self.cols
    }

    /// The number of panels on a full page.
    pub fn capacity(self) -> usize {
        self.rows * self.cols
    }
}

impl Default for SubplotGrid {
    fn default() -> Self {
        let (rows, cols) = crate::constants::DEFAULT_SUBPLOT;
        SubplotGrid { rows, cols }
    }
}

impl std::fmt::Display for SubplotGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// Accepts "RxC" or a two-digit subplot code like "22" (2 rows, 2 columns).
impl FromStr for SubplotGrid {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<SubplotGrid, LayoutError> {
        let bad = || LayoutError::BadSubplot { got: s.to_string() };
        let t = s.trim().to_lowercase();
        let (rows, cols) = match t.split_once('x') {
            Some((r, c)) => (
                r.trim().parse().map_err(|_| bad())?,
                c.trim().parse().map_err(|_| bad())?,
            ),
            None => {
                let digits: Vec<usize> = t
                    .chars()
                    .map(|c| c.to_digit(10).map(|d| d as usize))
                    .collect::<Option<_>>()
                    .ok_or_else(bad)?;
                match digits.as_slice() {
                    [r, c] => (*r, *c),
                    _ => return Err(bad()),
                }
            }
        };
        SubplotGrid::new(rows, cols)
    }
}

/// A position in a [`CursorSpace`]. Every member is an index into the
/// space's lists, not an ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PanelCursor {
    pub antenna: usize,
    pub spw: usize,
    /// An index into the valid times of the current spw.
    pub time: usize,
    pub amp_phase: usize,
}

/// Everything needed to draw a single panel.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelKey {
    /// Antenna IDs. More than one when antennas are overlaid.
    pub antennas: Vec<usize>,
    pub spw: usize,
    /// Indices into the unique times. More than one when times are overlaid.
    pub time_indices: Vec<usize>,
    /// The unique times corresponding to `time_indices` \[MJD seconds\].
    pub times: Vec<f64>,
    pub amp_phase: AmpPhase,
}

/// The dimensions that panels iterate over, nested as
/// antenna > spw > time > amp/phase.
#[derive(Debug, Clone)]
pub struct CursorSpace {
    antennas: Vec<usize>,
    spws: Vec<usize>,
    unique_times: Vec<f64>,
    /// For each spw, the indices into `unique_times` valid for it.
    times_per_spw: Vec<Vec<usize>>,
    amp_phase: Vec<AmpPhase>,
    overlay: OverlayMode,
}

impl CursorSpace {
    pub fn new(
        antennas: Vec<usize>,
        spws: Vec<usize>,
        unique_times: Vec<f64>,
        times_per_spw: Vec<Vec<usize>>,
        y_axis: YAxis,
        overlay: OverlayMode,
    ) -> Result<CursorSpace, LayoutError> {
        if antennas.is_empty() {
            return Err(LayoutError::EmptyDimension {
                dimension: "antennas",
            });
        }
        if spws.is_empty() {
            return Err(LayoutError::EmptyDimension { dimension: "spws" });
        }
        if spws.len() != times_per_spw.len() {
            return Err(LayoutError::TimesPerSpwMismatch {
                spws: spws.len(),
                time_lists: times_per_spw.len(),
            });
        }
        if let Some(&index) = times_per_spw
            .iter()
            .flatten()
            .find(|&&i| i >= unique_times.len())
        {
            return Err(LayoutError::BadTimeIndex {
                index,
                num_times: unique_times.len(),
            });
        }
        if times_per_spw.iter().all(|t| t.is_empty()) {
            return Err(LayoutError::EmptyDimension { dimension: "times" });
        }
        Ok(CursorSpace {
            antennas,
            spws,
            unique_times,
            times_per_spw,
            amp_phase: y_axis.components(),
            overlay,
        })
    }

    /// Build a space from selected antennas and spws. A unique time is valid
    /// for a spw if it matches one of that spw's times in the selected
    /// fields, and (if given) is in the time selection.
    #[allow(clippy::too_many_arguments)]
    pub fn from_times(
        antennas: &Selection,
        spws: &Selection,
        fields: &Selection,
        times: &UniqueTimeSet,
        time_selection: Option<&Selection>,
        y_axis: YAxis,
        overlay: OverlayMode,
    ) -> Result<CursorSpace, LayoutError> {
        let unique_times = times.all_times().to_vec();
        let threshold = times.threshold();
        let times_per_spw = spws
            .iter()
            .map(|&spw| {
                let spw_times = times.for_spw(spw, fields.as_slice());
                unique_times
                    .iter()
                    .enumerate()
                    .filter(|&(_, &t)| sloppy_match(t, &spw_times, threshold).is_some())
                    .filter(|&(_, &t)| match time_selection {
                        Some(sel) => time_is_selected(t, &unique_times, sel.as_slice(), threshold),
                        None => true,
                    })
                    .map(|(i, _)| i)
                    .collect()
            })
            .collect();
        CursorSpace::new(
            antennas.as_slice().to_vec(),
            spws.as_slice().to_vec(),
            unique_times,
            times_per_spw,
            y_axis,
            overlay,
        )
    }

    pub fn overlay(&self) -> OverlayMode {
        self.overlay
    }

    pub fn unique_times(&self) -> &[f64] {
        &self.unique_times
    }

    fn first_spw_from(&self, start: usize) -> Option<usize> {
        (start..self.spws.len()).find(|&i| !self.times_per_spw[i].is_empty())
    }

    /// The first position. `None` is impossible for a space made with
    /// [`CursorSpace::new`], but is handled anyway.
    pub fn first(&self) -> Option<PanelCursor> {
        self.first_spw_from(0).map(|spw| PanelCursor {
            antenna: 0,
            spw,
            time: 0,
            amp_phase: 0,
        })
    }

    /// The position after `cursor`, or `None` if `cursor` is the last one.
    /// Overlaid dimensions never change.
    pub fn next(&self, cursor: PanelCursor) -> Option<PanelCursor> {
        let mut c = cursor;

        c.amp_phase += 1;
        if c.amp_phase < self.amp_phase.len() {
            return Some(c);
        }
        c.amp_phase = 0;

        if !self.overlay.overlays_times() {
            c.time += 1;
            if c.time < self.times_per_spw[c.spw].len() {
                return Some(c);
            }
        }
        c.time = 0;

        if let Some(spw) = self.first_spw_from(c.spw + 1) {
            c.spw = spw;
            return Some(c);
        }
        c.spw = self.first_spw_from(0)?;

        if !self.overlay.overlays_antennas() {
            c.antenna += 1;
            if c.antenna < self.antennas.len() {
                return Some(c);
            }
        }
        None
    }

    pub fn num_positions(&self) -> usize {
        std::iter::successors(self.first(), |&c| self.next(c)).count()
    }

    pub fn key(&self, cursor: PanelCursor) -> PanelKey {
        let antennas = if self.overlay.overlays_antennas() {
            self.antennas.clone()
        } else {
            vec![self.antennas[cursor.antenna]]
        };
        let spw_times = &self.times_per_spw[cursor.spw];
        let time_indices = if self.overlay.overlays_times() {
            spw_times.clone()
        } else {
            vec![spw_times[cursor.time]]
        };
        PanelKey {
            antennas,
            spw: self.spws[cursor.spw],
            times: time_indices.iter().map(|&i| self.unique_times[i]).collect(),
            time_indices,
            amp_phase: self.amp_phase[cursor.amp_phase],
        }
    }
}
