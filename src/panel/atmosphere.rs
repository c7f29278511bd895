// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Atmospheric transmission curves. The physical model lives behind
//! [`AtmosphereModel`]; here, curves are only placed onto panels.

use serde::Serialize;

/// What an [`AtmosphereModel`] is asked for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtmosphereRequest {
    pub channels: Vec<usize>,
    pub frequencies_ghz: Vec<f64>,
    pub antenna: usize,
    /// \[MJD seconds\]
    pub time: f64,
    pub field: usize,
    /// Precipitable water vapour \[mm\]
    pub pwv_mm: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AtmosphereResponse {
    /// One value per requested channel, between 0 and 1.
    pub transmission: Vec<f64>,
    pub brightness_temp_k: Vec<f64>,
}

pub trait AtmosphereModel {
    /// `None` if the model can't say anything about the request.
    fn evaluate(&self, request: &AtmosphereRequest) -> Option<AtmosphereResponse>;
}

/// Map `values` linearly so their minimum lands on the bottom of `y_limits`
/// and their maximum leaves `top_margin` (a fraction of the y range) free at
/// the top. A constant curve sits halfway up the usable range. NaNs are left
/// alone.
pub fn rescale_to_panel(values: &[f64], y_limits: (f64, f64), top_margin: f64) -> Vec<f64> {
    let (y_lo, y_hi) = y_limits;
    let usable = (1.0 - top_margin) * (y_hi - y_lo);

    let (v_min, v_max) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if v_min > v_max {
        // Nothing finite.
        return values.to_vec();
    }

    let range = v_max - v_min;
    values
        .iter()
        .map(|&v| {
            if !v.is_finite() {
                v
            } else if range == 0.0 {
                y_lo + 0.5 * usable
            } else {
                y_lo + (v - v_min) / range * usable
            }
        })
        .collect()
}
