// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Chebyshev-polynomial ("BPOLY") bandpass models.

use serde::Serialize;
use strum_macros::{Display, EnumString};
use thiserror::Error;

/// Which parts of a BPOLY solution were actually solved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum PolyMode {
    #[strum(serialize = "A&P")]
    AmpAndPhase,

    #[strum(serialize = "A")]
    Amp,

    #[strum(serialize = "P")]
    Phase,
}

impl PolyMode {
    pub fn has_amp(self) -> bool {
        matches!(self, PolyMode::AmpAndPhase | PolyMode::Amp)
    }

    pub fn has_phase(self) -> bool {
        matches!(self, PolyMode::AmpAndPhase | PolyMode::Phase)
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum PolyError {
    #[error("The polynomial's valid domain ({lo} GHz, {hi} GHz) has no width")]
    DegenerateDomain { lo: f64, hi: f64 },
}

/// Evaluate a Chebyshev series at each of the `freq`s, after mapping
/// `valid_domain` onto [-1, 1].
///
/// The constant term is always treated as 0, whatever `coeff[0]` is; callers
/// re-centre the resulting curves themselves.
pub fn evaluate(
    coeff: &[f64],
    valid_domain: (f64, f64),
    freq: &[f64],
) -> Result<Vec<f64>, PolyError> {
    let (lo, hi) = valid_domain;
    let width = hi - lo;
    if width.abs() < f64::EPSILON || !width.is_finite() {
        return Err(PolyError::DegenerateDomain { lo, hi });
    }

    let values = freq
        .iter()
        .map(|&f| {
            let u = -1.0 + 2.0 * (f - lo) / width;
            let mut sum = 0.0;
            if let Some(c1) = coeff.get(1) {
                sum += c1 * u;
            }
            // T_k = 2u T_{k-1} - T_{k-2}
            let mut t_prev = 1.0;
            let mut t_curr = u;
            for c in coeff.iter().skip(2) {
                let t_next = 2.0 * u * t_curr - t_prev;
                sum += c * t_next;
                t_prev = t_curr;
                t_curr = t_next;
            }
            sum
        })
        .collect();
    Ok(values)
}

/// Shift `values` so that the mean of their finite elements is `target_mean`.
/// Nothing happens if there are no finite elements.
pub fn recenter(values: &mut [f64], target_mean: f64) {
    let (sum, count) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        return;
    }
    let offset = target_mean - sum / count as f64;
    values.iter_mut().for_each(|v| *v += offset);
}

/// The coefficients of a single BPOLY solution row.
#[derive(Debug, Clone, PartialEq)]
pub struct PolySolution {
    pub amp_mode: PolyMode,
    pub phase_mode: PolyMode,

    /// The amplitude coefficients of all polarisations; polarisation `p` uses
    /// `coeff_amp[p * n_poly_amp..(p + 1) * n_poly_amp]`.
    pub coeff_amp: Vec<f64>,

    /// The phase coefficients of all polarisations \[radians\], laid out like
    /// `coeff_amp`.
    pub coeff_phase: Vec<f64>,

    /// \[GHz\]
    pub valid_domain_ghz: (f64, f64),

    pub n_poly_amp: usize,
    pub n_poly_phase: usize,
}

/// Curves evaluated from a [`PolySolution`]. The outer dimension of
/// `amplitude` and `phase_deg` is polarisation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolynomialCurve {
    pub freq_ghz: Vec<f64>,
    pub amplitude: Vec<Vec<f64>>,
    pub phase_deg: Vec<Vec<f64>>,
}

impl PolySolution {
    pub fn amp_coeffs(&self, pol: usize) -> Option<&[f64]> {
        self.coeff_amp
            .get(pol * self.n_poly_amp..(pol + 1) * self.n_poly_amp)
            .filter(|c| !c.is_empty())
    }

    pub fn phase_coeffs(&self, pol: usize) -> Option<&[f64]> {
        self.coeff_phase
            .get(pol * self.n_poly_phase..(pol + 1) * self.n_poly_phase)
            .filter(|c| !c.is_empty())
    }

    /// Evaluate amplitude and phase curves for up to `num_pols` polarisations.
    /// Polarisations without any coefficients are left out. The amplitudes
    /// are not re-centred.
    pub fn curve(&self, freq_ghz: &[f64], num_pols: usize) -> Result<PolynomialCurve, PolyError> {
        let mut amplitude = vec![];
        let mut phase_deg = vec![];
        for pol in 0..num_pols {
            let (amp_coeffs, phase_coeffs) = match (self.amp_coeffs(pol), self.phase_coeffs(pol)) {
                (None, None) => break,
                pair => pair,
            };

            let amp = match amp_coeffs {
                Some(c) if self.amp_mode.has_amp() => evaluate(c, self.valid_domain_ghz, freq_ghz)?,
                _ => vec![0.0; freq_ghz.len()],
            };
            let phase = match phase_coeffs {
                Some(c) if self.phase_mode.has_phase() => {
                    let mut p = evaluate(c, self.valid_domain_ghz, freq_ghz)?;
                    p.iter_mut().for_each(|v| *v = v.to_degrees());
                    p
                }
                _ => vec![0.0; freq_ghz.len()],
            };
            amplitude.push(amp);
            phase_deg.push(phase);
        }

        Ok(PolynomialCurve {
            freq_ghz: freq_ghz.to_vec(),
            amplitude,
            phase_deg,
        })
    }
}
