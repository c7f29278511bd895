// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All constants *must* be double precision.
 */

/// Timestamps from independent subsystems are considered the same if they
/// differ by less than this many seconds.
pub const DEFAULT_TIME_TOLERANCE_S: f64 = 30.0;

/// The normal-distribution consistency constant used to turn a median absolute
/// deviation into a standard-deviation-like scale. MAD = median(|x - median(x)|)
/// / MAD_NORMALISATION.
pub const MAD_NORMALISATION: f64 = 0.6745;

/// Channels with absolute values larger than this many MADs are reported as
/// outliers.
pub const DEFAULT_MAD_SIGMA: f64 = 3.0;

/// The number of edge channels on each side of a spectral window to exclude
/// from outlier statistics.
pub const DEFAULT_EDGE_CHANNELS: usize = 0;

/// The fraction of a panel's y range to leave free above a rescaled
/// atmospheric curve.
pub const DEFAULT_ATM_TOP_MARGIN: f64 = 0.25;

/// When a BPOLY amplitude curve has no per-channel counterpart, it is centred
/// on this value (a normalised bandpass).
pub const DEFAULT_BPOLY_AMP_MEAN: f64 = 1.0;

/// The default panel grid (rows, columns).
pub const DEFAULT_SUBPLOT: (usize, usize) = (2, 2);
