// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;

use super::*;

#[test]
fn test_median() {
    assert_abs_diff_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
    assert_abs_diff_eq!(median(&[4.0, 1.0, 2.0, 3.0]), 2.5);
    assert_abs_diff_eq!(median(&[5.0, f64::NAN, 1.0]), 3.0);
    assert!(median(&[]).is_nan());
    assert!(median(&[f64::NAN]).is_nan());
}

#[test]
fn test_mad() {
    // Deviations from the median (2) are [1, 1, 0, 0, 2]; their median is 1.
    let result = mad(&[1.0, 3.0, 2.0, 2.0, 4.0]);
    assert_abs_diff_eq!(result, 1.0 / 0.6745, epsilon = 1e-12);

    assert_abs_diff_eq!(mad(&[7.0, 7.0, 7.0]), 0.0);
}

#[test]
fn test_channel_difference() {
    let (dy, x_mid) = channel_difference(&[1.0, 3.0, 7.0], &[10.0, 12.0, 16.0]);
    // Slopes are 1 and 1, scaled by the first spacing (2).
    assert_abs_diff_eq!(dy.as_slice(), [2.0, 2.0].as_slice());
    assert_abs_diff_eq!(x_mid.as_slice(), [11.0, 14.0].as_slice());
}

#[test]
fn test_channel_difference_too_short() {
    let (dy, x_mid) = channel_difference(&[5.0], &[1.0]);
    assert_eq!(dy, vec![5.0]);
    assert_eq!(x_mid, vec![1.0]);

    let (dy, x_mid) = channel_difference(&[], &[]);
    assert!(dy.is_empty());
    assert!(x_mid.is_empty());
}

#[test]
fn test_mad_info_single_spike() {
    let report = mad_info(&[0.0, 0.0, 0.0, 100.0, 0.0, 0.0], 3.0, 0);
    assert_eq!(report.worst_channel, Some(3));
    // The MAD of mostly zeros is 0, so the spike is beyond any multiple of it.
    assert_abs_diff_eq!(report.mad, 0.0);
    assert_eq!(report.exceeding_channels, vec![3]);
    assert_eq!(report.edge, 0);
}

#[test]
fn test_mad_info_nothing_exceeding() {
    let a = [1.0, -1.1, 0.9, -1.0, 1.05, -0.95];
    let report = mad_info(&a, 3.0, 0);
    assert!(report.exceeding_channels.is_empty());
    assert_eq!(report.worst_channel, Some(1));
    assert_abs_diff_eq!(report.worst_value, 1.1 / report.mad, epsilon = 1e-12);
}

#[test]
fn test_mad_info_ties_pick_first() {
    let report = mad_info(&[1.0, -2.0, 2.0, 0.5], 100.0, 0);
    assert_eq!(report.worst_channel, Some(1));
}

#[test]
fn test_mad_info_edges_are_excluded() {
    let a = [1000.0, 1.0, -1.0, 1.0, 50.0, -1.0, 1.0, -1000.0];
    let report = mad_info(&a, 3.0, 1);
    assert_eq!(report.edge, 1);
    assert_eq!(report.exceeding_channels, vec![4]);
    assert_eq!(report.worst_channel, Some(4));

    let report = mad_info(&a, 3.0, 0);
    assert_eq!(report.worst_channel, Some(0));
}

#[test]
fn test_mad_info_edge_clamping() {
    // Even length: clamp to len / 2 - 1.
    let report = mad_info(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3.0, 3);
    assert_eq!(report.edge, 2);
    assert_eq!(report.worst_channel, Some(3));

    // Odd length: clamp to len / 2.
    let report = mad_info(&[1.0, 2.0, 3.0, 4.0, 5.0], 3.0, 10);
    assert_eq!(report.edge, 2);
    assert_eq!(report.worst_channel, Some(2));

    let report = mad_info(&[9.0], 3.0, 1);
    assert_eq!(report.edge, 0);
    assert_eq!(report.worst_channel, Some(0));
}

#[test]
fn test_mad_info_empty_and_nan() {
    let report = mad_info(&[], 3.0, 2);
    assert!(report.mad.is_nan());
    assert!(report.exceeding_channels.is_empty());
    assert!(report.worst_channel.is_none());
    assert!(report.worst_value.is_nan());

    let report = mad_info(&[f64::NAN, 1.0, f64::NAN], 3.0, 0);
    assert_eq!(report.worst_channel, Some(1));
    assert!(report.exceeding_channels.iter().all(|&c| c == 1));

    let report = mad_info(&[f64::NAN, f64::NAN], 3.0, 0);
    assert!(report.worst_channel.is_none());
    assert!(report.exceeding_channels.is_empty());
}

#[test]
fn test_median_across_antennas() {
    let report = |mad| OutlierReport {
        mad,
        exceeding_channels: vec![],
        worst_value: f64::NAN,
        worst_channel: None,
        edge: 0,
    };
    let key = |antenna, spw, time, pol| MadKey {
        antenna,
        spw,
        time,
        pol,
    };

    let mut stats = MadStats::new();
    assert!(stats.is_empty());
    stats.insert(key(0, 0, 0, 0), report(1.0));
    stats.insert(key(1, 0, 0, 0), report(3.0));
    stats.insert(key(2, 0, 0, 0), report(10.0));
    stats.insert(key(0, 0, 0, 1), report(2.0));
    stats.insert(key(1, 0, 0, 1), report(f64::NAN));
    stats.insert(key(0, 1, 2, 0), report(4.0));
    stats.insert(key(1, 1, 2, 0), report(6.0));
    assert_eq!(stats.len(), 7);
    assert_abs_diff_eq!(stats.get(&key(2, 0, 0, 0)).unwrap().mad, 10.0);

    let medians = median_across_antennas(&stats);
    assert_eq!(
        medians.keys().copied().collect::<Vec<_>>(),
        vec![(0, 0, 0), (0, 0, 1), (1, 2, 0)]
    );
    assert_abs_diff_eq!(medians[&(0, 0, 0)], 3.0);
    assert_abs_diff_eq!(medians[&(0, 0, 1)], 2.0);
    assert_abs_diff_eq!(medians[&(1, 2, 0)], 5.0);

    // Replacing a report doesn't add a new one.
    stats.insert(key(2, 0, 0, 0), report(0.0));
    assert_eq!(stats.len(), 7);
    assert_abs_diff_eq!(median_across_antennas(&stats)[&(0, 0, 0)], 1.0);
}
