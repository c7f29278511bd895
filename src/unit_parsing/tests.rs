// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use super::*;

use approx::assert_abs_diff_eq;

#[test]
fn test_parse_time_str_without_units() {
    for input in ["1", "1.0", " 1.0 "] {
        let result = parse_time(input);
        assert!(result.is_ok(), "{:?}", result.unwrap_err());
        let pair = result.unwrap();
        assert_abs_diff_eq!(pair.0, 1.0);
        assert_eq!(pair.1, TimeFormat::NoUnit);
    }
}

#[test]
fn test_parse_time_str_with_units() {
    // Iterate over all possible units.
    for time_format in TimeFormat::iter().filter(|&tf| tf != TimeFormat::NoUnit) {
        let time_format_str: &'static str = time_format.into();
        for time_format_str in [
            time_format_str.to_lowercase(),
            time_format_str.to_uppercase(),
        ] {
            for input in [
                format!("1{time_format_str}"),
                format!("1.0{time_format_str}"),
                format!(" 1.0{time_format_str} "),
                format!(" 1.0 {time_format_str} "),
            ] {
                let result = parse_time(&input);
                assert!(result.is_ok(), "{:?}", result.unwrap_err());
                let pair = result.unwrap();
                assert_abs_diff_eq!(pair.0, 1.0);
                assert_eq!(pair.1, time_format);
            }
        }
    }
}

#[test]
fn test_parse_time_str_failures() {
    let result = parse_time("1.2.3s");
    assert!(matches!(
        result,
        Err(UnitParseError::GotTimeUnitButCantParse { unit: "S", .. })
    ));

    let result = parse_time("thirty");
    assert!(matches!(result, Err(UnitParseError::Unknown { .. })));

    let result = parse_time("30min");
    assert!(matches!(result, Err(UnitParseError::Unknown { .. })));
}

#[test]
fn test_parse_seconds() {
    assert_abs_diff_eq!(parse_seconds("30").unwrap(), 30.0);
    assert_abs_diff_eq!(parse_seconds("30s").unwrap(), 30.0);
    assert_abs_diff_eq!(parse_seconds("500ms").unwrap(), 0.5);
    assert_abs_diff_eq!(parse_seconds(" 1 ").unwrap(), 1.0);

    assert!(matches!(
        parse_seconds("-1"),
        Err(UnitParseError::NotADuration { .. })
    ));
    // Nothing can be matched with a zero tolerance.
    for zero in ["0", "0ms", "0s"] {
        assert!(matches!(
            parse_seconds(zero),
            Err(UnitParseError::NotADuration { .. })
        ));
    }
    assert!(parse_seconds("inf").is_err());
    assert!(parse_seconds("").is_err());
}
