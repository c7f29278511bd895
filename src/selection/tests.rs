// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use super::*;

const UNIVERSE: [usize; 4] = [0, 1, 2, 3];

fn antennas() -> NameTable {
    NameTable::from_names(["DV01", "DV02", "DA41", "PM03"])
}

fn resolve_str(s: &str) -> Result<Selection, SelectionError> {
    SelectionResolver::new(Dimension::Antenna, &UNIVERSE)
        .with_names(&antennas())
        .resolve(&SelectionSpec::from(s))
}

#[test]
fn test_range_with_negation() {
    let result = resolve_str("0~2,!1");
    assert!(result.is_ok(), "{:?}", result.unwrap_err());
    assert_eq!(result.unwrap().as_slice(), &[0, 2]);
}

#[test]
fn test_positive_tokens_are_sorted_and_unique() {
    for s in ["3,1,1,0", "2~3,0~2", "3, 2 ,  1,0,3", "*,1", "DV02,1,PM03"] {
        let result = resolve_str(s);
        assert!(result.is_ok(), "{s}: {:?}", result.unwrap_err());
        let ids = result.unwrap().into_vec();
        assert!(
            ids.windows(2).all(|w| w[0] < w[1]),
            "'{s}' wasn't strictly ascending: {ids:?}"
        );
    }
}

#[test]
fn test_leading_negation_starts_from_everything() {
    for x in UNIVERSE {
        let result = resolve_str(&format!("!{x}"));
        assert!(result.is_ok(), "{:?}", result.unwrap_err());
        let ids = result.unwrap();
        assert!(!ids.contains(x));
        assert_eq!(ids.len(), UNIVERSE.len() - 1);
        for y in UNIVERSE.iter().filter(|&&y| y != x) {
            assert_eq!(ids.iter().filter(|&&id| id == *y).count(), 1);
        }
    }

    // Same with an explicit wildcard base.
    let result = resolve_str("*,!2");
    assert_eq!(result.unwrap().as_slice(), &[0, 1, 3]);
}

#[test]
fn test_negation_is_applied_after_all_positives() {
    // Even though the negation comes before the positive "1", the negation
    // wins.
    let result = resolve_str("0,!1,1,2");
    assert_eq!(result.unwrap().as_slice(), &[0, 2]);
}

#[test]
fn test_names_and_patterns() {
    let result = resolve_str("dv02");
    assert_eq!(result.unwrap().as_slice(), &[1]);

    let result = resolve_str("DV*");
    assert_eq!(result.unwrap().as_slice(), &[0, 1]);

    let result = resolve_str("*,!DV*");
    assert_eq!(result.unwrap().as_slice(), &[2, 3]);

    let result = resolve_str("D?4?");
    assert_eq!(result.unwrap().as_slice(), &[2]);
}

#[test]
fn test_unknown_names() {
    let result = resolve_str("CM01");
    assert_eq!(
        result.unwrap_err(),
        SelectionError::UnknownName {
            dimension: Dimension::Antenna,
            name: "CM01".to_string()
        }
    );

    let result = resolve_str("CM*");
    assert!(matches!(
        result,
        Err(SelectionError::UnknownName { .. })
    ));

    // Without a name table, every name is unknown.
    let result = SelectionResolver::new(Dimension::Spw, &UNIVERSE)
        .resolve(&SelectionSpec::from("DV01"));
    assert!(matches!(
        result,
        Err(SelectionError::UnknownName {
            dimension: Dimension::Spw,
            ..
        })
    ));
}

#[test]
fn test_bad_ranges() {
    for s in ["a~2", "0~b", "0~1.5", "3~1"] {
        let result = resolve_str(s);
        assert_eq!(
            result.unwrap_err(),
            SelectionError::RangeParse {
                dimension: Dimension::Antenna,
                token: s.to_string()
            },
            "{s}"
        );
    }
}

#[test]
fn test_malformed_tokens() {
    for s in ["!", "!!1", "0~1~2", "1,!"] {
        let result = resolve_str(s);
        assert!(
            matches!(result, Err(SelectionError::Parse { .. })),
            "'{s}' gave {result:?}"
        );
    }
}

#[test]
fn test_no_match_lists_the_universe() {
    let result = resolve_str("7");
    let err = result.unwrap_err();
    assert_eq!(
        err,
        SelectionError::NoMatch {
            dimension: Dimension::Antenna,
            token: "7".to_string(),
            universe: UNIVERSE.to_vec(),
        }
    );
    assert!(err.to_string().contains("[0, 1, 2, 3]"));

    // A range partially outside the universe is fine, but not one that's
    // entirely outside it.
    let result = resolve_str("2~9");
    assert_eq!(result.unwrap().as_slice(), &[2, 3]);
    let result = resolve_str("5~9");
    assert!(matches!(result, Err(SelectionError::NoMatch { .. })));
}

#[test]
fn test_empty_selection_semantics() {
    let resolver = SelectionResolver::new(Dimension::Field, &UNIVERSE);
    let result = resolver.resolve(&SelectionSpec::from(""));
    assert_eq!(result.unwrap().as_slice(), &UNIVERSE);
    let result = resolver.resolve(&SelectionSpec::from(" , "));
    assert_eq!(result.unwrap().as_slice(), &UNIVERSE);

    let resolver = resolver.empty_means(EmptyMeans::None);
    let result = resolver.resolve(&SelectionSpec::from(""));
    assert!(result.unwrap().is_empty());
    let result = resolver.resolve(&SelectionSpec::Ids(vec![]));
    assert!(result.unwrap().is_empty());
}

#[test]
fn test_negating_everything_is_an_error() {
    let result = resolve_str("!0~3");
    assert_eq!(
        result.unwrap_err(),
        SelectionError::Empty {
            dimension: Dimension::Antenna,
            spec: "!0~3".to_string()
        }
    );

    let result = resolve_str("1,!1");
    assert!(matches!(result, Err(SelectionError::Empty { .. })));
}

#[test]
fn test_integer_and_list_specs() {
    let resolver = SelectionResolver::new(Dimension::Spw, &UNIVERSE);
    assert_eq!(
        resolver.resolve(&SelectionSpec::from(2)).unwrap().as_slice(),
        &[2]
    );
    assert_eq!(
        resolver
            .resolve(&SelectionSpec::from(vec![3, 0, 3]))
            .unwrap()
            .as_slice(),
        &[0, 3]
    );
    assert!(matches!(
        resolver.resolve(&SelectionSpec::from(vec![0, 4])),
        Err(SelectionError::NoMatch { .. })
    ));
}

#[test]
fn test_name_table() {
    let mut names = NameTable::new();
    names.insert("XX", 0);
    names.insert("YY", 1);
    names.insert("XX", 0);
    assert_eq!(names.lookup("xx"), Some([0].as_slice()));
    assert_eq!(names.name_of(1), Some("YY"));
    assert_eq!(names.name_of(2), None);
    assert!(names.lookup("RR").is_none());
}
