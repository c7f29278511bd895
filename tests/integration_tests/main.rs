// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests.
//!
//! Some help for laying out these tests was taken from:
//! https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

mod inspect;
mod no_stderr;
mod plot;

use std::{
    io::Write,
    path::{Path, PathBuf},
    process::Output,
    str::from_utf8,
};

use assert_cmd::{output::OutputError, Command};
use indoc::indoc;

fn calview() -> Command {
    Command::cargo_bin("calview").unwrap()
}

fn get_cmd_output(result: Result<Output, OutputError>) -> (String, String) {
    let output = match result {
        Ok(o) => o,
        Err(o) => o.as_output().unwrap().clone(),
    };
    (
        from_utf8(&output.stdout).unwrap().to_string(),
        from_utf8(&output.stderr).unwrap().to_string(),
    )
}

/// Three antennas with per-channel solutions at two times, one spw with four
/// channels and two pols. The second antenna has a spike in its third
/// channel.
const PER_CHANNEL_TABLE: &str = indoc! {r#"
    {
        "name": "uid___A002_X1.B0",
        "antenna_names": ["DA41", "DA42", "DV03"],
        "field_names": ["J1924-2914"],
        "pol_names": ["X", "Y"],
        "spw_freqs_ghz": [[230.0, 230.1, 230.2, 230.3, 230.4, 230.5, 230.6, 230.7]],
        "rows": [
            {
                "antenna": 0, "spw": 0, "time": 5.0e9,
                "gains": [
                    [[1.0, 0.0], [1.01, 0.0], [0.99, 0.0], [1.0, 0.0], [1.01, 0.0], [0.99, 0.0], [1.0, 0.0], [1.01, 0.0]],
                    [[1.0, 0.0], [1.0, 0.1], [1.0, 0.0], [1.0, -0.1], [1.0, 0.0], [1.0, 0.1], [1.0, 0.0], [1.0, 0.0]]
                ],
                "flags": [
                    [false, false, false, false, false, false, false, true],
                    [false, false, false, false, false, false, false, false]
                ]
            },
            {
                "antenna": 1, "spw": 0, "time": 5.0e9,
                "gains": [
                    [[1.0, 0.0], [1.01, 0.0], [9.0, 0.0], [1.01, 0.0], [1.0, 0.0], [1.01, 0.0], [1.0, 0.0], [1.01, 0.0]],
                    [[1.0, 0.0], [1.0, 0.0], [1.0, 0.0], [1.0, 0.0], [1.0, 0.0], [1.0, 0.0], [1.0, 0.0], [1.0, 0.0]]
                ]
            },
            {
                "antenna": 2, "spw": 0, "time": 5.0e9,
                "gains": [
                    [[2.0, 0.0], [2.0, 0.0], [2.0, 0.0], [2.0, 0.0], [2.0, 0.0], [2.0, 0.0], [2.0, 0.0], [2.0, 0.0]],
                    [[2.0, 0.0], [2.0, 0.0], [2.0, 0.0], [2.0, 0.0], [2.0, 0.0], [2.0, 0.0], [2.0, 0.0], [2.0, 0.0]]
                ]
            },
            {
                "antenna": 0, "spw": 0, "time": 5.0000036e9,
                "gains": [
                    [[1.0, 0.0], [1.0, 0.0], [1.0, 0.0], [1.0, 0.0], [1.0, 0.0], [1.0, 0.0], [1.0, 0.0], [1.0, 0.0]],
                    [[1.0, 0.0], [1.0, 0.0], [1.0, 0.0], [1.0, 0.0], [1.0, 0.0], [1.0, 0.0], [1.0, 0.0], [1.0, 0.0]]
                ]
            },
            {
                "antenna": 1, "spw": 0, "time": 5.0000036e9,
                "gains": [
                    [[1.0, 0.0], [1.0, 0.0], [1.0, 0.0], [1.0, 0.0], [1.0, 0.0], [1.0, 0.0], [1.0, 0.0], [1.0, 0.0]],
                    [[1.0, 0.0], [1.0, 0.0], [1.0, 0.0], [1.0, 0.0], [1.0, 0.0], [1.0, 0.0], [1.0, 0.0], [1.0, 0.0]]
                ]
            },
            {
                "antenna": 2, "spw": 0, "time": 5.0000036e9,
                "gains": [
                    [[2.0, 0.0], [2.0, 0.0], [2.0, 0.0], [2.0, 0.0], [2.0, 0.0], [2.0, 0.0], [2.0, 0.0], [2.0, 0.0]],
                    [[2.0, 0.0], [2.0, 0.0], [2.0, 0.0], [2.0, 0.0], [2.0, 0.0], [2.0, 0.0], [2.0, 0.0], [2.0, 0.0]]
                ]
            }
        ]
    }
"#};

/// A single antenna with a linear BPOLY amplitude over one spw.
const POLY_TABLE: &str = indoc! {r#"
    name = "uid___A002_X1.bpoly"
    antenna_names = ["DA41"]
    field_names = ["J1924-2914"]
    pol_names = ["X"]
    spw_freqs_ghz = [[230.0, 230.25, 230.5, 230.75, 231.0]]

    [[rows]]
    antenna = 0
    spw = 0
    time = 5.0e9

    [rows.poly]
    amp_mode = "A&P"
    phase_mode = "A&P"
    coeff_amp = [7.0, 0.5]
    coeff_phase = [0.0, 0.0]
    valid_domain_ghz = [230.0, 231.0]
    n_poly_amp = 2
    n_poly_phase = 2
"#};

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let file = dir.join(name);
    let mut f = std::fs::File::create(&file).unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    file
}

fn read_json(file: &Path) -> serde_json::Value {
    let contents = std::fs::read_to_string(file).unwrap();
    serde_json::from_str(&contents).unwrap()
}
