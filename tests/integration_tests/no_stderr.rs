// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests to ensure there is no stderr output for successful commands.

use tempfile::TempDir;

use crate::{calview, get_cmd_output, write_file, PER_CHANNEL_TABLE};

#[test]
fn test_plot_no_stderr() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let table = write_file(tmp_dir.path(), "table.json", PER_CHANNEL_TABLE);
    let output = tmp_dir.path().join("panels.json");

    #[rustfmt::skip]
    let cmd = calview()
        .args([
            "plot",
            "--caltable", &format!("{}", table.display()),
            "-o", &format!("{}", output.display()),
        ])
        .ok();
    assert!(cmd.is_ok(), "plot failed: {}", cmd.err().unwrap());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}

#[test]
fn test_inspect_no_stderr() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let table = write_file(tmp_dir.path(), "table.json", PER_CHANNEL_TABLE);

    let cmd = calview()
        .args(["inspect", "--caltable", &format!("{}", table.display())])
        .ok();
    assert!(cmd.is_ok(), "inspect failed: {}", cmd.err().unwrap());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}
