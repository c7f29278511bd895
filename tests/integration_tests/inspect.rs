// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use tempfile::TempDir;

use crate::{calview, get_cmd_output, write_file, PER_CHANNEL_TABLE};

#[test]
fn test_inspect() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let table = write_file(tmp_dir.path(), "table.json", PER_CHANNEL_TABLE);

    let cmd = calview()
        .args(["inspect", "--caltable", &format!("{}", table.display())])
        .ok();
    assert!(cmd.is_ok(), "inspect failed: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("uid___A002_X1.B0"), "{stdout}");
    assert!(stdout.contains("DV03"), "{stdout}");
    assert!(stdout.contains("J1924-2914"), "{stdout}");
    assert!(stdout.contains("8 channels"), "{stdout}");
}

#[test]
fn test_inspect_missing_file() {
    let cmd = calview()
        .args(["inspect", "--caltable", "/does/not/exist.json"])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.starts_with("Error: "), "{stderr}");
}
