// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;
use tempfile::TempDir;

use crate::{
    calview, get_cmd_output, read_json, write_file, PER_CHANNEL_TABLE, POLY_TABLE,
};

#[test]
fn test_plot_writes_every_page() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let table = write_file(tmp_dir.path(), "table.json", PER_CHANNEL_TABLE);
    let output = tmp_dir.path().join("panels.json");

    #[rustfmt::skip]
    let cmd = calview()
        .args([
            "plot",
            "--caltable", &format!("{}", table.display()),
            "--subplot", "22",
            "-o", &format!("{}", output.display()),
        ])
        .ok();
    assert!(cmd.is_ok(), "plot failed: {}", cmd.err().unwrap());

    let json = read_json(&output);
    assert_eq!(json["caltable"], "uid___A002_X1.B0");
    assert_eq!(json["grid"], "2x2");
    // 3 antennas at 2 times.
    let pages = json["pages"].as_array().unwrap();
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0]["panels"].as_array().unwrap().len(), 4);
    assert_eq!(pages[1]["panels"].as_array().unwrap().len(), 2);

    let first = &pages[0]["panels"][0];
    assert_eq!(first["series"].as_array().unwrap().len(), 2);
    assert_eq!(first["series"][0]["label"], "DA41 X");
    assert_eq!(first["series"][1]["label"], "DA41 Y");
    // The flagged channel is hidden.
    assert!(first["series"][0]["y_values"][7].is_null());
    assert_eq!(first["x_values"][7], 7.0);
}

#[test]
fn test_plot_selection_and_outliers() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let table = write_file(tmp_dir.path(), "table.json", PER_CHANNEL_TABLE);
    let output = tmp_dir.path().join("panels.json");

    #[rustfmt::skip]
    let cmd = calview()
        .args([
            "plot",
            "--caltable", &format!("{}", table.display()),
            "--antenna", "DA*",
            "--poln", "X",
            "--timeranges", "0",
            "--overlay", "antenna",
            "--mad-sigma", "3",
            "--channel-diff",
            "--xaxis", "freq",
            "-o", &format!("{}", output.display()),
        ])
        .ok();
    assert!(cmd.is_ok(), "plot failed: {}", cmd.err().unwrap());

    let json = read_json(&output);
    let pages = json["pages"].as_array().unwrap();
    assert_eq!(pages.len(), 1);
    let panels = pages[0]["panels"].as_array().unwrap();
    assert_eq!(panels.len(), 1);
    let panel = &panels[0];
    assert_eq!(panel["series"].as_array().unwrap().len(), 2);
    assert_eq!(panel["series"][1]["label"], "DA42 X");
    // Channel differences sit between channels.
    assert_eq!(panel["x_values"].as_array().unwrap().len(), 7);
    assert_abs_diff_eq!(
        panel["x_values"][0].as_f64().unwrap(),
        230.05,
        epsilon = 1e-9
    );

    // The spike in DA42's third channel shows up on either side of it.
    assert!(panel["outliers"][0]["report"]["exceeding_channels"]
        .as_array()
        .unwrap()
        .is_empty());
    let report = &panel["outliers"][1]["report"];
    assert_eq!(report["worst_channel"], 1);
    assert_eq!(report["exceeding_channels"], serde_json::json!([1, 2]));
    assert!(!panel["annotations"].as_array().unwrap().is_empty());

    assert_eq!(json["median_mad"].as_array().unwrap().len(), 1);
}

#[test]
fn test_plot_polynomial() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let table = write_file(tmp_dir.path(), "bpoly.toml", POLY_TABLE);
    let output = tmp_dir.path().join("panels.json");

    #[rustfmt::skip]
    let cmd = calview()
        .args([
            "plot",
            "--caltable", &format!("{}", table.display()),
            "--yaxis", "both",
            "-o", &format!("{}", output.display()),
        ])
        .ok();
    assert!(cmd.is_ok(), "plot failed: {}", cmd.err().unwrap());

    let json = read_json(&output);
    let panels = json["pages"][0]["panels"].as_array().unwrap();
    assert_eq!(panels.len(), 2);

    // A linear amplitude re-centred on 1.
    let amp: Vec<f64> = panels[0]["series"][0]["y_values"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_f64().unwrap())
        .collect();
    assert_eq!(amp.len(), 5);
    let expected = [0.5, 0.75, 1.0, 1.25, 1.5];
    for (a, e) in amp.iter().zip(expected) {
        assert_abs_diff_eq!(*a, e, epsilon = 1e-9);
    }
}

#[test]
fn test_plot_arguments_file() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let table = write_file(tmp_dir.path(), "table.json", PER_CHANNEL_TABLE);
    let output = tmp_dir.path().join("panels.json");
    let args_file = write_file(
        tmp_dir.path(),
        "args.toml",
        &format!(
            "[data]\ncaltable = \"{}\"\nantenna = 2\n\n[plot]\nsubplot = \"1x1\"\noutput = \"{}\"\n",
            table.display(),
            output.display()
        ),
    );

    // The CLI selection beats the file's.
    #[rustfmt::skip]
    let cmd = calview()
        .args([
            "plot",
            &format!("{}", args_file.display()),
            "--antenna", "0",
        ])
        .ok();
    assert!(cmd.is_ok(), "plot failed: {}", cmd.err().unwrap());

    let json = read_json(&output);
    let pages = json["pages"].as_array().unwrap();
    assert_eq!(pages.len(), 2);
    for page in pages {
        let label = page["panels"][0]["series"][0]["label"].as_str().unwrap();
        assert!(label.starts_with("DA41"), "{label}");
    }
}

#[test]
fn test_plot_interactive() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let table = write_file(tmp_dir.path(), "table.json", PER_CHANNEL_TABLE);
    let output = tmp_dir.path().join("panels.json");

    #[rustfmt::skip]
    let cmd = calview()
        .args([
            "plot",
            "--caltable", &format!("{}", table.display()),
            "--subplot", "3x2",
            "--interactive",
            "-o", &format!("{}", output.display()),
        ])
        .write_stdin("b\nn\nb\nq\n")
        .ok();
    assert!(cmd.is_ok(), "plot failed: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Page 1"), "{stdout}");

    // "b" on the first page does nothing, "n" finds nothing more (all 6
    // panels fit on the first page), and the second "b" can't go back either.
    let json = read_json(&output);
    let pages = json["pages"].as_array().unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0]["panels"].as_array().unwrap().len(), 6);
}

#[test]
fn test_plot_dry_run() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let table = write_file(tmp_dir.path(), "table.json", PER_CHANNEL_TABLE);
    let output = tmp_dir.path().join("panels.json");

    #[rustfmt::skip]
    let cmd = calview()
        .args([
            "plot",
            "--caltable", &format!("{}", table.display()),
            "-o", &format!("{}", output.display()),
            "--dry-run",
        ])
        .ok();
    assert!(cmd.is_ok(), "plot failed: {}", cmd.err().unwrap());
    assert!(!output.exists());
}

#[test]
fn test_plot_save_toml() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let table = write_file(tmp_dir.path(), "table.json", PER_CHANNEL_TABLE);
    let toml = tmp_dir.path().join("args.toml");

    #[rustfmt::skip]
    let cmd = calview()
        .args([
            "plot",
            "--caltable", &format!("{}", table.display()),
            "--antenna", "DA41,DV03",
            "--show-flagged",
            "--save-toml", &format!("{}", toml.display()),
            "--dry-run",
        ])
        .ok();
    assert!(cmd.is_ok(), "plot failed: {}", cmd.err().unwrap());

    let saved = std::fs::read_to_string(&toml).unwrap();
    assert!(saved.contains("antenna = \"DA41,DV03\""), "{saved}");
    assert!(saved.contains("show_flagged = true"), "{saved}");
}

#[test]
fn test_plot_bad_selection_fails() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let table = write_file(tmp_dir.path(), "table.json", PER_CHANNEL_TABLE);

    #[rustfmt::skip]
    let cmd = calview()
        .args([
            "plot",
            "--caltable", &format!("{}", table.display()),
            "--antenna", "DV99",
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.starts_with("Error: "), "{stderr}");
    assert!(stderr.contains("DV99"), "{stderr}");
}

#[test]
fn test_plot_bad_subplot_fails() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let table = write_file(tmp_dir.path(), "table.json", PER_CHANNEL_TABLE);

    calview()
        .args([
            "plot",
            "--caltable",
            &format!("{}", table.display()),
            "--subplot",
            "5x5",
        ])
        .assert()
        .failure()
        .code(1);
}
