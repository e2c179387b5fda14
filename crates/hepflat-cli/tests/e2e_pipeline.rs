//! E2E CLI tests: convert, merge, split, and prune run as subprocesses
//! against real files in an isolated temp directory.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test harness
// ---------------------------------------------------------------------------

/// A two-event HepMC2 stream: a Z → μ⁺μ⁻ decay plus an empty event.
const SAMPLE: &str = "\
HepMC::Version 2.06.09
HepMC::IO_GenEvent-START_EVENT_LISTING
E 1 0 91.2 0.118 0.0073 0 -2 1 0 0 0 1 1.0
U GEV MM
V -2 0 1 2 3 0.5 1 2 0
P 1 23 1 2 3 95 91.2 2 0 0 -2 0
P 2 13 5 0 40 41 0.105 1 0 0 0 0
P 3 -13 -4 2 50 52 0.105 1 0 0 0 0
E 2 0 0 0 0 0 0 0 0 0 0 0
HepMC::IO_GenEvent-END_EVENT_LISTING
";

fn hepflat_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("hepflat"));
    cmd.current_dir(dir);
    cmd.env("HEPFLAT_LOG", "error");
    cmd
}

fn write_sample(dir: &Path, name: &str) {
    fs::write(dir.join(name), SAMPLE).expect("write sample input");
}

fn read_rows(path: &Path) -> Vec<Value> {
    fs::read_to_string(path)
        .expect("read JSONL output")
        .lines()
        .map(|line| serde_json::from_str(line).expect("each line is valid JSON"))
        .collect()
}

// ---------------------------------------------------------------------------
// convert
// ---------------------------------------------------------------------------

#[test]
fn convert_writes_one_row_per_event() {
    let dir = TempDir::new().expect("tempdir");
    write_sample(dir.path(), "events.hepmc");

    hepflat_cmd(dir.path())
        .args(["convert", "events.hepmc", "rows.jsonl"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 events processed"));

    let rows = read_rows(&dir.path().join("rows.jsonl"));
    assert_eq!(rows.len(), 2);

    let first = &rows[0];
    assert_eq!(first["event_number"], 1);
    assert_eq!(first["n_particles"], 3);
    assert_eq!(first["pdg_id"], serde_json::json!([23, 13, -13]));
    assert_eq!(first["children"][0], serde_json::json!([1, 2]));
    assert_eq!(first["vtx_part_in"][0], serde_json::json!([0]));

    assert_eq!(rows[1]["event_number"], 2);
    assert_eq!(rows[1]["n_particles"], 0);
}

#[test]
fn convert_flat_mode_omits_graph_columns() {
    let dir = TempDir::new().expect("tempdir");
    write_sample(dir.path(), "events.hepmc");

    hepflat_cmd(dir.path())
        .args(["convert", "events.hepmc", "flat.jsonl", "--flat"])
        .assert()
        .success();

    let rows = read_rows(&dir.path().join("flat.jsonl"));
    assert_eq!(rows[0]["pdg_id"], serde_json::json!([23, 13, -13]));
    assert_eq!(rows[0]["children"], serde_json::json!([]));
    assert_eq!(rows[0]["vtx_barcode"], serde_json::json!([]));
}

#[test]
fn convert_respects_max_events() {
    let dir = TempDir::new().expect("tempdir");
    write_sample(dir.path(), "events.hepmc");

    hepflat_cmd(dir.path())
        .args(["convert", "events.hepmc", "rows.jsonl", "--max-events", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 events processed"));

    assert_eq!(read_rows(&dir.path().join("rows.jsonl")).len(), 1);
}

#[test]
fn convert_aborts_on_dangling_vertex_reference() {
    let dir = TempDir::new().expect("tempdir");
    // Particle 1 decays at vertex -9, which does not exist.
    let broken = "\
E 1 0 0 0 0 0 -1 1 0 0 0 0
V -1 0 0 0 0 0 0 1 0
P 1 23 0 0 1 1 0 2 0 0 -9 0
";
    fs::write(dir.path().join("broken.hepmc"), broken).expect("write input");

    hepflat_cmd(dir.path())
        .args(["convert", "broken.hepmc", "rows.jsonl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing decay vertex -9"));
}

#[test]
fn convert_aborts_on_read_failure() {
    let dir = TempDir::new().expect("tempdir");
    // Opening a directory succeeds on Linux; reading from it fails with an
    // I/O error on the first line, which must abort rather than be skipped.
    fs::create_dir(dir.path().join("not-a-file.hepmc")).expect("create dir");

    hepflat_cmd(dir.path())
        .args(["convert", "not-a-file.hepmc", "rows.jsonl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn convert_skips_malformed_events_and_reports() {
    let dir = TempDir::new().expect("tempdir");
    let stream = "\
E 1 0 0 0 0 0 -1 1 0 0 0 0
V -1 0 bogus 0 0 0 0 1 0
P 1 11 0 0 1 1 0 1 0 0 0 0
E 2 0 0 0 0 0 0 0 0 0 0 0
";
    fs::write(dir.path().join("partial.hepmc"), stream).expect("write input");

    hepflat_cmd(dir.path())
        .args(["convert", "partial.hepmc", "rows.jsonl"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 events processed, 1 skipped"));
}

// ---------------------------------------------------------------------------
// merge / split / prune
// ---------------------------------------------------------------------------

#[test]
fn merge_concatenates_streams() {
    let dir = TempDir::new().expect("tempdir");
    write_sample(dir.path(), "a.hepmc");
    write_sample(dir.path(), "b.hepmc");

    hepflat_cmd(dir.path())
        .args(["merge", "a.hepmc", "b.hepmc", "-o", "merged.hepmc"])
        .assert()
        .success()
        .stdout(predicate::str::contains("4 events merged"));

    // The merged file converts cleanly to 4 rows.
    hepflat_cmd(dir.path())
        .args(["convert", "merged.hepmc", "rows.jsonl"])
        .assert()
        .success();
    assert_eq!(read_rows(&dir.path().join("rows.jsonl")).len(), 4);
}

#[test]
fn split_rotates_output_files() {
    let dir = TempDir::new().expect("tempdir");
    write_sample(dir.path(), "events.hepmc");

    hepflat_cmd(dir.path())
        .args(["split", "events.hepmc", "chunk", "-e", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 events split over 2 files"));

    for chunk in ["chunk.0", "chunk.1"] {
        hepflat_cmd(dir.path())
            .args(["convert", chunk, "rows.jsonl"])
            .assert()
            .success()
            .stdout(predicate::str::contains("1 events processed"));
    }
}

#[test]
fn split_without_chunk_size_copies_everything_into_one_file() {
    let dir = TempDir::new().expect("tempdir");
    write_sample(dir.path(), "events.hepmc");

    hepflat_cmd(dir.path())
        .args(["split", "events.hepmc", "chunk"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 events split over 1 files"));

    hepflat_cmd(dir.path())
        .args(["convert", "chunk.0", "rows.jsonl"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 events processed"));
    assert!(!dir.path().join("chunk.1").exists());
}

#[test]
fn prune_removes_particles_by_abs_pdg_id() {
    let dir = TempDir::new().expect("tempdir");
    write_sample(dir.path(), "events.hepmc");

    hepflat_cmd(dir.path())
        .args(["prune", "events.hepmc", "-o", "slim.hepmc", "-d", "13"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 particles removed"));

    hepflat_cmd(dir.path())
        .args(["convert", "slim.hepmc", "rows.jsonl"])
        .assert()
        .success();
    let rows = read_rows(&dir.path().join("rows.jsonl"));
    assert_eq!(rows[0]["pdg_id"], serde_json::json!([23]));
}
